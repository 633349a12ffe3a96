//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::config_validation::{
    optional_date, required_date, seed, strategy_kind, validate_backtest_config,
    validate_data_config, validate_simulation_config, validate_strategy_config, weekdays,
};
use crate::domain::error::StocksimError;
use crate::domain::market::Market;
use crate::domain::report::ReportSummary;
use crate::domain::simulation::{evaluate_using_free_market, RatioStats, SimulationParams};
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stocksim", about = "Day-stepped stock trading simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a strategy against historical prices
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overrides `[strategy] kind`
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// Evaluate a strategy against repeated synthetic markets
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// List the symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            output,
            strategy,
        } => run_backtest_command(&config, output.as_deref(), strategy.as_deref()),
        Command::Simulate { config, strategy } => {
            run_simulate_command(&config, strategy.as_deref())
        }
        Command::ListSymbols { config } => run_list_symbols(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StocksimError> {
    FileConfigAdapter::from_file(path).map_err(|e| StocksimError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, StocksimError> {
    validate_backtest_config(adapter)?;
    let start_date = required_date(adapter, "backtest", "start_date")?;
    let end_date = required_date(adapter, "backtest", "end_date")?;
    let initial_fund = adapter.get_double("backtest", "initial_fund", 100_000.0);

    let config = BacktestConfig::new(start_date, end_date, initial_fund);
    Ok(match weekdays(adapter)? {
        Some(days) => config.with_weekdays(&days),
        None => config,
    })
}

pub fn build_simulation_params(
    adapter: &dyn ConfigPort,
) -> Result<SimulationParams, StocksimError> {
    validate_simulation_config(adapter)?;
    let defaults = SimulationParams::default();
    let start = optional_date(adapter, "simulation", "start_date")?.unwrap_or(defaults.start);
    let end = optional_date(adapter, "simulation", "end_date")?.unwrap_or(defaults.end);
    if end <= start {
        return Err(StocksimError::ConfigInvalid {
            section: "simulation".into(),
            key: "end_date".into(),
            reason: format!("simulation window {start}..{end} is empty"),
        });
    }

    Ok(SimulationParams {
        start,
        end,
        initial_price: adapter.get_double("simulation", "initial_price", defaults.initial_price),
        daily_change: adapter.get_double("simulation", "daily_change", defaults.daily_change),
        daily_fluctuation: adapter.get_double(
            "simulation",
            "daily_fluctuation",
            defaults.daily_fluctuation,
        ),
        initial_fund: adapter.get_double("simulation", "initial_fund", defaults.initial_fund),
        num_simulations: adapter.get_int(
            "simulation",
            "num_simulations",
            defaults.num_simulations as i64,
        ) as usize,
    })
}

/// The `--strategy` override if given, otherwise `[strategy] kind`.
pub fn resolve_strategy_kind(
    override_kind: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<StrategyKind, StocksimError> {
    match override_kind {
        Some(kind) => kind
            .parse::<StrategyKind>()
            .map_err(|reason| StocksimError::ConfigInvalid {
                section: "strategy".into(),
                key: "kind".into(),
                reason,
            }),
        None => strategy_kind(adapter),
    }
}

pub fn build_price_source(adapter: &dyn ConfigPort) -> Result<CsvPriceAdapter, StocksimError> {
    validate_data_config(adapter)?;
    let dir = adapter
        .get_string("data", "dir")
        .ok_or_else(|| StocksimError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })?;
    Ok(CsvPriceAdapter::new(PathBuf::from(dir.trim())))
}

/// Loads the market from `source`, evaluates the strategy and optionally
/// writes the CSV report to `output`.
pub fn run_backtest_pipeline(
    source: &dyn PricePort,
    kind: StrategyKind,
    symbol: Option<String>,
    strategy_seed: Option<u64>,
    bt_config: &BacktestConfig,
    daily_resample: bool,
    output: Option<&Path>,
) -> Result<ReportSummary, StocksimError> {
    let market = Market::from_source(source, daily_resample)?;
    if market.is_empty() {
        return Err(StocksimError::Data {
            reason: "price source contains no symbols".into(),
        });
    }
    tracing::info!(symbols = market.len(), "market loaded");

    let mut strategy = kind.build(symbol, strategy_seed);
    let report = run_backtest(&market, strategy.as_mut(), bt_config)?;

    if let Some(path) = output {
        CsvReportAdapter.write(&report, path)?;
        tracing::info!(path = %path.display(), "report written");
    }
    report.summary()
}

fn run_backtest_command(
    config_path: &Path,
    output: Option<&Path>,
    strategy_override: Option<&str>,
) -> Result<(), StocksimError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    validate_strategy_config(&adapter)?;
    let kind = resolve_strategy_kind(strategy_override, &adapter)?;
    let bt_config = build_backtest_config(&adapter)?;
    let source = build_price_source(&adapter)?;

    let configured_output = adapter.get_string("report", "output").map(PathBuf::from);
    let output = output.or(configured_output.as_deref());

    let summary = run_backtest_pipeline(
        &source,
        kind,
        adapter.get_string("strategy", "symbol"),
        seed(&adapter, "strategy")?,
        &bt_config,
        adapter.get_bool("data", "daily_resample", true),
        output,
    )?;

    print_summary(kind, &summary);
    if let Some(path) = output {
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

fn print_summary(kind: StrategyKind, summary: &ReportSummary) {
    println!("Strategy:       {}", kind);
    println!("Period:         {} to {}", summary.start.date(), summary.end.date());
    println!("Initial value:  {:.2}", summary.initial_value);
    println!("Final value:    {:.2}", summary.final_value);
    println!("Total return:   {:.2}%", summary.total_return * 100.0);
    println!("Max drawdown:   {:.2}%", summary.max_drawdown * 100.0);
}

/// Runs the synthetic-market evaluation. Each run gets its own strategy;
/// seeded random strategies use `seed + run` so runs differ but replay.
pub fn run_simulation(
    kind: StrategyKind,
    strategy_seed: Option<u64>,
    params: &SimulationParams,
    market_seed: Option<u64>,
) -> Result<Option<RatioStats>, StocksimError> {
    let mut rng = match market_seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let mut run = 0u64;
    let ratios = evaluate_using_free_market(
        || {
            let seed = strategy_seed.map(|s| s.wrapping_add(run));
            run += 1;
            kind.build(None, seed)
        },
        params,
        &mut rng,
    )?;
    Ok(RatioStats::compute(&ratios))
}

fn run_simulate_command(
    config_path: &Path,
    strategy_override: Option<&str>,
) -> Result<(), StocksimError> {
    let adapter = load_config(config_path)?;

    validate_strategy_config(&adapter)?;
    let kind = resolve_strategy_kind(strategy_override, &adapter)?;
    let params = build_simulation_params(&adapter)?;
    if adapter.get_string("strategy", "symbol").is_some() {
        tracing::warn!("[strategy] symbol is ignored for synthetic markets");
    }

    eprintln!(
        "Running {} simulations of {} from {} to {}",
        params.num_simulations, kind, params.start, params.end
    );
    let stats = run_simulation(
        kind,
        seed(&adapter, "strategy")?,
        &params,
        seed(&adapter, "simulation")?,
    )?;

    match stats {
        Some(stats) => {
            println!("Return ratio (actual / expected)");
            println!("  mean: {:.4}", stats.mean);
            println!("  min:  {:.4}", stats.min);
            println!("  max:  {:.4}", stats.max);
        }
        None => eprintln!("No simulations were run"),
    }
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), StocksimError> {
    let adapter = load_config(config_path)?;
    let source = build_price_source(&adapter)?;
    let symbols = source.list_symbols()?;

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
