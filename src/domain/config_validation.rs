//! Configuration validation.
//!
//! Checks every field a run reads before any data is loaded.

use crate::domain::calendar::parse_weekdays;
use crate::domain::error::StocksimError;
use crate::domain::simulation::SimulationParams;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use chrono::{NaiveDate, Weekday};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(StocksimError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        }),
    }
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    validate_dates(config)?;
    validate_initial_fund(config, "backtest")?;
    weekdays(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    strategy_kind(config)?;
    seed(config, "strategy")?;
    Ok(())
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    if config.get_int("simulation", "num_simulations", 1) < 1 {
        return Err(invalid(
            "simulation",
            "num_simulations",
            "num_simulations must be at least 1",
        ));
    }
    let defaults = SimulationParams::default();
    check_simulation_value(
        config,
        "initial_price",
        defaults.initial_price,
        |v| v > 0.0,
        "initial_price must be positive",
    )?;
    check_simulation_value(
        config,
        "daily_change",
        defaults.daily_change,
        |v| v != 0.0,
        "daily_change must be non-zero",
    )?;
    check_simulation_value(
        config,
        "daily_fluctuation",
        defaults.daily_fluctuation,
        |v| v >= 0.0,
        "daily_fluctuation must be non-negative",
    )?;
    check_simulation_value(
        config,
        "initial_fund",
        defaults.initial_fund,
        |v| v > 0.0,
        "initial_fund must be positive",
    )?;

    let start = optional_date(config, "simulation", "start_date")?;
    let end = optional_date(config, "simulation", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(invalid(
                "simulation",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    seed(config, "simulation")?;
    Ok(())
}

/// Non-finite values always fail, whatever `accept` says.
fn check_simulation_value(
    config: &dyn ConfigPort,
    key: &str,
    default: f64,
    accept: impl Fn(f64) -> bool,
    reason: &str,
) -> Result<(), StocksimError> {
    let value = config.get_double("simulation", key, default);
    if !value.is_finite() {
        return Err(invalid("simulation", key, &format!("{key} must be finite")));
    }
    if !accept(value) {
        return Err(invalid("simulation", key, reason));
    }
    Ok(())
}

fn validate_initial_fund(config: &dyn ConfigPort, section: &str) -> Result<(), StocksimError> {
    let value = config.get_double(section, "initial_fund", 0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            section,
            "initial_fund",
            "initial_fund must be non-negative",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), StocksimError> {
    let start_date = required_date(config, "backtest", "start_date")?;
    let end_date = required_date(config, "backtest", "end_date")?;

    if end_date < start_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> StocksimError {
    StocksimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_date(value: &str, section: &str, key: &str) -> Result<NaiveDate, StocksimError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        invalid(
            section,
            key,
            &format!("invalid {} format, expected YYYY-MM-DD", key),
        )
    })
}

pub fn required_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, StocksimError> {
    match config.get_string(section, key) {
        None => Err(StocksimError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
        Some(s) => parse_date(&s, section, key),
    }
}

pub fn optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, StocksimError> {
    config
        .get_string(section, key)
        .map(|s| parse_date(&s, section, key))
        .transpose()
}

/// `[backtest] weekdays`, Monday through Friday when absent.
pub fn weekdays(config: &dyn ConfigPort) -> Result<Option<Vec<Weekday>>, StocksimError> {
    match config.get_string("backtest", "weekdays") {
        None => Ok(None),
        Some(s) => {
            let days = parse_weekdays(&s).map_err(|e| invalid("backtest", "weekdays", &e))?;
            Ok(Some(days))
        }
    }
}

/// `[strategy] kind`, buy-and-hold when absent.
pub fn strategy_kind(config: &dyn ConfigPort) -> Result<StrategyKind, StocksimError> {
    match config.get_string("strategy", "kind") {
        None => Ok(StrategyKind::BuyAndHold),
        Some(s) => s
            .parse::<StrategyKind>()
            .map_err(|e| invalid("strategy", "kind", &e)),
    }
}

pub fn seed(config: &dyn ConfigPort, section: &str) -> Result<Option<u64>, StocksimError> {
    match config.get_string(section, "seed") {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| invalid(section, "seed", "seed must be a non-negative integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_backtest_config_passes() {
        let config = make_config(
            r#"
[backtest]
start_date = 2020-01-01
end_date = 2020-12-31
initial_fund = 100000.0
weekdays = mon,wed,fri
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());
        assert_eq!(
            weekdays(&config).unwrap(),
            Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri])
        );
    }

    #[test]
    fn missing_start_date_fails() {
        let config = make_config("[backtest]\nend_date = 2020-12-31\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigMissing { key, .. } if key == "start_date"));
    }

    #[test]
    fn malformed_date_fails() {
        let config = make_config("[backtest]\nstart_date = 01/01/2020\nend_date = 2020-12-31\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn reversed_dates_fail() {
        let config = make_config("[backtest]\nstart_date = 2021-01-01\nend_date = 2020-12-31\n");
        assert!(matches!(
            validate_backtest_config(&config),
            Err(StocksimError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn single_day_backtest_passes() {
        let config = make_config("[backtest]\nstart_date = 2021-01-04\nend_date = 2021-01-04\n");
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn negative_fund_fails() {
        let config = make_config(
            "[backtest]\nstart_date = 2020-01-01\nend_date = 2020-12-31\ninitial_fund = -1\n",
        );
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "initial_fund"));
    }

    #[test]
    fn bad_weekday_fails() {
        let config = make_config(
            "[backtest]\nstart_date = 2020-01-01\nend_date = 2020-12-31\nweekdays = mon,funday\n",
        );
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "weekdays"));
    }

    #[test]
    fn data_dir_required() {
        assert!(validate_data_config(&make_config("[data]\ndir = /tmp\n")).is_ok());
        assert!(matches!(
            validate_data_config(&make_config("[data]\n")),
            Err(StocksimError::ConfigMissing { section, .. }) if section == "data"
        ));
    }

    #[test]
    fn strategy_kind_defaults_and_parses() {
        assert_eq!(
            strategy_kind(&make_config("[strategy]\n")).unwrap(),
            StrategyKind::BuyAndHold
        );
        assert_eq!(
            strategy_kind(&make_config("[strategy]\nkind = random\n")).unwrap(),
            StrategyKind::Random
        );
        let err = validate_strategy_config(&make_config("[strategy]\nkind = martingale\n"))
            .unwrap_err();
        assert!(matches!(err, StocksimError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn strategy_seed_must_be_integer() {
        assert_eq!(
            seed(&make_config("[strategy]\nseed = 42\n"), "strategy").unwrap(),
            Some(42)
        );
        assert!(validate_strategy_config(&make_config("[strategy]\nseed = -3\n")).is_err());
    }

    #[test]
    fn empty_simulation_section_uses_valid_defaults() {
        assert!(validate_simulation_config(&make_config("[simulation]\n")).is_ok());
    }

    #[test]
    fn simulation_rejects_bad_values() {
        let cases = [
            ("num_simulations = 0", "num_simulations"),
            ("initial_price = 0", "initial_price"),
            ("daily_change = 0", "daily_change"),
            ("daily_fluctuation = -1", "daily_fluctuation"),
            ("initial_fund = -5", "initial_fund"),
            ("initial_fund = 0", "initial_fund"),
            ("daily_change = nan", "daily_change"),
            ("daily_change = inf", "daily_change"),
            ("daily_fluctuation = inf", "daily_fluctuation"),
            ("initial_price = -inf", "initial_price"),
        ];
        for (line, expected) in cases {
            let config = make_config(&format!("[simulation]\n{line}\n"));
            let err = validate_simulation_config(&config).unwrap_err();
            assert!(
                matches!(&err, StocksimError::ConfigInvalid { key, .. } if key == expected),
                "{line} gave {err:?}"
            );
        }
    }

    #[test]
    fn simulation_dates_must_be_ordered() {
        let config =
            make_config("[simulation]\nstart_date = 2012-01-01\nend_date = 2011-01-01\n");
        assert!(validate_simulation_config(&config).is_err());
    }
}
