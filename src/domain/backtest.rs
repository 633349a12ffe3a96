//! Day-stepped strategy evaluation loop.

use chrono::{Datelike, NaiveDate, Weekday};

use super::calendar::{days_between, midnight, WEEKDAYS};
use super::error::StocksimError;
use super::market::Market;
use super::portfolio::Portfolio;
use super::report::EvaluationReport;
use super::strategy::Strategy;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_fund: f64,
    pub valid_weekdays: Vec<Weekday>,
}

impl BacktestConfig {
    /// Trades Monday through Friday.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, initial_fund: f64) -> Self {
        Self {
            start_date,
            end_date,
            initial_fund,
            valid_weekdays: WEEKDAYS.to_vec(),
        }
    }

    pub fn with_weekdays(mut self, weekdays: &[Weekday]) -> Self {
        self.valid_weekdays = weekdays.to_vec();
        self
    }
}

pub fn run_backtest<'m>(
    market: &'m Market,
    strategy: &mut dyn Strategy,
    config: &BacktestConfig,
) -> Result<EvaluationReport<'m>, StocksimError> {
    evaluate_strategy(
        market,
        strategy,
        config.start_date,
        config.end_date,
        config.initial_fund,
        &config.valid_weekdays,
    )
}

/// Simulates `strategy` from `start` to `end` inclusive.
///
/// A fresh portfolio holding `initial_fund` is created at midnight of
/// `start` with a transaction deadline at midnight of `end`. For every
/// calendar day the clock is advanced to that day's midnight; on valid
/// weekdays the strategy trades and a snapshot is recorded. Any failure
/// aborts the whole evaluation.
pub fn evaluate_strategy<'m>(
    market: &'m Market,
    strategy: &mut dyn Strategy,
    start: NaiveDate,
    end: NaiveDate,
    initial_fund: f64,
    valid_weekdays: &[Weekday],
) -> Result<EvaluationReport<'m>, StocksimError> {
    tracing::info!(
        strategy = strategy.name(),
        %start,
        %end,
        initial_fund,
        "evaluating strategy"
    );

    let mut portfolio =
        Portfolio::new(market, midnight(start), initial_fund, Some(midnight(end)))?;
    let mut history = Vec::new();

    for day in days_between(start, end) {
        let trading_datetime = midnight(day);
        portfolio.advance_clock(trading_datetime)?;

        if !valid_weekdays.contains(&day.weekday()) {
            tracing::debug!(%day, "not a trading day; skipping");
            continue;
        }

        strategy.perform_trading(&mut portfolio, trading_datetime)?;
        history.push(portfolio.copy_at(trading_datetime)?);
    }

    if history.is_empty() {
        return Err(StocksimError::EmptyHistory {
            reason: format!("no valid trading day between {start} and {end}"),
        });
    }

    let report = EvaluationReport::new(history)?;
    tracing::info!(snapshots = report.len(), "evaluation finished");
    Ok(report)
}
