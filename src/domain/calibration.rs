//! Synthetic markets with known expected returns.
//!
//! A [`ControlledMarket`] pairs each series with optional [`StockMetadata`]
//! describing the return the generator was tuned for, so a strategy's
//! realized return can be compared against a known baseline.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::calendar::count_days;
use super::error::StocksimError;
use super::market::Market;
use super::series::ContinuousSeries;

/// Includes the quarter day from leap years.
pub const DAYS_PER_YEAR: f64 = 365.25;
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Expected (not realized) return statistics for a synthetic stock.
#[derive(Debug, Clone, PartialEq)]
pub struct StockMetadata {
    start: NaiveDate,
    end: NaiveDate,
    initial_price: f64,
    expected_daily_change: f64,
    expected_final_price: f64,
    num_days: f64,
    num_months: f64,
    num_years: f64,
    expected_daily_return_rate: f64,
    expected_monthly_return_rate: f64,
    expected_annual_return_rate: f64,
    expected_overall_return_rate: f64,
}

impl StockMetadata {
    /// Derives all statistics from one of `expected_daily_change` or
    /// `expected_final_price`. When both are given the daily change wins and
    /// the final price is recomputed from it.
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        initial_price: f64,
        expected_daily_change: Option<f64>,
        expected_final_price: Option<f64>,
    ) -> Result<Self, StocksimError> {
        if !(initial_price.is_finite() && initial_price > 0.0) {
            return Err(StocksimError::InvalidMetadata {
                reason: format!("initial price must be positive, got {initial_price}"),
            });
        }

        let num_days = count_days(start, end) as f64;
        if num_days < 1.0 {
            return Err(StocksimError::InvalidMetadata {
                reason: format!("end {end} is before start {start}"),
            });
        }
        let num_years = num_days / DAYS_PER_YEAR;
        let num_months = num_years * MONTHS_PER_YEAR;

        let (daily_change, final_price) = match (expected_daily_change, expected_final_price) {
            (Some(change), _) => (change, initial_price + num_days * change),
            (None, Some(final_price)) => ((final_price - initial_price) / num_days, final_price),
            (None, None) => {
                return Err(StocksimError::InvalidMetadata {
                    reason: "one of expected daily change or expected final price must be set"
                        .into(),
                });
            }
        };

        let overall = final_price / initial_price - 1.0;
        // (1 + rate)^periods = 1 + overall
        let compound = |periods: f64| (1.0 + overall).powf(1.0 / periods) - 1.0;

        Ok(Self {
            start,
            end,
            initial_price,
            expected_daily_change: daily_change,
            expected_final_price: final_price,
            num_days,
            num_months,
            num_years,
            expected_daily_return_rate: compound(num_days),
            expected_monthly_return_rate: compound(num_months),
            expected_annual_return_rate: compound(num_years),
            expected_overall_return_rate: overall,
        })
    }

    pub fn with_daily_change(
        start: NaiveDate,
        end: NaiveDate,
        initial_price: f64,
        daily_change: f64,
    ) -> Result<Self, StocksimError> {
        Self::new(start, end, initial_price, Some(daily_change), None)
    }

    pub fn with_final_price(
        start: NaiveDate,
        end: NaiveDate,
        initial_price: f64,
        final_price: f64,
    ) -> Result<Self, StocksimError> {
        Self::new(start, end, initial_price, None, Some(final_price))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn initial_price(&self) -> f64 {
        self.initial_price
    }

    pub fn expected_daily_change(&self) -> f64 {
        self.expected_daily_change
    }

    pub fn expected_final_price(&self) -> f64 {
        self.expected_final_price
    }

    pub fn num_days(&self) -> f64 {
        self.num_days
    }

    pub fn num_months(&self) -> f64 {
        self.num_months
    }

    pub fn num_years(&self) -> f64 {
        self.num_years
    }

    pub fn expected_daily_return_rate(&self) -> f64 {
        self.expected_daily_return_rate
    }

    pub fn expected_monthly_return_rate(&self) -> f64 {
        self.expected_monthly_return_rate
    }

    pub fn expected_annual_return_rate(&self) -> f64 {
        self.expected_annual_return_rate
    }

    pub fn expected_overall_return_rate(&self) -> f64 {
        self.expected_overall_return_rate
    }
}

/// A [`Market`] plus per-symbol calibration metadata.
#[derive(Debug, Clone, Default)]
pub struct ControlledMarket {
    market: Market,
    metadata: BTreeMap<String, StockMetadata>,
}

impl ControlledMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, symbol: &str, series: ContinuousSeries) {
        self.market.upsert(symbol, series);
    }

    pub fn upsert_metadata(&mut self, symbol: &str, metadata: StockMetadata) {
        self.metadata.insert(symbol.to_string(), metadata);
    }

    /// `None` when no calibration was registered for `symbol`.
    pub fn metadata(&self, symbol: &str) -> Option<&StockMetadata> {
        self.metadata.get(symbol)
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn symbols(&self) -> Vec<String> {
        self.market.symbols()
    }
}
