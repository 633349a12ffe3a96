//! Synthetic price generation with memoryless daily fluctuation.
//!
//! Each day's change is drawn independently of the history, so the expected
//! price path is a straight line with slope equal to the mean daily delta.

use chrono::NaiveDate;
use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use super::calendar::{days_between, midnight, to_timestamp};
use super::calibration::{ControlledMarket, StockMetadata};
use super::error::StocksimError;
use super::series::ContinuousSeries;

/// One sample per calendar day from `start` to `end`.
///
/// The first day holds `initial_value`; each later day adds `delta()` to
/// the previous value. Values never drop below zero.
pub fn generate_fluctuating_series<F>(
    start: NaiveDate,
    end: NaiveDate,
    initial_value: f64,
    mut delta: F,
) -> Result<ContinuousSeries, StocksimError>
where
    F: FnMut() -> f64,
{
    let mut points = Vec::new();
    let mut current: Option<f64> = None;
    for day in days_between(start, end) {
        let value = match current {
            None => initial_value,
            Some(previous) => (previous + delta()).max(0.0),
        };
        current = Some(value);
        points.push((to_timestamp(midnight(day)), value));
    }
    ContinuousSeries::new(points)
}

/// Delta function drawing uniformly from `[low, high]`.
pub fn uniform_delta<R: Rng>(rng: &mut R, low: f64, high: f64) -> impl FnMut() -> f64 + '_ {
    let dist = Uniform::new_inclusive(low, high);
    move || dist.sample(&mut *rng)
}

#[derive(Debug, Clone)]
pub struct FreeMarketParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub num_symbols: usize,
    pub initial_price: f64,
    /// Expected daily change.
    pub fluctuation_center: f64,
    /// Half-width of the uniform daily change around the center.
    pub fluctuation_strength: f64,
}

impl Default for FreeMarketParams {
    fn default() -> Self {
        FreeMarketParams {
            start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2015, 12, 31).unwrap_or_default(),
            num_symbols: 10,
            initial_price: 1000.0,
            fluctuation_center: 5.0,
            fluctuation_strength: 200.0,
        }
    }
}

pub fn synthetic_symbol(idx: usize) -> String {
    format!("STOCK_{idx}")
}

/// Builds a market of independently fluctuating symbols, each calibrated
/// with its expected daily change.
pub fn create_free_fluctuating_market<R: Rng>(
    params: &FreeMarketParams,
    rng: &mut R,
) -> Result<ControlledMarket, StocksimError> {
    if params.fluctuation_strength < 0.0 || !params.fluctuation_strength.is_finite() {
        return Err(StocksimError::InvalidMetadata {
            reason: format!(
                "fluctuation strength must be non-negative, got {}",
                params.fluctuation_strength
            ),
        });
    }

    let low = params.fluctuation_center - params.fluctuation_strength;
    let high = params.fluctuation_center + params.fluctuation_strength;
    if !(low.is_finite() && high.is_finite()) {
        return Err(StocksimError::InvalidMetadata {
            reason: format!(
                "daily change range [{low}, {high}] must be finite (center {})",
                params.fluctuation_center
            ),
        });
    }

    let mut market = ControlledMarket::new();
    for idx in 0..params.num_symbols {
        let symbol = synthetic_symbol(idx);
        let series = generate_fluctuating_series(
            params.start,
            params.end,
            params.initial_price,
            uniform_delta(rng, low, high),
        )?;
        market.upsert(&symbol, series);
        market.upsert_metadata(
            &symbol,
            StockMetadata::with_daily_change(
                params.start,
                params.end,
                params.initial_price,
                params.fluctuation_center,
            )?,
        );
    }
    Ok(market)
}
