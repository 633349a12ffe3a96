//! Repeated evaluation of a single-stock strategy on synthetic markets.
//!
//! Each run compares the strategy's realized return with the return the
//! market was calibrated to produce. A ratio near 1.0 means the strategy
//! tracked the market; above 1.0 means it beat it.

use chrono::NaiveDate;
use rand::Rng;

use super::backtest::evaluate_strategy;
use super::calendar::WEEKDAYS;
use super::error::StocksimError;
use super::generation::{create_free_fluctuating_market, FreeMarketParams};
use super::strategy::Strategy;

#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub initial_price: f64,
    pub daily_change: f64,
    pub daily_fluctuation: f64,
    pub initial_fund: f64,
    pub num_simulations: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2011, 12, 31).unwrap_or_default(),
            initial_price: 1000.0,
            daily_change: 5.0,
            daily_fluctuation: 200.0,
            initial_fund: 100_000.0,
            num_simulations: 100,
        }
    }
}

/// Runs `params.num_simulations` evaluations, each with a fresh strategy
/// from `make_strategy` and a fresh one-symbol market, returning
/// `actual_return / expected_return` per run.
pub fn evaluate_using_free_market<F, R>(
    mut make_strategy: F,
    params: &SimulationParams,
    rng: &mut R,
) -> Result<Vec<f64>, StocksimError>
where
    F: FnMut() -> Box<dyn Strategy>,
    R: Rng,
{
    if !(params.initial_fund.is_finite() && params.initial_fund > 0.0) {
        return Err(StocksimError::InvalidPortfolioConfig {
            reason: format!(
                "simulation fund must be positive to compute returns, got {}",
                params.initial_fund
            ),
        });
    }

    let market_params = FreeMarketParams {
        start: params.start,
        end: params.end,
        num_symbols: 1,
        initial_price: params.initial_price,
        fluctuation_center: params.daily_change,
        fluctuation_strength: params.daily_fluctuation,
    };

    let mut ratios = Vec::with_capacity(params.num_simulations);
    for run in 0..params.num_simulations {
        let controlled = create_free_fluctuating_market(&market_params, rng)?;
        let mut strategy = make_strategy();
        let report = evaluate_strategy(
            controlled.market(),
            strategy.as_mut(),
            params.start,
            params.end,
            params.initial_fund,
            &WEEKDAYS,
        )?;

        let actual = report.final_total_value()? / params.initial_fund - 1.0;
        let symbol = controlled
            .symbols()
            .into_iter()
            .next()
            .ok_or_else(|| StocksimError::UnknownSymbol {
                symbol: "<empty market>".into(),
            })?;
        let expected = controlled
            .metadata(&symbol)
            .ok_or_else(|| StocksimError::InvalidMetadata {
                reason: format!("no calibration for {symbol}"),
            })?
            .expected_overall_return_rate();

        if expected == 0.0 || !expected.is_finite() {
            return Err(StocksimError::InvalidMetadata {
                reason: format!("expected return of {symbol} is {expected}; ratio is undefined"),
            });
        }

        tracing::debug!(run, actual, expected, "simulation finished");
        ratios.push(actual / expected);
    }
    Ok(ratios)
}

/// Mean, minimum and maximum of a set of ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl RatioStats {
    pub fn compute(ratios: &[f64]) -> Option<Self> {
        if ratios.is_empty() {
            return None;
        }
        let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
        let min = ratios.iter().copied().fold(f64::INFINITY, f64::min);
        let max = ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(RatioStats { mean, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::{BuyThenHold, RandomTrader, Strategy};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn short_params() -> SimulationParams {
        SimulationParams {
            start: date(2010, 1, 1),
            end: date(2010, 3, 31),
            num_simulations: 5,
            ..SimulationParams::default()
        }
    }

    #[test]
    fn one_ratio_per_simulation() {
        let mut rng = StdRng::seed_from_u64(11);
        let ratios = evaluate_using_free_market(
            || Box::new(BuyThenHold::default()) as Box<dyn Strategy>,
            &short_params(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(ratios.len(), 5);
        assert!(ratios.iter().all(|r| r.is_finite()));
    }

    #[test]
    fn deterministic_market_buy_and_hold_tracks_expectation() {
        let params = SimulationParams {
            daily_fluctuation: 0.0,
            num_simulations: 2,
            ..short_params()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let ratios = evaluate_using_free_market(
            || Box::new(BuyThenHold::default()) as Box<dyn Strategy>,
            &params,
            &mut rng,
        )
        .unwrap();
        // Bought 100 shares at 1000 on 2010-01-01 and evaluated on 2010-03-31,
        // the price having risen 89 * 5 while calibration spans 90 days.
        let expected = (1445.0 / 1000.0 - 1.0) / (1450.0 / 1000.0 - 1.0);
        for r in ratios {
            assert!((r - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = || {
            let mut rng = StdRng::seed_from_u64(5);
            let mut seed = 0;
            evaluate_using_free_market(
                || {
                    seed += 1;
                    Box::new(RandomTrader::seeded(None, seed)) as Box<dyn Strategy>
                },
                &short_params(),
                &mut rng,
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn ratio_stats() {
        let stats = RatioStats::compute(&[0.5, 1.0, 1.5]).unwrap();
        assert!((stats.mean - 1.0).abs() < 1e-12);
        assert_eq!(stats.min, 0.5);
        assert_eq!(stats.max, 1.5);
        assert!(RatioStats::compute(&[]).is_none());
    }

    #[test]
    fn zero_fund_is_rejected() {
        let params = SimulationParams {
            initial_fund: 0.0,
            num_simulations: 2,
            ..short_params()
        };
        let result = evaluate_using_free_market(
            || Box::new(BuyThenHold::default()) as Box<dyn Strategy>,
            &params,
            &mut StdRng::seed_from_u64(1),
        );
        assert!(matches!(
            result,
            Err(StocksimError::InvalidPortfolioConfig { .. })
        ));
    }

    #[test]
    fn zero_expected_return_is_rejected() {
        let params = SimulationParams {
            daily_change: 0.0,
            daily_fluctuation: 0.0,
            num_simulations: 1,
            ..short_params()
        };
        let result = evaluate_using_free_market(
            || Box::new(BuyThenHold::default()) as Box<dyn Strategy>,
            &params,
            &mut StdRng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(StocksimError::InvalidMetadata { .. })));
    }
}
