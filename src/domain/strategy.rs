//! Trading strategy interface and reference strategies.

use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

use super::error::StocksimError;
use super::market::Market;
use super::portfolio::Portfolio;

/// A strategy is asked to trade once per eligible day, in ascending order.
///
/// Transactions default to the portfolio clock, which the evaluator sets to
/// `trading_datetime` before the call. A strategy may trade later than that,
/// but never earlier than the clock or past the portfolio deadline.
pub trait Strategy {
    fn name(&self) -> &str;

    fn perform_trading(
        &mut self,
        portfolio: &mut Portfolio<'_>,
        trading_datetime: NaiveDateTime,
    ) -> Result<(), StocksimError>;
}

/// The fixed symbol if one was configured, otherwise the market's first.
fn resolve_symbol(fixed: Option<&str>, market: &Market) -> Result<String, StocksimError> {
    match fixed {
        Some(symbol) => Ok(symbol.to_string()),
        None => market
            .symbols()
            .into_iter()
            .next()
            .ok_or_else(|| StocksimError::UnknownSymbol {
                symbol: "<empty market>".into(),
            }),
    }
}

/// Puts all cash into one symbol every day.
#[derive(Debug, Clone, Default)]
pub struct BuyThenHold {
    symbol: Option<String>,
}

impl BuyThenHold {
    pub fn new(symbol: Option<String>) -> Self {
        Self { symbol }
    }
}

impl Strategy for BuyThenHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn perform_trading(
        &mut self,
        portfolio: &mut Portfolio<'_>,
        _trading_datetime: NaiveDateTime,
    ) -> Result<(), StocksimError> {
        let symbol = resolve_symbol(self.symbol.as_deref(), portfolio.market())?;
        portfolio.buy_all(&symbol, None)?;
        Ok(())
    }
}

/// Buys or sells a small random number of shares each day.
#[derive(Debug, Clone)]
pub struct RandomTrader<R> {
    symbol: Option<String>,
    rng: R,
}

impl<R: Rng> RandomTrader<R> {
    pub const MIN_TRADE: i64 = -2;
    pub const MAX_TRADE: i64 = 3;

    pub fn new(symbol: Option<String>, rng: R) -> Self {
        Self { symbol, rng }
    }
}

impl RandomTrader<StdRng> {
    pub fn seeded(symbol: Option<String>, seed: u64) -> Self {
        Self::new(symbol, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Strategy for RandomTrader<R> {
    fn name(&self) -> &str {
        "random"
    }

    fn perform_trading(
        &mut self,
        portfolio: &mut Portfolio<'_>,
        _trading_datetime: NaiveDateTime,
    ) -> Result<(), StocksimError> {
        let symbol = resolve_symbol(self.symbol.as_deref(), portfolio.market())?;
        let amount = self.rng.gen_range(Self::MIN_TRADE..=Self::MAX_TRADE);
        portfolio.transact(&symbol, amount, None)?;
        Ok(())
    }
}

/// Momentum rule on the short-window price slope: buy everything while the
/// price rose over the hour ending one hour ago, otherwise sell everything.
///
/// On days whose look-back window falls outside the known prices the
/// trader holds its position; any other pricing error aborts the run.
#[derive(Debug, Clone, Default)]
pub struct PriceDerivativeTrader {
    symbol: Option<String>,
}

impl PriceDerivativeTrader {
    pub fn new(symbol: Option<String>) -> Self {
        Self { symbol }
    }
}

impl Strategy for PriceDerivativeTrader {
    fn name(&self) -> &str {
        "price_derivative"
    }

    fn perform_trading(
        &mut self,
        portfolio: &mut Portfolio<'_>,
        trading_datetime: NaiveDateTime,
    ) -> Result<(), StocksimError> {
        let market = portfolio.market();
        let symbol = resolve_symbol(self.symbol.as_deref(), market)?;

        let lookback =
            |hours: i64| market.price_at(&symbol, trading_datetime - Duration::hours(hours));
        let (one_hour_ago, two_hours_ago) = match (lookback(1), lookback(2)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(StocksimError::OutOfDomain { .. }), _)
            | (_, Err(StocksimError::OutOfDomain { .. })) => {
                tracing::debug!(%symbol, %trading_datetime, "no look-back prices; holding");
                return Ok(());
            }
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };

        if one_hour_ago - two_hours_ago > 0.0 {
            portfolio.buy_all(&symbol, None)?;
        } else {
            portfolio.sell_all(&symbol, None)?;
        }
        Ok(())
    }
}

/// Reference strategies selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    BuyAndHold,
    Random,
    PriceDerivative,
}

impl StrategyKind {
    /// `seed` only affects [`StrategyKind::Random`]; without one the RNG is
    /// seeded from OS entropy.
    pub fn build(self, symbol: Option<String>, seed: Option<u64>) -> Box<dyn Strategy> {
        match self {
            StrategyKind::BuyAndHold => Box::new(BuyThenHold::new(symbol)),
            StrategyKind::Random => match seed {
                Some(seed) => Box::new(RandomTrader::seeded(symbol, seed)),
                None => Box::new(RandomTrader::new(symbol, StdRng::from_entropy())),
            },
            StrategyKind::PriceDerivative => Box::new(PriceDerivativeTrader::new(symbol)),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy_and_hold" | "buy-and-hold" | "hold" => Ok(StrategyKind::BuyAndHold),
            "random" => Ok(StrategyKind::Random),
            "price_derivative" | "price-derivative" | "momentum" => {
                Ok(StrategyKind::PriceDerivative)
            }
            other => Err(format!("unknown strategy kind: {other}")),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::BuyAndHold => "buy_and_hold",
            StrategyKind::Random => "random",
            StrategyKind::PriceDerivative => "price_derivative",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::midnight;
    use crate::domain::series::ContinuousSeries;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        midnight(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn market_with(points: Vec<(NaiveDateTime, f64)>) -> Market {
        let mut market = Market::new();
        market.upsert("AAA", ContinuousSeries::from_dates(points).unwrap());
        market
    }

    fn rising() -> Market {
        market_with(vec![(at(2020, 1, 1), 10.0), (at(2020, 1, 10), 100.0)])
    }

    fn falling() -> Market {
        market_with(vec![(at(2020, 1, 1), 100.0), (at(2020, 1, 10), 10.0)])
    }

    #[test]
    fn buy_then_hold_spends_everything() {
        let market = rising();
        let mut p = Portfolio::new(&market, at(2020, 1, 1), 1000.0, None).unwrap();
        let mut s = BuyThenHold::default();
        s.perform_trading(&mut p, at(2020, 1, 1)).unwrap();
        assert_eq!(p.shares("AAA"), 100);
        assert_eq!(p.cash(), 0.0);
    }

    #[test]
    fn fixed_symbol_overrides_first_symbol() {
        let mut market = rising();
        market.upsert(
            "BBB",
            ContinuousSeries::from_dates(vec![(at(2020, 1, 1), 5.0), (at(2020, 1, 10), 5.0)])
                .unwrap(),
        );
        let mut p = Portfolio::new(&market, at(2020, 1, 1), 100.0, None).unwrap();
        let mut s = BuyThenHold::new(Some("BBB".into()));
        s.perform_trading(&mut p, at(2020, 1, 1)).unwrap();
        assert_eq!(p.shares("BBB"), 20);
        assert_eq!(p.shares("AAA"), 0);
    }

    #[test]
    fn empty_market_reports_unknown_symbol() {
        let market = Market::new();
        let mut p = Portfolio::new(&market, at(2020, 1, 1), 100.0, None).unwrap();
        let result = BuyThenHold::default().perform_trading(&mut p, at(2020, 1, 1));
        assert!(matches!(result, Err(StocksimError::UnknownSymbol { .. })));
    }

    #[test]
    fn random_trader_is_reproducible_with_seed() {
        let market = rising();
        let run = |seed| {
            let mut p = Portfolio::new(&market, at(2020, 1, 1), 1000.0, None).unwrap();
            let mut s = RandomTrader::seeded(None, seed);
            for day in 1..=9 {
                s.perform_trading(&mut p, at(2020, 1, day)).unwrap();
                p.advance_clock(at(2020, 1, day + 1)).unwrap();
            }
            (p.cash(), p.shares("AAA"))
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn random_trader_trades_within_bounds() {
        let market = rising();
        let mut p = Portfolio::new(&market, at(2020, 1, 1), 1_000_000.0, None).unwrap();
        let mut s = RandomTrader::seeded(None, 42);
        let mut previous = 0;
        for _ in 0..50 {
            s.perform_trading(&mut p, at(2020, 1, 1)).unwrap();
            let delta = p.shares("AAA") - previous;
            assert!((-2..=3).contains(&delta));
            previous = p.shares("AAA");
        }
    }

    #[test]
    fn price_derivative_buys_on_rise() {
        let market = rising();
        let mut p = Portfolio::new(&market, at(2020, 1, 2), 1000.0, None).unwrap();
        PriceDerivativeTrader::default()
            .perform_trading(&mut p, at(2020, 1, 2))
            .unwrap();
        assert!(p.shares("AAA") > 0);
    }

    #[test]
    fn price_derivative_sells_on_fall() {
        let market = falling();
        let holdings = std::collections::BTreeMap::from([("AAA".to_string(), 4)]);
        let mut p =
            Portfolio::with_holdings(&market, at(2020, 1, 2), 0.0, holdings, None).unwrap();
        PriceDerivativeTrader::default()
            .perform_trading(&mut p, at(2020, 1, 2))
            .unwrap();
        assert_eq!(p.shares("AAA"), 0);
        assert!(p.cash() > 0.0);
    }

    #[test]
    fn price_derivative_holds_without_history() {
        let market = rising();
        let mut p = Portfolio::new(&market, at(2020, 1, 1), 1000.0, None).unwrap();
        PriceDerivativeTrader::default()
            .perform_trading(&mut p, at(2020, 1, 1))
            .unwrap();
        assert!(p.holdings().is_empty());
        assert_eq!(p.cash(), 1000.0);
    }

    #[test]
    fn strategy_kind_parses_and_builds() {
        assert_eq!(
            "buy_and_hold".parse::<StrategyKind>(),
            Ok(StrategyKind::BuyAndHold)
        );
        assert_eq!("Random".parse::<StrategyKind>(), Ok(StrategyKind::Random));
        assert_eq!(
            "momentum".parse::<StrategyKind>(),
            Ok(StrategyKind::PriceDerivative)
        );
        assert!("nope".parse::<StrategyKind>().is_err());

        let s = StrategyKind::Random.build(None, Some(1));
        assert_eq!(s.name(), "random");
        assert_eq!(StrategyKind::PriceDerivative.to_string(), "price_derivative");
    }
}
