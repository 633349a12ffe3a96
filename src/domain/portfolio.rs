//! Portfolio state and the transaction engine.
//!
//! A portfolio owns cash, whole-share holdings and a simulation clock that
//! only moves forward. Every transaction is priced from the shared
//! [`Market`] at the transaction time and capped by what the portfolio can
//! afford (buys) or actually holds (sells).

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use super::error::StocksimError;
use super::market::Market;

/// Prices are floored to this value so share counts never divide by zero.
pub const MIN_PRICE: f64 = 1e-7;

/// Requested size meaning "as many shares as possible".
pub const UNBOUNDED: i64 = i64::MAX;

/// Outcome of a single transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub symbol: String,
    pub requested: i64,
    /// Signed like `requested`: positive for shares bought, negative for sold.
    pub executed: i64,
    pub price: f64,
    pub at: NaiveDateTime,
}

impl Fill {
    pub fn is_partial(&self) -> bool {
        self.executed != self.requested
    }
}

#[derive(Debug, Clone)]
pub struct Portfolio<'m> {
    market: &'m Market,
    cash: f64,
    holdings: BTreeMap<String, i64>,
    clock: NaiveDateTime,
    deadline: Option<NaiveDateTime>,
}

impl<'m> Portfolio<'m> {
    /// Creates a portfolio with no holdings.
    pub fn new(
        market: &'m Market,
        created_at: NaiveDateTime,
        initial_fund: f64,
        deadline: Option<NaiveDateTime>,
    ) -> Result<Self, StocksimError> {
        Self::with_holdings(market, created_at, initial_fund, BTreeMap::new(), deadline)
    }

    pub fn with_holdings(
        market: &'m Market,
        created_at: NaiveDateTime,
        initial_fund: f64,
        holdings: BTreeMap<String, i64>,
        deadline: Option<NaiveDateTime>,
    ) -> Result<Self, StocksimError> {
        if !initial_fund.is_finite() || initial_fund < 0.0 {
            return Err(StocksimError::InvalidPortfolioConfig {
                reason: format!("initial fund ({initial_fund}) must be non-negative"),
            });
        }
        if let Some(limit) = deadline {
            if limit < created_at {
                return Err(StocksimError::InvalidPortfolioConfig {
                    reason: format!(
                        "creation time ({created_at}) cannot be later than the deadline ({limit})"
                    ),
                });
            }
        }
        if let Some((symbol, shares)) = holdings.iter().find(|(_, shares)| **shares < 0) {
            return Err(StocksimError::InvalidPortfolioConfig {
                reason: format!("initial holding of {symbol} ({shares}) must be non-negative"),
            });
        }

        Ok(Self {
            market,
            cash: initial_fund,
            holdings,
            clock: created_at,
            deadline,
        })
    }

    pub fn market(&self) -> &'m Market {
        self.market
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn holdings(&self) -> &BTreeMap<String, i64> {
        &self.holdings
    }

    pub fn shares(&self, symbol: &str) -> i64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    pub fn clock(&self) -> NaiveDateTime {
        self.clock
    }

    pub fn deadline(&self) -> Option<NaiveDateTime> {
        self.deadline
    }

    fn violation(&self, requested: NaiveDateTime) -> StocksimError {
        StocksimError::TemporalOrderViolation {
            current: self.clock,
            requested,
            deadline: self.deadline,
        }
    }

    /// Moves the clock forward. Moving backwards is rejected.
    pub fn advance_clock(&mut self, to: NaiveDateTime) -> Result<(), StocksimError> {
        if to < self.clock {
            return Err(self.violation(to));
        }
        self.clock = to;
        Ok(())
    }

    /// Buys (`amount > 0`) or sells (`amount < 0`) shares of `symbol` at
    /// `at`, defaulting to the current clock.
    ///
    /// Buys are capped to the whole shares the cash covers; sells are capped
    /// to the shares held. The clock advances to the transaction time.
    pub fn transact(
        &mut self,
        symbol: &str,
        amount: i64,
        at: Option<NaiveDateTime>,
    ) -> Result<Fill, StocksimError> {
        let at = at.unwrap_or(self.clock);
        if at < self.clock || self.deadline.is_some_and(|limit| at > limit) {
            return Err(self.violation(at));
        }

        let price = self.market.price_at(symbol, at)?.max(MIN_PRICE);
        let held = self.holdings.entry(symbol.to_string()).or_insert(0);

        let executed = if amount > 0 {
            let bought = if price * amount as f64 > self.cash {
                let affordable = affordable_shares(self.cash, price).min(amount);
                if amount != UNBOUNDED {
                    tracing::debug!(
                        symbol,
                        requested = amount,
                        bought = affordable,
                        cash = self.cash,
                        "insufficient cash; partial buy"
                    );
                }
                affordable
            } else {
                amount
            };
            self.cash -= price * bought as f64;
            *held += bought;
            bought
        } else {
            let wanted = amount.unsigned_abs();
            let sold = if wanted > *held as u64 {
                if amount != -UNBOUNDED {
                    tracing::debug!(
                        symbol,
                        requested = wanted,
                        held = *held,
                        "selling more than held; selling all"
                    );
                }
                *held
            } else {
                wanted as i64
            };
            self.cash += price * sold as f64;
            *held -= sold;
            -sold
        };

        self.advance_clock(at)?;
        Ok(Fill {
            symbol: symbol.to_string(),
            requested: amount,
            executed,
            price,
            at,
        })
    }

    /// Spends all available cash on `symbol`.
    pub fn buy_all(
        &mut self,
        symbol: &str,
        at: Option<NaiveDateTime>,
    ) -> Result<Fill, StocksimError> {
        self.transact(symbol, UNBOUNDED, at)
    }

    /// Liquidates every share of `symbol`.
    pub fn sell_all(
        &mut self,
        symbol: &str,
        at: Option<NaiveDateTime>,
    ) -> Result<Fill, StocksimError> {
        self.transact(symbol, -UNBOUNDED, at)
    }

    /// Independent copy sharing the market, with the clock at the current time.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Independent copy with its clock set to `at`.
    pub fn copy_at(&self, at: NaiveDateTime) -> Result<Self, StocksimError> {
        Self::with_holdings(
            self.market,
            at,
            self.cash,
            self.holdings.clone(),
            self.deadline,
        )
    }

    /// Mark-to-market value: the cash left after liquidating every position
    /// at `at` (default: current clock). `self` is left untouched.
    pub fn evaluate(&self, at: Option<NaiveDateTime>) -> Result<f64, StocksimError> {
        let mut liquidation = self.copy();
        for (symbol, _) in self.holdings.iter().filter(|(_, shares)| **shares > 0) {
            liquidation.sell_all(symbol, at)?;
        }
        Ok(liquidation.cash)
    }
}

/// Whole shares purchasable with `cash` at `price`, never costing more than `cash`.
fn affordable_shares(cash: f64, price: f64) -> i64 {
    if cash <= 0.0 {
        return 0;
    }
    // Float-to-int casts saturate, so huge quotients stay in range.
    let shares = (cash / price).floor() as i64;
    if shares > 0 && shares as f64 * price > cash {
        shares - 1
    } else {
        shares
    }
}
