#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use stocksim::domain::calendar::midnight;
use stocksim::domain::error::StocksimError;
use stocksim::domain::market::Market;
use stocksim::domain::series::ContinuousSeries;
use stocksim::ports::price_port::{PricePoint, PricePort};
use std::collections::BTreeMap;

pub struct MockPricePort {
    pub data: BTreeMap<String, Vec<PricePoint>>,
    pub errors: BTreeMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.data.entry(symbol.to_string()).or_default();
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn list_symbols(&self) -> Result<Vec<String>, StocksimError> {
        Ok(self.data.keys().cloned().collect())
    }

    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StocksimError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StocksimError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    midnight(date(y, m, d))
}

/// One point per day starting at `start`.
pub fn daily_points(start: NaiveDate, prices: &[f64]) -> Vec<PricePoint> {
    start
        .iter_days()
        .zip(prices)
        .map(|(date, &price)| PricePoint { date, price })
        .collect()
}

/// Price 1.0 through 2024-01-10, then 10.0 from 2024-01-11 to 2024-01-31.
pub fn jump_market() -> Market {
    let mut market = Market::new();
    market.upsert(
        "AAA",
        ContinuousSeries::from_dates(vec![
            (at(2024, 1, 1), 1.0),
            (at(2024, 1, 10), 1.0),
            (at(2024, 1, 11), 10.0),
            (at(2024, 1, 31), 10.0),
        ])
        .unwrap(),
    );
    market
}

/// Constant price over all of 2024.
pub fn flat_market(symbol: &str, price: f64) -> Market {
    let mut market = Market::new();
    market.upsert(
        symbol,
        ContinuousSeries::from_dates(vec![(at(2024, 1, 1), price), (at(2024, 12, 31), price)])
            .unwrap(),
    );
    market
}
