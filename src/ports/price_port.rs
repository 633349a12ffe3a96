//! Price source port trait.

use crate::domain::calendar::midnight;
use crate::domain::error::StocksimError;
use chrono::{NaiveDate, NaiveDateTime};

/// A single closing price observation.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn datetime(&self) -> NaiveDateTime {
        midnight(self.date)
    }
}

pub trait PricePort {
    fn list_symbols(&self) -> Result<Vec<String>, StocksimError>;

    /// Samples for `symbol`, ascending by date.
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StocksimError>;
}
