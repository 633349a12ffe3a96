//! Symbol registry with bounds-checked price lookup.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use super::calendar::to_timestamp;
use super::error::StocksimError;
use super::resample::resample_daily;
use super::series::ContinuousSeries;
use crate::ports::price_port::PricePort;

#[derive(Debug, Clone, Default)]
pub struct Market {
    series: BTreeMap<String, ContinuousSeries>,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a market from every symbol a price source lists. With
    /// `daily_resample` each series is resampled to one price per calendar day.
    pub fn from_source(
        source: &dyn PricePort,
        daily_resample: bool,
    ) -> Result<Self, StocksimError> {
        let mut market = Market::new();
        for symbol in source.list_symbols()? {
            let points = source.fetch_prices(&symbol)?;
            if points.is_empty() {
                tracing::warn!(%symbol, "price source returned no samples; skipping");
                continue;
            }
            let raw = ContinuousSeries::from_dates(
                points.into_iter().map(|p| (p.datetime(), p.price)).collect(),
            )?;
            let series = if daily_resample {
                resample_daily(&raw)?
            } else {
                raw
            };
            market.upsert(&symbol, series);
        }
        Ok(market)
    }

    /// Registers `series` for `symbol`, replacing any previous series.
    pub fn upsert(&mut self, symbol: &str, series: ContinuousSeries) {
        self.series.insert(symbol.to_string(), series);
    }

    pub fn series(&self, symbol: &str) -> Result<&ContinuousSeries, StocksimError> {
        self.series
            .get(symbol)
            .ok_or_else(|| StocksimError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    pub fn price_at_timestamp(&self, symbol: &str, timestamp: f64) -> Result<f64, StocksimError> {
        self.series(symbol)?.value_at(timestamp)
    }

    pub fn price_at(&self, symbol: &str, dt: NaiveDateTime) -> Result<f64, StocksimError> {
        self.price_at_timestamp(symbol, to_timestamp(dt))
    }

    /// Registered symbols in sorted order.
    pub fn symbols(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.series.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
