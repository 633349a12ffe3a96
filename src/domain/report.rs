//! Read-only queries over an evaluation's snapshot history.

use chrono::NaiveDateTime;
use std::collections::BTreeSet;

use super::calendar::to_timestamp;
use super::error::StocksimError;
use super::portfolio::Portfolio;
use super::series::ContinuousSeries;

/// Ordered portfolio snapshots, earliest first. Never empty.
#[derive(Debug, Clone)]
pub struct EvaluationReport<'m> {
    history: Vec<Portfolio<'m>>,
}

/// One line of the tabular dump.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub timestamp: f64,
    pub datetime: NaiveDateTime,
    pub cash: f64,
    pub total_value: f64,
    /// Aligned with [`ReportTable::symbols`].
    pub shares: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub symbols: Vec<String>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub initial_value: f64,
    pub final_value: f64,
    pub total_return: f64,
    /// Largest peak-to-trough decline of total value, as a fraction of the peak.
    pub max_drawdown: f64,
}

impl<'m> EvaluationReport<'m> {
    pub fn new(history: Vec<Portfolio<'m>>) -> Result<Self, StocksimError> {
        if history.is_empty() {
            return Err(StocksimError::EmptyHistory {
                reason: "a report requires at least one snapshot".into(),
            });
        }
        Ok(Self { history })
    }

    pub fn snapshots(&self) -> &[Portfolio<'m>] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Always false; construction rejects an empty history.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    fn last(&self) -> &Portfolio<'m> {
        &self.history[self.history.len() - 1]
    }

    pub fn final_datetime(&self) -> NaiveDateTime {
        self.last().clock()
    }

    pub fn final_total_value(&self) -> Result<f64, StocksimError> {
        self.last().evaluate(None)
    }

    pub fn total_values(&self) -> Result<Vec<f64>, StocksimError> {
        self.history.iter().map(|p| p.evaluate(None)).collect()
    }

    pub fn total_value_series(&self) -> Result<ContinuousSeries, StocksimError> {
        let values = self.total_values()?;
        ContinuousSeries::new(self.timestamps().zip(values).collect())
    }

    /// Shares of `symbol` held at each snapshot; zero before first purchase.
    pub fn share_series(&self, symbol: &str) -> Result<ContinuousSeries, StocksimError> {
        ContinuousSeries::new(
            self.timestamps()
                .zip(self.history.iter().map(|p| p.shares(symbol) as f64))
                .collect(),
        )
    }

    fn timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().map(|p| to_timestamp(p.clock()))
    }

    /// Every symbol that appears in any snapshot, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let all: BTreeSet<&String> = self
            .history
            .iter()
            .flat_map(|p| p.holdings().keys())
            .collect();
        all.into_iter().cloned().collect()
    }

    pub fn table(&self) -> Result<ReportTable, StocksimError> {
        let symbols = self.symbols();
        let rows = self
            .history
            .iter()
            .map(|p| {
                Ok(ReportRow {
                    timestamp: to_timestamp(p.clock()),
                    datetime: p.clock(),
                    cash: p.cash(),
                    total_value: p.evaluate(None)?,
                    shares: symbols.iter().map(|s| p.shares(s)).collect(),
                })
            })
            .collect::<Result<Vec<_>, StocksimError>>()?;
        Ok(ReportTable { symbols, rows })
    }

    pub fn summary(&self) -> Result<ReportSummary, StocksimError> {
        let values = self.total_values()?;
        let initial_value = values[0];
        let final_value = values[values.len() - 1];
        let total_return = if initial_value > 0.0 {
            final_value / initial_value - 1.0
        } else {
            0.0
        };

        Ok(ReportSummary {
            start: self.history[0].clock(),
            end: self.final_datetime(),
            initial_value,
            final_value,
            total_return,
            max_drawdown: max_drawdown(&values),
        })
    }
}

fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &v in values {
        peak = peak.max(v);
        if peak > 0.0 {
            worst = worst.max((peak - v) / peak);
        }
    }
    worst
}
