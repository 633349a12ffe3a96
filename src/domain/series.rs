//! Continuous price series built from discrete samples.
//!
//! Values between samples are linearly interpolated. Queries outside the
//! closed `[min_timestamp, max_timestamp]` domain fail; nothing is
//! extrapolated.

use chrono::NaiveDateTime;

use super::calendar::{from_timestamp, to_timestamp};
use super::error::StocksimError;

#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousSeries {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl ContinuousSeries {
    /// Builds a series from `(timestamp, value)` pairs in any order.
    ///
    /// Samples are sorted by timestamp. Empty input, non-finite numbers and
    /// duplicate timestamps are rejected with [`StocksimError::InvalidSeries`].
    pub fn new(mut points: Vec<(f64, f64)>) -> Result<Self, StocksimError> {
        if points.is_empty() {
            return Err(StocksimError::InvalidSeries {
                reason: "a series needs at least one sample".into(),
            });
        }
        if let Some((t, v)) = points
            .iter()
            .find(|(t, v)| !t.is_finite() || !v.is_finite())
        {
            return Err(StocksimError::InvalidSeries {
                reason: format!("non-finite sample ({t}, {v})"),
            });
        }

        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        if let Some(pair) = points.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(StocksimError::InvalidSeries {
                reason: format!("duplicate timestamp {}", pair[0].0),
            });
        }

        let (times, values) = points.into_iter().unzip();
        Ok(Self { times, values })
    }

    pub fn from_dates(points: Vec<(NaiveDateTime, f64)>) -> Result<Self, StocksimError> {
        Self::new(
            points
                .into_iter()
                .map(|(dt, v)| (to_timestamp(dt), v))
                .collect(),
        )
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false; construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn min_timestamp(&self) -> f64 {
        self.times[0]
    }

    pub fn max_timestamp(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    pub fn min_datetime(&self) -> Option<NaiveDateTime> {
        from_timestamp(self.min_timestamp())
    }

    pub fn max_datetime(&self) -> Option<NaiveDateTime> {
        from_timestamp(self.max_timestamp())
    }

    pub fn contains(&self, timestamp: f64) -> bool {
        timestamp >= self.min_timestamp() && timestamp <= self.max_timestamp()
    }

    fn check_domain(&self, timestamp: f64) -> Result<(), StocksimError> {
        if self.contains(timestamp) {
            Ok(())
        } else {
            Err(StocksimError::OutOfDomain {
                timestamp,
                min: self.min_timestamp(),
                max: self.max_timestamp(),
            })
        }
    }

    pub fn value_at(&self, timestamp: f64) -> Result<f64, StocksimError> {
        self.check_domain(timestamp)?;
        Ok(self.interpolate(timestamp))
    }

    pub fn value_at_datetime(&self, dt: NaiveDateTime) -> Result<f64, StocksimError> {
        self.value_at(to_timestamp(dt))
    }

    // Caller guarantees `timestamp` lies within the domain.
    fn interpolate(&self, timestamp: f64) -> f64 {
        let idx = self.times.partition_point(|&t| t < timestamp);
        if idx < self.times.len() && self.times[idx] == timestamp {
            return self.values[idx];
        }
        if idx == 0 {
            return self.values[0];
        }
        if idx >= self.times.len() {
            return self.values[self.values.len() - 1];
        }
        let (t0, t1) = (self.times[idx - 1], self.times[idx]);
        let (v0, v1) = (self.values[idx - 1], self.values[idx]);
        v0 + (v1 - v0) * (timestamp - t0) / (t1 - t0)
    }

    /// Mean of the interpolant over `[start, end]`.
    ///
    /// The interpolant is piecewise linear, so the trapezoid rule over the
    /// sample breakpoints integrates it exactly.
    pub fn range_average(&self, start: f64, end: f64) -> Result<f64, StocksimError> {
        self.check_domain(start)?;
        self.check_domain(end)?;
        if start >= end {
            return Err(StocksimError::InvalidSeries {
                reason: format!("range start {start} must be before end {end}"),
            });
        }

        let mut knots = vec![start];
        knots.extend(
            self.times
                .iter()
                .copied()
                .filter(|&t| t > start && t < end),
        );
        knots.push(end);

        let area: f64 = knots
            .windows(2)
            .map(|w| (w[1] - w[0]) * (self.interpolate(w[0]) + self.interpolate(w[1])) / 2.0)
            .sum();
        Ok(area / (end - start))
    }

    /// Samples inside `[start, end]`, without resampling.
    pub fn restrict_to_range(&self, start: f64, end: f64) -> Result<Self, StocksimError> {
        let points: Vec<(f64, f64)> = self
            .times
            .iter()
            .zip(&self.values)
            .filter(|(t, _)| **t >= start && **t <= end)
            .map(|(t, v)| (*t, *v))
            .collect();
        if points.is_empty() {
            return Err(StocksimError::InvalidSeries {
                reason: format!("no samples within [{start}, {end}]"),
            });
        }
        Self::new(points)
    }

    pub fn restrict_to_datetimes(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, StocksimError> {
        self.restrict_to_range(to_timestamp(start), to_timestamp(end))
    }
}
