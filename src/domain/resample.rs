//! Derived series: daily resampling and monthly averages.

use chrono::NaiveDate;

use super::calendar::{days_between, first_of_month, last_of_month, midnight, to_timestamp};
use super::error::StocksimError;
use super::series::ContinuousSeries;

fn domain_dates(series: &ContinuousSeries) -> Result<(NaiveDate, NaiveDate), StocksimError> {
    match (series.min_datetime(), series.max_datetime()) {
        (Some(min), Some(max)) => Ok((min.date(), max.date())),
        _ => Err(StocksimError::InvalidSeries {
            reason: "series bounds are not representable as dates".into(),
        }),
    }
}

/// One interpolated sample at midnight of every calendar day inside the
/// series domain.
pub fn resample_daily(series: &ContinuousSeries) -> Result<ContinuousSeries, StocksimError> {
    let (first, last) = domain_dates(series)?;
    let mut points = Vec::new();
    for day in days_between(first, last) {
        let ts = to_timestamp(midnight(day));
        if series.contains(ts) {
            points.push((ts, series.value_at(ts)?));
        }
    }
    ContinuousSeries::new(points)
}

/// Average value over each calendar month lying strictly inside the domain,
/// keyed at midnight of the month's first day.
///
/// The partial months at either end are skipped.
pub fn monthly_averages(series: &ContinuousSeries) -> Result<ContinuousSeries, StocksimError> {
    let (first, last) = domain_dates(series)?;
    let mut month = last_of_month(first)
        .succ_opt()
        .ok_or_else(|| StocksimError::InvalidSeries {
            reason: "date overflow".into(),
        })?;
    let final_month = first_of_month(last);

    let mut points = Vec::new();
    while month < final_month {
        let start = to_timestamp(midnight(month));
        let end = to_timestamp(midnight(last_of_month(month)));
        points.push((start, series.range_average(start, end)?));
        month = match last_of_month(month).succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    ContinuousSeries::new(points)
}

/// Differences of monthly averages `m` months apart.
///
/// Returns `(A(i+m) - A(i), 100 * (A(i+m) - A(i)) / A(i))`, both keyed at
/// the timestamp of `A(i)`.
pub fn monthly_differences(
    series: &ContinuousSeries,
    months: usize,
) -> Result<(ContinuousSeries, ContinuousSeries), StocksimError> {
    let averages = monthly_averages(series)?;
    let times = averages.times();
    let values = averages.values();
    if months == 0 || months >= values.len() {
        return Err(StocksimError::InvalidSeries {
            reason: format!(
                "cannot difference {} monthly averages by {} months",
                values.len(),
                months
            ),
        });
    }

    let mut diff = Vec::with_capacity(values.len() - months);
    let mut pct = Vec::with_capacity(values.len() - months);
    for i in 0..values.len() - months {
        let delta = values[i + months] - values[i];
        diff.push((times[i], delta));
        pct.push((times[i], 100.0 * delta / values[i]));
    }
    Ok((ContinuousSeries::new(diff)?, ContinuousSeries::new(pct)?))
}
