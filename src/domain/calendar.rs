//! Calendar helpers shared by the simulation loop and series builders.
//!
//! Timestamps are UTC seconds since the epoch, stored as `f64`.

use chrono::{Datelike, DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

pub fn to_timestamp(dt: NaiveDateTime) -> f64 {
    dt.and_utc().timestamp() as f64
}

/// Sub-second precision is dropped.
pub fn from_timestamp(timestamp: f64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(timestamp.floor() as i64, 0).map(|dt| dt.naive_utc())
}

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Calendar days from `start` to `end`, both inclusive. Empty when `end < start`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

pub fn count_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        0
    } else {
        (end - start).num_days() + 1
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

pub const EVERYDAY: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Parses a comma separated weekday list such as `mon,tue,fri`.
pub fn parse_weekdays(input: &str) -> Result<Vec<Weekday>, String> {
    let mut days = Vec::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err("empty token in weekday list".to_string());
        }
        let day: Weekday = trimmed
            .parse()
            .map_err(|_| format!("unknown weekday: {trimmed}"))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}
