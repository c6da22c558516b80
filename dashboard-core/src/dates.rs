//! Date-range rules for the archive.
//!
//! The archive only serves a sliding window of recent days, so every range is
//! checked against "today" before a request is built. Functions take `today`
//! explicitly; [`today`] gives the local calendar date for callers.

use chrono::{Days, Local, NaiveDate};
use std::str::FromStr;

use crate::{DateRange, error::DateRangeError};

/// How far back the archive window reaches.
pub const MAX_DAYS_BACK: u64 = 90;

/// Default cap on the span of a single request.
pub const MAX_DATE_RANGE_DAYS: u64 = 90;

const DEFAULT_RANGE_DAYS: u64 = 7;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| DateRangeError::InvalidFormat)
}

/// Earliest date still inside the archive window.
pub fn minimum_date(today: NaiveDate, max_days_back: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(max_days_back)).unwrap_or(NaiveDate::MIN)
}

pub fn days_between(start: NaiveDate, end: NaiveDate) -> u64 {
    (end - start).num_days().unsigned_abs()
}

/// Yesterday: the last day whose data is complete.
pub fn recommended_end_date(today: NaiveDate) -> NaiveDate {
    today.pred_opt().unwrap_or(today)
}

pub fn includes_current_day(range: &DateRange, today: NaiveDate) -> bool {
    range.start <= today && range.end >= today
}

/// Last week up to and including today.
pub fn default_date_range(today: NaiveDate) -> DateRange {
    let start = today.checked_sub_days(Days::new(DEFAULT_RANGE_DAYS)).unwrap_or(today);
    DateRange::new(start, today)
}

/// An accepted range, possibly with a caveat worth showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeCheck {
    pub range: DateRange,
    pub note: Option<String>,
}

/// Validates `YYYY-MM-DD` strings; see [`validate_range`].
pub fn validate_date_range(
    start: &str,
    end: &str,
    max_days: u64,
    today: NaiveDate,
) -> Result<RangeCheck, DateRangeError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    validate_range(DateRange::new(start, end), max_days, today)
}

/// Rules are checked in order: ordering, future, window, span.
pub fn validate_range(
    range: DateRange,
    max_days: u64,
    today: NaiveDate,
) -> Result<RangeCheck, DateRangeError> {
    let DateRange { start, end } = range;
    let min_allowed = minimum_date(today, MAX_DAYS_BACK);

    if start >= end {
        return Err(DateRangeError::StartNotBeforeEnd);
    }
    if start > today || end > today {
        return Err(DateRangeError::Future);
    }
    // start < end here, so the start bounds both dates.
    if start < min_allowed {
        return Err(DateRangeError::TooOld { max_days_back: MAX_DAYS_BACK });
    }
    if days_between(start, end) > max_days {
        return Err(DateRangeError::TooLong { max_days });
    }

    let note = (end == today).then(|| "Note: Today's data may be incomplete".to_string());

    Ok(RangeCheck { range, note })
}

/// One-click presets. Each ends yesterday so the data is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRange {
    LastWeek,
    LastTwoWeeks,
    LastMonth,
    LastThreeMonths,
}

impl QuickRange {
    pub fn days(&self) -> u64 {
        match self {
            QuickRange::LastWeek => 7,
            QuickRange::LastTwoWeeks => 14,
            QuickRange::LastMonth => 30,
            QuickRange::LastThreeMonths => 90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuickRange::LastWeek => "Last 7 days",
            QuickRange::LastTwoWeeks => "Last 14 days",
            QuickRange::LastMonth => "Last 30 days",
            QuickRange::LastThreeMonths => "Last 90 days",
        }
    }

    pub const fn all() -> &'static [QuickRange] {
        &[
            QuickRange::LastWeek,
            QuickRange::LastTwoWeeks,
            QuickRange::LastMonth,
            QuickRange::LastThreeMonths,
        ]
    }

    /// The concrete range for `today`, clamped to the archive window.
    pub fn range(&self, today: NaiveDate) -> DateRange {
        let end = recommended_end_date(today);
        let min_allowed = minimum_date(today, MAX_DAYS_BACK);
        let start = end
            .checked_sub_days(Days::new(self.days()))
            .unwrap_or(min_allowed)
            .max(min_allowed);

        DateRange::new(start, end)
    }
}

impl FromStr for QuickRange {
    type Err = anyhow::Error;

    /// Accepts `7`, `7d`, `last-7` and `last7d` forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let digits = lower
            .trim_start_matches("last")
            .trim_start_matches(['-', '_'])
            .trim_end_matches("days")
            .trim_end_matches('d');

        match digits {
            "7" => Ok(QuickRange::LastWeek),
            "14" => Ok(QuickRange::LastTwoWeeks),
            "30" => Ok(QuickRange::LastMonth),
            "90" => Ok(QuickRange::LastThreeMonths),
            _ => Err(anyhow::anyhow!(
                "Unknown preset '{s}'. Supported presets: 7d, 14d, 30d, 90d."
            )),
        }
    }
}
