//! Tolerant cell parsing.
//!
//! Both parsers distinguish "empty" from "malformed" so normalization can
//! decide which cases deserve a [`WarningKind`].

use casewatch_dataset_models::{DateOrder, WarningKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Unambiguous date-time layouts tried after RFC 3339.
const UNAMBIGUOUS_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const UNAMBIGUOUS_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

const MONTH_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const MONTH_FIRST_DATE_FORMATS: &[&str] = &["%m/%d/%Y"];

const DAY_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DAY_FIRST_DATE_FORMATS: &[&str] = &["%d/%m/%Y"];

/// Parses an event date cell.
///
/// Slash dates are read in `order` only, so a column never mixes
/// month-first and day-first readings. [`DateOrder::Auto`] reads
/// month-first here; [`detect_date_order`] resolves it for a whole column.
///
/// Returns `Ok(None)` for an empty cell and `Err(Unparseable)` for text that
/// matches no known layout (including out-of-range dates such as
/// `2019-13-40`).
///
/// # Errors
///
/// Returns [`WarningKind::Unparseable`] if the cell is non-empty and no
/// layout matches.
pub fn parse_event_date(s: &str, order: DateOrder) -> Result<Option<NaiveDate>, WarningKind> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.date_naive()));
    }

    let (datetime_formats, date_formats) = match order {
        DateOrder::DayFirst => (DAY_FIRST_DATETIME_FORMATS, DAY_FIRST_DATE_FORMATS),
        DateOrder::Auto | DateOrder::MonthFirst => {
            (MONTH_FIRST_DATETIME_FORMATS, MONTH_FIRST_DATE_FORMATS)
        }
    };

    parse_with(s, UNAMBIGUOUS_DATETIME_FORMATS, UNAMBIGUOUS_DATE_FORMATS)
        .or_else(|| parse_with(s, datetime_formats, date_formats))
        .map(Some)
        .ok_or(WarningKind::Unparseable)
}

/// Picks the slash-date order for a column of raw date cells.
///
/// Day-first as soon as one cell parses day-first but not month-first
/// (e.g. `25/12/2016`), month-first otherwise.
pub fn detect_date_order<'a>(cells: impl IntoIterator<Item = &'a str>) -> DateOrder {
    let day_first_only = |cell: &str| {
        parse_event_date(cell, DateOrder::MonthFirst).is_err()
            && matches!(parse_event_date(cell, DateOrder::DayFirst), Ok(Some(_)))
    };

    if cells.into_iter().any(day_first_only) {
        DateOrder::DayFirst
    } else {
        DateOrder::MonthFirst
    }
}

fn parse_with(s: &str, datetime_formats: &[&str], date_formats: &[&str]) -> Option<NaiveDate> {
    datetime_formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        })
}

/// Parses a count cell into a non-negative integer.
///
/// Integral text parses directly. Decimal text (`"3.0"`, `"2.7"`) is
/// truncated toward zero. Thousands separators are not accepted.
///
/// # Errors
///
/// Returns [`WarningKind::Missing`] for an empty cell,
/// [`WarningKind::Negative`] for a number below zero and
/// [`WarningKind::Unparseable`] for anything else that is not a finite
/// number.
pub fn parse_count(s: &str) -> Result<u64, WarningKind> {
    let s = s.trim();
    if s.is_empty() {
        return Err(WarningKind::Missing);
    }

    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }
    if s.parse::<i64>().is_ok() {
        return Err(WarningKind::Negative);
    }

    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f < 0.0 => Err(WarningKind::Negative),
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        Ok(f) if f.is_finite() && f <= u64::MAX as f64 => Ok(f.trunc() as u64),
        _ => Err(WarningKind::Unparseable),
    }
}
