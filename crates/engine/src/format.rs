//! Display formatting and typed parsing of cell values.
//!
//! Rendering is dispatched on the closed `ColumnType` set. A column may carry
//! a host formatter instead, which the engine calls without interpreting.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use datagrid_core::value::format_number;
use datagrid_core::Value;

use crate::column::{ColumnDescriptor, ColumnType};

/// Formatting settings shared by display, export and filter chips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub date_format: String,
    pub datetime_format: String,
    pub currency_symbol: String,
    pub decimals: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M".to_string(),
            currency_symbol: "₺".to_string(),
            decimals: 2,
        }
    }
}

/// Render a value the way the grid displays and exports it.
pub fn format_value(column: &ColumnDescriptor, value: &Value, options: &DisplayOptions) -> String {
    if let Some(formatter) = &column.formatter {
        return formatter(value);
    }
    if value.is_null() {
        return String::new();
    }

    match column.column_type {
        ColumnType::Number => match value.as_number() {
            Some(n) => format_number(n),
            None => value.to_text(),
        },
        ColumnType::Currency => match value.as_number() {
            Some(n) => format_currency(n, options),
            None => value.to_text(),
        },
        ColumnType::Percentage => match value.as_number() {
            Some(n) => format!("{:.2}%", n * 100.0),
            None => value.to_text(),
        },
        ColumnType::Date => match parse_date(value) {
            Some(d) => format_chrono(d.date(), &options.date_format).unwrap_or_else(|| value.to_text()),
            None => value.to_text(),
        },
        ColumnType::Datetime => match parse_date(value) {
            Some(d) => {
                format_chrono(d.datetime(), &options.datetime_format).unwrap_or_else(|| value.to_text())
            }
            None => value.to_text(),
        },
        ColumnType::Boolean => match value.as_bool() {
            Some(true) => "✓".to_string(),
            Some(false) => "✗".to_string(),
            None => value.to_text(),
        },
        ColumnType::Text | ColumnType::Status => value.to_text(),
        ColumnType::Actions => String::new(),
    }
}

fn format_currency(n: f64, options: &DisplayOptions) -> String {
    let sign = if n < 0.0 { "-" } else { "" };
    format!("{sign}{}{:.*}", options.currency_symbol, options.decimals, n.abs())
}

/// A bad format string from settings must not take the grid down.
fn format_chrono<T>(value: T, pattern: &str) -> Option<String>
where
    T: FormatWith,
{
    let mut out = String::new();
    value.write_formatted(&mut out, pattern).ok()?;
    Some(out)
}

trait FormatWith {
    fn write_formatted(&self, out: &mut String, pattern: &str) -> std::fmt::Result;
}

impl FormatWith for NaiveDate {
    fn write_formatted(&self, out: &mut String, pattern: &str) -> std::fmt::Result {
        write!(out, "{}", self.format(pattern))
    }
}

impl FormatWith for NaiveDateTime {
    fn write_formatted(&self, out: &mut String, pattern: &str) -> std::fmt::Result {
        write!(out, "{}", self.format(pattern))
    }
}

/// A parsed date or date-time. Date-only values compare at day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl ParsedDate {
    pub fn date(&self) -> NaiveDate {
        match self {
            ParsedDate::Date(d) => *d,
            ParsedDate::DateTime(dt) => dt.date(),
        }
    }

    pub fn datetime(&self) -> NaiveDateTime {
        match self {
            ParsedDate::Date(d) => d.and_hms_opt(0, 0, 0).unwrap_or_default(),
            ParsedDate::DateTime(dt) => *dt,
        }
    }

    pub fn is_date_only(&self) -> bool {
        matches!(self, ParsedDate::Date(_))
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Parse a date from text (ISO 8601 / RFC 3339 and a few common layouts) or
/// from a number of milliseconds since the Unix epoch.
pub fn parse_date(value: &Value) -> Option<ParsedDate> {
    match value {
        Value::Number(ms) if ms.is_finite() => {
            DateTime::from_timestamp_millis(*ms as i64).map(|dt| ParsedDate::DateTime(dt.naive_utc()))
        }
        Value::Text(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

pub fn parse_date_str(s: &str) -> Option<ParsedDate> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(ParsedDate::DateTime(dt.naive_utc()));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ParsedDate::DateTime(dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(ParsedDate::Date(d));
        }
    }
    None
}
