//! Filter engine - per-column predicates plus one global search term.
//!
//! Key invariants:
//! - At most one entry per field
//! - A null/blank value clears the entry (range operators: both bounds blank)
//! - `value_to` is only meaningful for range operators
//! - Evaluation is the conjunction of the global term and every entry
//!
//! Filter values are parsed once into a `RowFilter` before rows are scanned.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use datagrid_core::{Record, Value};

use crate::column::{ColumnModel, FilterKind};
use crate::error::{GridError, Result};
use crate::format::{parse_date, ParsedDate};

// =============================================================================
// Operators and entries
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Contains,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,
    InRange,
    DateRange,
}

impl FilterOperator {
    pub fn is_range(self) -> bool {
        matches!(self, FilterOperator::InRange | FilterOperator::DateRange)
    }

    /// Operator used when a column is filtered without choosing one.
    pub fn default_for(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Text => FilterOperator::Contains,
            FilterKind::Numeric | FilterKind::Boolean => FilterOperator::Equals,
            FilterKind::Date => FilterOperator::DateRange,
        }
    }
}

/// One active column filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterEntry {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_to: Option<Value>,
}

/// Filter descriptor handed to a server-mode data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, ServerFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerFilter {
    pub operator: FilterOperator,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_to: Option<Value>,
}

/// Filter chip: what is filtered and how to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter {
    pub field: String,
    pub label: String,
    pub display_value: String,
}

// =============================================================================
// TypedKey: value keyed by the column's filter kind
// =============================================================================

/// Comparable key derived from a cell value and its column's filter kind.
///
/// Values that do not parse as the column's kind fall back to lowercase text,
/// and sort after every typed value. Blank sorts last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypedKey {
    Bool(bool),
    Number(OrderedFloat<f64>),
    Date(NaiveDateTime),
    Text(String),
    Blank,
}

impl TypedKey {
    pub fn from_value(value: &Value, kind: FilterKind) -> Self {
        if value.is_blank() {
            return TypedKey::Blank;
        }
        let typed = match kind {
            FilterKind::Numeric => value.as_number().map(|n| TypedKey::Number(OrderedFloat(n))),
            FilterKind::Date => parse_date(value).map(|d| TypedKey::Date(d.datetime())),
            FilterKind::Boolean => value.as_bool().map(TypedKey::Bool),
            FilterKind::Text => None,
        };
        typed.unwrap_or_else(|| TypedKey::Text(normalize_text(&value.to_text())))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, TypedKey::Blank)
    }
}

fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

// =============================================================================
// FilterEngine
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterEngine {
    entries: BTreeMap<String, FilterEntry>,
    global: Option<String>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set, replace or clear the filter on `field`. Returns true if the active
    /// filter set changed.
    pub fn set_filter(
        &mut self,
        columns: &ColumnModel,
        field: &str,
        operator: FilterOperator,
        value: Value,
        value_to: Option<Value>,
    ) -> Result<bool> {
        let column = columns.require(field)?;
        if !column.filterable {
            return Err(GridError::NotFilterable(field.to_string()));
        }

        let value_to = value_to.filter(|v| !v.is_blank());
        if value_to.is_some() && !operator.is_range() {
            return Err(GridError::InvalidFilter {
                field: field.to_string(),
                reason: "a second bound is only allowed for range operators".into(),
            });
        }

        if value.is_blank() && value_to.is_none() {
            return Ok(self.entries.remove(field).is_some());
        }

        let entry = FilterEntry {
            field: field.to_string(),
            operator,
            value,
            value_to,
        };
        validate_entry(&entry, column.filter_kind)?;

        if self.entries.get(field) == Some(&entry) {
            return Ok(false);
        }
        self.entries.insert(field.to_string(), entry);
        Ok(true)
    }

    pub fn clear_filter(&mut self, field: &str) -> bool {
        self.entries.remove(field).is_some()
    }

    /// Replace the global search term. Blank clears it.
    pub fn set_global_search(&mut self, term: &str) -> bool {
        let next = Some(term.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if next == self.global {
            return false;
        }
        self.global = next;
        true
    }

    /// Drop every column filter and the global term at once.
    pub fn clear_all(&mut self) -> bool {
        let changed = !self.entries.is_empty() || self.global.is_some();
        self.entries.clear();
        self.global = None;
        changed
    }

    pub fn filter(&self, field: &str) -> Option<&FilterEntry> {
        self.entries.get(field)
    }

    pub fn entries(&self) -> &BTreeMap<String, FilterEntry> {
        &self.entries
    }

    pub fn global_search(&self) -> Option<&str> {
        self.global.as_deref()
    }

    pub fn is_active(&self) -> bool {
        !self.entries.is_empty() || self.global.is_some()
    }

    /// Replace all column filters with already-validated entries.
    pub(crate) fn replace_entries(&mut self, entries: BTreeMap<String, FilterEntry>) -> bool {
        if entries == self.entries {
            return false;
        }
        self.entries = entries;
        true
    }

    /// Parse the active filters once for repeated evaluation.
    pub fn compile<'a>(&'a self, columns: &'a ColumnModel) -> RowFilter<'a> {
        let global = self.global.as_ref().map(|term| GlobalTerm {
            needle: term.to_lowercase(),
            fields: columns.searchable_columns().map(|c| c.field.as_str()).collect(),
        });

        let clauses = self
            .entries
            .values()
            .map(|entry| {
                let kind = columns
                    .column(&entry.field)
                    .map(|c| c.filter_kind)
                    .unwrap_or_default();
                Clause {
                    field: entry.field.as_str(),
                    kind,
                    matcher: Matcher::compile(entry, kind),
                }
            })
            .collect();

        RowFilter { global, clauses }
    }

    /// Whether a single row passes. Prefer `compile` when scanning many rows.
    pub fn evaluate(&self, columns: &ColumnModel, row: &Record) -> bool {
        self.compile(columns).matches(row)
    }

    pub fn to_server_query(&self) -> ServerQuery {
        ServerQuery {
            global: self.global.clone(),
            filters: self
                .entries
                .iter()
                .map(|(field, entry)| {
                    (
                        field.clone(),
                        ServerFilter {
                            operator: entry.operator,
                            value: entry.value.clone(),
                            value_to: entry.value_to.clone(),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Filter chips in column display order.
    pub fn active_filters(&self, columns: &ColumnModel) -> Vec<ActiveFilter> {
        columns
            .columns()
            .iter()
            .filter_map(|column| {
                let entry = self.entries.get(&column.field)?;
                Some(ActiveFilter {
                    field: column.field.clone(),
                    label: column.label.clone(),
                    display_value: display_entry(entry),
                })
            })
            .collect()
    }
}

/// Check the filter value parses as the column's kind, so evaluation never
/// silently matches nothing because of a typo.
fn validate_entry(entry: &FilterEntry, kind: FilterKind) -> Result<()> {
    let invalid = |reason: &str| GridError::InvalidFilter {
        field: entry.field.clone(),
        reason: reason.to_string(),
    };
    let bounds = || std::iter::once(&entry.value).chain(entry.value_to.iter());

    match entry.operator {
        FilterOperator::InRange => {
            if bounds().any(|b| !b.is_blank() && b.as_number().is_none()) {
                return Err(invalid("range bounds must be numeric"));
            }
        }
        FilterOperator::DateRange => {
            if bounds().any(|b| !b.is_blank() && parse_date(b).is_none()) {
                return Err(invalid("range bounds must be dates"));
            }
        }
        FilterOperator::Equals | FilterOperator::NotEquals => match kind {
            FilterKind::Numeric if entry.value.as_number().is_none() => {
                return Err(invalid("value must be numeric"));
            }
            FilterKind::Date if parse_date(&entry.value).is_none() => {
                return Err(invalid("value must be a date"));
            }
            FilterKind::Boolean if entry.value.as_bool().is_none() => {
                return Err(invalid("value must be true or false"));
            }
            _ => {}
        },
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            if entry.value.is_blank() {
                return Err(invalid("text operators need a value"));
            }
        }
    }
    Ok(())
}

fn display_entry(entry: &FilterEntry) -> String {
    if !entry.operator.is_range() {
        return entry.value.to_text();
    }
    let from = Some(&entry.value).filter(|v| !v.is_blank());
    let to = entry.value_to.as_ref().filter(|v| !v.is_blank());
    match (from, to) {
        (Some(a), Some(b)) => format!("{} – {}", a.to_text(), b.to_text()),
        (Some(a), None) => format!("≥ {}", a.to_text()),
        (None, Some(b)) => format!("≤ {}", b.to_text()),
        (None, None) => String::new(),
    }
}

// =============================================================================
// RowFilter: compiled predicate
// =============================================================================

pub struct RowFilter<'a> {
    global: Option<GlobalTerm<'a>>,
    clauses: Vec<Clause<'a>>,
}

struct GlobalTerm<'a> {
    needle: String,
    fields: Vec<&'a str>,
}

struct Clause<'a> {
    field: &'a str,
    kind: FilterKind,
    matcher: Matcher,
}

/// One end of a date range. Date-only bounds compare whole days.
#[derive(Debug, Clone, Copy)]
enum DateBound {
    Day(NaiveDate),
    Instant(NaiveDateTime),
}

impl DateBound {
    fn from_value(value: &Value) -> Option<Self> {
        if value.is_blank() {
            return None;
        }
        parse_date(value).map(|d| match d {
            ParsedDate::Date(day) => DateBound::Day(day),
            ParsedDate::DateTime(dt) => DateBound::Instant(dt),
        })
    }
}

enum Matcher {
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    Equals(TypedKey),
    NotEquals(TypedKey),
    DateEquals(DateBound),
    DateNotEquals(DateBound),
    Range { lo: Option<f64>, hi: Option<f64> },
    DateRange { lo: Option<DateBound>, hi: Option<DateBound> },
    /// Bound could not be parsed; never matches.
    Never,
}

impl Matcher {
    fn compile(entry: &FilterEntry, kind: FilterKind) -> Self {
        let needle = || entry.value.to_text().to_lowercase();
        match entry.operator {
            FilterOperator::Contains => Matcher::Contains(needle()),
            FilterOperator::StartsWith => Matcher::StartsWith(needle()),
            FilterOperator::EndsWith => Matcher::EndsWith(needle()),
            FilterOperator::Equals | FilterOperator::NotEquals => {
                let equals = entry.operator == FilterOperator::Equals;
                if kind == FilterKind::Date {
                    return match DateBound::from_value(&entry.value) {
                        Some(b) if equals => Matcher::DateEquals(b),
                        Some(b) => Matcher::DateNotEquals(b),
                        None => Matcher::Never,
                    };
                }
                let key = TypedKey::from_value(&entry.value, kind);
                if equals {
                    Matcher::Equals(key)
                } else {
                    Matcher::NotEquals(key)
                }
            }
            FilterOperator::InRange => {
                let bound = |v: Option<&Value>| v.filter(|v| !v.is_blank()).map(|v| v.as_number());
                match (bound(Some(&entry.value)), bound(entry.value_to.as_ref())) {
                    (Some(None), _) | (_, Some(None)) => Matcher::Never,
                    (lo, hi) => Matcher::Range {
                        lo: lo.flatten(),
                        hi: hi.flatten(),
                    },
                }
            }
            FilterOperator::DateRange => {
                let lo = DateBound::from_value(&entry.value);
                let hi = entry.value_to.as_ref().and_then(DateBound::from_value);
                if (lo.is_none() && !entry.value.is_blank())
                    || (hi.is_none() && entry.value_to.as_ref().is_some_and(|v| !v.is_blank()))
                {
                    Matcher::Never
                } else {
                    Matcher::DateRange { lo, hi }
                }
            }
        }
    }

    fn matches(&self, value: &Value, kind: FilterKind) -> bool {
        match self {
            Matcher::Contains(needle) => value.to_text().to_lowercase().contains(needle.as_str()),
            Matcher::StartsWith(needle) => value.to_text().to_lowercase().starts_with(needle.as_str()),
            Matcher::EndsWith(needle) => value.to_text().to_lowercase().ends_with(needle.as_str()),
            Matcher::Equals(key) => TypedKey::from_value(value, kind) == *key,
            Matcher::NotEquals(key) => TypedKey::from_value(value, kind) != *key,
            Matcher::DateEquals(bound) => parse_date(value).is_some_and(|d| date_equals(d, *bound)),
            Matcher::DateNotEquals(bound) => !parse_date(value).is_some_and(|d| date_equals(d, *bound)),
            Matcher::Range { lo, hi } => match value.as_number() {
                Some(x) => lo.map_or(true, |lo| x >= lo) && hi.map_or(true, |hi| x <= hi),
                None => false,
            },
            Matcher::DateRange { lo, hi } => match parse_date(value) {
                Some(d) => {
                    lo.map_or(true, |lo| after_or_at(d, lo)) && hi.map_or(true, |hi| before_or_at(d, hi))
                }
                None => false,
            },
            Matcher::Never => false,
        }
    }
}

fn date_equals(d: ParsedDate, bound: DateBound) -> bool {
    match bound {
        DateBound::Day(day) => d.date() == day,
        DateBound::Instant(at) => d.datetime() == at,
    }
}

fn after_or_at(d: ParsedDate, bound: DateBound) -> bool {
    match bound {
        DateBound::Day(day) => d.date() >= day,
        DateBound::Instant(at) => d.datetime() >= at,
    }
}

fn before_or_at(d: ParsedDate, bound: DateBound) -> bool {
    match bound {
        DateBound::Day(day) => d.date() <= day,
        DateBound::Instant(at) => d.datetime() <= at,
    }
}

impl RowFilter<'_> {
    pub fn matches(&self, row: &Record) -> bool {
        if let Some(global) = &self.global {
            let hit = global
                .fields
                .iter()
                .any(|f| row.get(f).to_text().to_lowercase().contains(global.needle.as_str()));
            if !hit {
                return false;
            }
        }
        self.clauses
            .iter()
            .all(|c| c.matcher.matches(row.get(c.field), c.kind))
    }

    pub fn is_pass_through(&self) -> bool {
        self.global.is_none() && self.clauses.is_empty()
    }
}

impl fmt::Debug for RowFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowFilter")
            .field("global", &self.global.as_ref().map(|g| &g.needle))
            .field("clauses", &self.clauses.iter().map(|c| c.field).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDescriptor;

    fn columns() -> ColumnModel {
        ColumnModel::new(vec![
            ColumnDescriptor::text("name", "Name"),
            ColumnDescriptor::number("price", "Price"),
            ColumnDescriptor::date("created", "Created"),
            ColumnDescriptor::boolean("active", "Active"),
            ColumnDescriptor::text("secret", "Secret").searchable(false),
            ColumnDescriptor::text("notes", "Notes").filterable(false),
        ])
        .unwrap()
    }

    fn row(name: &str, price: f64, created: &str, active: bool) -> Record {
        Record::new()
            .with("name", name)
            .with("price", price)
            .with("created", created)
            .with("active", active)
            .with("secret", "hidden-token")
    }

    #[test]
    fn test_unknown_and_unfilterable() {
        let cols = columns();
        let mut f = FilterEngine::new();
        assert!(matches!(
            f.set_filter(&cols, "nope", FilterOperator::Contains, "x".into(), None),
            Err(GridError::UnknownColumn(_))
        ));
        assert!(matches!(
            f.set_filter(&cols, "notes", FilterOperator::Contains, "x".into(), None),
            Err(GridError::NotFilterable(_))
        ));
    }

    #[test]
    fn test_value_to_requires_range_operator() {
        let cols = columns();
        let mut f = FilterEngine::new();
        let err = f
            .set_filter(&cols, "name", FilterOperator::Contains, "a".into(), Some("b".into()))
            .unwrap_err();
        assert!(matches!(err, GridError::InvalidFilter { .. }));
        assert!(!f.is_active());
    }

    #[test]
    fn test_set_filter_idempotent_and_clear_by_null() {
        let cols = columns();
        let mut f = FilterEngine::new();
        assert!(f.set_filter(&cols, "name", FilterOperator::Contains, "ap".into(), None).unwrap());
        assert!(!f.set_filter(&cols, "name", FilterOperator::Contains, "ap".into(), None).unwrap());
        assert!(f.set_filter(&cols, "name", FilterOperator::Contains, Value::Null, None).unwrap());
        assert!(f.filter("name").is_none());
        assert!(!f.set_filter(&cols, "name", FilterOperator::Contains, "".into(), None).unwrap());
    }

    #[test]
    fn test_text_operators_case_insensitive() {
        let cols = columns();
        let r = row("Apple Pie", 3.0, "2024-01-01", true);
        let mut f = FilterEngine::new();

        f.set_filter(&cols, "name", FilterOperator::Contains, "PLE p".into(), None).unwrap();
        assert!(f.evaluate(&cols, &r));
        f.set_filter(&cols, "name", FilterOperator::StartsWith, "apple".into(), None).unwrap();
        assert!(f.evaluate(&cols, &r));
        f.set_filter(&cols, "name", FilterOperator::EndsWith, "PIE".into(), None).unwrap();
        assert!(f.evaluate(&cols, &r));
        f.set_filter(&cols, "name", FilterOperator::Equals, " apple pie ".into(), None).unwrap();
        assert!(f.evaluate(&cols, &r));
        f.set_filter(&cols, "name", FilterOperator::NotEquals, "apple pie".into(), None).unwrap();
        assert!(!f.evaluate(&cols, &r));
    }

    #[test]
    fn test_numeric_equals_is_typed() {
        let cols = columns();
        let mut f = FilterEngine::new();
        f.set_filter(&cols, "price", FilterOperator::Equals, "10.0".into(), None).unwrap();
        assert!(f.evaluate(&cols, &row("a", 10.0, "2024-01-01", true)));
        assert!(!f.evaluate(&cols, &row("a", 100.0, "2024-01-01", true)));
        assert!(matches!(
            f.set_filter(&cols, "price", FilterOperator::Equals, "ten".into(), None),
            Err(GridError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_in_range_inclusive_and_one_sided() {
        let cols = columns();
        let mut f = FilterEngine::new();
        f.set_filter(&cols, "price", FilterOperator::InRange, 10.into(), Some(20.into())).unwrap();
        for (price, expected) in [(9.99, false), (10.0, true), (15.0, true), (20.0, true), (20.01, false)] {
            assert_eq!(f.evaluate(&cols, &row("a", price, "2024-01-01", true)), expected, "{price}");
        }

        f.set_filter(&cols, "price", FilterOperator::InRange, Value::Null, Some(5.into())).unwrap();
        assert!(f.evaluate(&cols, &row("a", -1.0, "2024-01-01", true)));
        assert!(!f.evaluate(&cols, &row("a", 6.0, "2024-01-01", true)));

        let text_price = Record::new().with("price", "n/a");
        assert!(!f.evaluate(&cols, &text_price));
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let cols = columns();
        let mut f = FilterEngine::new();
        f.set_filter(&cols, "price", FilterOperator::InRange, 20.into(), Some(10.into())).unwrap();
        assert!(!f.evaluate(&cols, &row("a", 15.0, "2024-01-01", true)));
    }

    #[test]
    fn test_date_range_day_granularity() {
        let cols = columns();
        let mut f = FilterEngine::new();
        f.set_filter(
            &cols,
            "created",
            FilterOperator::DateRange,
            "2024-01-01".into(),
            Some("2024-01-31".into()),
        )
        .unwrap();
        assert!(f.evaluate(&cols, &row("a", 1.0, "2024-01-01T00:00:00", true)));
        assert!(f.evaluate(&cols, &row("a", 1.0, "2024-01-31T23:59:59", true)));
        assert!(!f.evaluate(&cols, &row("a", 1.0, "2024-02-01", true)));
        assert!(!f.evaluate(&cols, &row("a", 1.0, "garbage", true)));
    }

    #[test]
    fn test_boolean_equals() {
        let cols = columns();
        let mut f = FilterEngine::new();
        f.set_filter(&cols, "active", FilterOperator::Equals, "yes".into(), None).unwrap();
        assert!(f.evaluate(&cols, &row("a", 1.0, "2024-01-01", true)));
        assert!(!f.evaluate(&cols, &row("a", 1.0, "2024-01-01", false)));
    }

    #[test]
    fn test_global_search_respects_searchable() {
        let cols = columns();
        let mut f = FilterEngine::new();
        let r = row("Widget", 42.0, "2024-01-01", true);
        assert!(f.set_global_search("  WIDG "));
        assert!(f.evaluate(&cols, &r));
        f.set_global_search("42");
        assert!(f.evaluate(&cols, &r));
        f.set_global_search("token");
        assert!(!f.evaluate(&cols, &r), "non-searchable column ignored");
        assert!(f.set_global_search(""));
        assert!(f.global_search().is_none());
    }

    #[test]
    fn test_clear_all_single_step() {
        let cols = columns();
        let mut f = FilterEngine::new();
        f.set_filter(&cols, "name", FilterOperator::Contains, "a".into(), None).unwrap();
        f.set_global_search("b");
        assert!(f.clear_all());
        assert!(!f.is_active());
        assert!(!f.clear_all());
    }

    #[test]
    fn test_server_query_shape() {
        let cols = columns();
        let mut f = FilterEngine::new();
        f.set_filter(&cols, "price", FilterOperator::InRange, 1.into(), Some(2.into())).unwrap();
        f.set_global_search("abc");
        let json = serde_json::to_value(f.to_server_query()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "global": "abc",
                "filters": { "price": { "operator": "inRange", "value": 1.0, "valueTo": 2.0 } }
            })
        );
    }

    #[test]
    fn test_active_filter_chips() {
        let cols = columns();
        let mut f = FilterEngine::new();
        f.set_filter(&cols, "price", FilterOperator::InRange, 1.into(), Some(2.into())).unwrap();
        f.set_filter(&cols, "name", FilterOperator::Contains, "x".into(), None).unwrap();
        let chips = f.active_filters(&cols);
        assert_eq!(chips[0].field, "name");
        assert_eq!(chips[1].display_value, "1 – 2");

        f.set_filter(&cols, "price", FilterOperator::InRange, Value::Null, Some(2.into())).unwrap();
        assert_eq!(f.active_filters(&cols)[1].display_value, "≤ 2");
    }

    #[test]
    fn test_typed_key_order() {
        assert!(TypedKey::Number(OrderedFloat(1.0)) < TypedKey::Text("a".into()));
        assert!(TypedKey::Text("z".into()) < TypedKey::Blank);
        assert_eq!(TypedKey::from_value(&Value::from("  "), FilterKind::Text), TypedKey::Blank);
        assert_eq!(
            TypedKey::from_value(&Value::from("7"), FilterKind::Numeric),
            TypedKey::Number(OrderedFloat(7.0))
        );
    }
}
