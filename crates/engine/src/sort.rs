//! Sort state and client-side sorting.
//!
//! Invariants:
//! - Every sort field names a sortable column
//! - Single mode holds at most one entry
//! - Sorting is stable: rows with equal keys keep their pre-sort order
//! - Blank values sort last in both directions

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use datagrid_core::Record;

use crate::column::{ColumnModel, FilterKind};
use crate::error::{GridError, Result};
use crate::filter::TypedKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub field: String,
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Single,
    Multiple,
}

/// Current sort order, most significant entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    mode: SortMode,
    entries: Vec<SortEntry>,
}

impl SortState {
    pub fn new(mode: SortMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
        }
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    pub fn is_sorted(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn direction_of(&self, field: &str) -> Option<SortDirection> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.direction)
    }

    /// Position of `field` in the sort order (0 = primary).
    pub fn sort_order(&self, field: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.field == field)
    }

    /// Single mode replaces the order. Multiple mode updates the field in
    /// place or appends it; other entries keep their relative order.
    pub fn set_sort(&mut self, columns: &ColumnModel, field: &str, direction: SortDirection) -> Result<bool> {
        check_sortable(columns, field)?;
        let entry = SortEntry::new(field, direction);

        match self.mode {
            SortMode::Single => {
                if self.entries.len() == 1 && self.entries[0] == entry {
                    return Ok(false);
                }
                self.entries = vec![entry];
                Ok(true)
            }
            SortMode::Multiple => match self.entries.iter_mut().find(|e| e.field == field) {
                Some(existing) if existing.direction == direction => Ok(false),
                Some(existing) => {
                    existing.direction = direction;
                    Ok(true)
                }
                None => {
                    self.entries.push(entry);
                    Ok(true)
                }
            },
        }
    }

    pub fn remove_sort(&mut self, field: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.field != field);
        self.entries.len() != before
    }

    pub fn clear_sort(&mut self) -> bool {
        let changed = !self.entries.is_empty();
        self.entries.clear();
        changed
    }

    /// Header-click behaviour: none → asc → desc → none.
    /// Returns the field's direction after the click.
    pub fn cycle_sort(&mut self, columns: &ColumnModel, field: &str) -> Result<Option<SortDirection>> {
        check_sortable(columns, field)?;
        match self.direction_of(field) {
            None => {
                self.set_sort(columns, field, SortDirection::Asc)?;
                Ok(Some(SortDirection::Asc))
            }
            Some(SortDirection::Asc) => {
                self.set_sort(columns, field, SortDirection::Desc)?;
                Ok(Some(SortDirection::Desc))
            }
            Some(SortDirection::Desc) => {
                self.remove_sort(field);
                Ok(None)
            }
        }
    }

    /// Replace the whole order with entries already checked by the caller.
    pub(crate) fn replace_entries(&mut self, mut entries: Vec<SortEntry>) -> bool {
        if self.mode == SortMode::Single {
            entries.truncate(1);
        }
        if entries == self.entries {
            return false;
        }
        self.entries = entries;
        true
    }

    /// Sort a copy of `rows`.
    pub fn apply_client_sort(&self, columns: &ColumnModel, rows: &[Record]) -> Vec<Record> {
        let mut order: Vec<usize> = (0..rows.len()).collect();
        self.sort_indices(columns, rows, &mut order);
        order.into_iter().map(|i| rows[i].clone()).collect()
    }

    /// Reorder `indices` (into `rows`) by the current sort. Stable with
    /// respect to the incoming order of `indices`.
    pub fn sort_indices(&self, columns: &ColumnModel, rows: &[Record], indices: &mut Vec<usize>) {
        if self.entries.is_empty() || indices.len() < 2 {
            return;
        }

        let plan: Vec<(&str, FilterKind, SortDirection)> = self
            .entries
            .iter()
            .map(|e| {
                let kind = columns
                    .column(&e.field)
                    .map(|c| c.filter_kind)
                    .unwrap_or_default();
                (e.field.as_str(), kind, e.direction)
            })
            .collect();

        // Keys are computed once per row; the view position is the tie-breaker.
        let mut keyed: Vec<(Vec<TypedKey>, usize, usize)> = indices
            .iter()
            .enumerate()
            .map(|(position, &i)| {
                let keys = plan
                    .iter()
                    .map(|(field, kind, _)| TypedKey::from_value(rows[i].get(field), *kind))
                    .collect();
                (keys, position, i)
            })
            .collect();

        keyed.sort_by(|a, b| {
            for (n, (_, _, direction)) in plan.iter().enumerate() {
                let ord = compare_keys(&a.0[n], &b.0[n], *direction);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.1.cmp(&b.1)
        });

        *indices = keyed.into_iter().map(|(_, _, i)| i).collect();
    }
}

fn compare_keys(a: &TypedKey, b: &TypedKey, direction: SortDirection) -> Ordering {
    match (a.is_blank(), b.is_blank()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            SortDirection::Asc => a.cmp(b),
            SortDirection::Desc => b.cmp(a),
        },
    }
}

fn check_sortable(columns: &ColumnModel, field: &str) -> Result<()> {
    let column = columns.require(field)?;
    if !column.sortable {
        return Err(GridError::NotSortable(field.to_string()));
    }
    Ok(())
}
