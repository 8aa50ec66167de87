//! Selection tracker.
//!
//! Selection is keyed on row identity, never on row index. Keys are kept in
//! selection order; membership checks go through a hash set.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::record::RowKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Single,
    #[default]
    Multiple,
}

/// More than one key was requested in single selection mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot select {requested} rows in single selection mode")]
pub struct InvalidSelection {
    pub requested: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    mode: SelectionMode,
    order: Vec<RowKey>,
    members: FxHashSet<RowKey>,
}

impl Selection {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switch modes. Going to single mode keeps only the earliest selected key.
    /// Returns true if the selected set changed.
    pub fn set_mode(&mut self, mode: SelectionMode) -> bool {
        self.mode = mode;
        if mode == SelectionMode::Single && self.order.len() > 1 {
            let first = self.order[0].clone();
            self.order.truncate(1);
            self.members.clear();
            self.members.insert(first);
            return true;
        }
        false
    }

    /// Add keys to the selection.
    ///
    /// In single mode one key replaces the current selection and more than one
    /// key is rejected without touching state. Returns true if anything changed.
    pub fn select(&mut self, keys: &[RowKey]) -> Result<bool, InvalidSelection> {
        if self.mode == SelectionMode::Single {
            if keys.len() > 1 {
                return Err(InvalidSelection { requested: keys.len() });
            }
            let Some(key) = keys.first() else {
                return Ok(false);
            };
            if self.order.len() == 1 && self.order[0] == *key {
                return Ok(false);
            }
            self.order.clear();
            self.members.clear();
            self.insert(key.clone());
            return Ok(true);
        }

        let mut changed = false;
        for key in keys {
            changed |= self.insert(key.clone());
        }
        Ok(changed)
    }

    /// Remove keys. Unknown keys are ignored.
    pub fn deselect(&mut self, keys: &[RowKey]) -> bool {
        let before = self.order.len();
        for key in keys {
            self.members.remove(key);
        }
        self.order.retain(|k| self.members.contains(k));
        self.order.len() != before
    }

    /// Deselect if present, else select.
    pub fn toggle(&mut self, key: &RowKey) -> Result<bool, InvalidSelection> {
        if self.contains(key) {
            Ok(self.deselect(std::slice::from_ref(key)))
        } else {
            self.select(std::slice::from_ref(key))
        }
    }

    /// Select every key in `keys` (typically the currently visible rows).
    pub fn select_all(&mut self, keys: &[RowKey]) -> Result<bool, InvalidSelection> {
        self.select(keys)
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.order.is_empty();
        self.order.clear();
        self.members.clear();
        changed
    }

    /// Keep only keys for which `keep` returns true.
    pub fn retain<F: FnMut(&RowKey) -> bool>(&mut self, mut keep: F) -> bool {
        let before = self.order.len();
        self.order.retain(|k| keep(k));
        self.members = self.order.iter().cloned().collect();
        self.order.len() != before
    }

    pub fn contains(&self, key: &RowKey) -> bool {
        self.members.contains(key)
    }

    /// Selected keys in selection order.
    pub fn keys(&self) -> &[RowKey] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Selected keys that are also in `visible`, in selection order.
    /// Hidden keys stay selected; they are only left out of this view.
    pub fn visible_selection<'a, I>(&self, visible: I) -> Vec<RowKey>
    where
        I: IntoIterator<Item = &'a RowKey>,
    {
        let visible: FxHashSet<&RowKey> = visible.into_iter().collect();
        self.order
            .iter()
            .filter(|k| visible.contains(k))
            .cloned()
            .collect()
    }

    fn insert(&mut self, key: RowKey) -> bool {
        if self.members.insert(key.clone()) {
            self.order.push(key);
            true
        } else {
            false
        }
    }
}
