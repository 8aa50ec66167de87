//! Bulk operations over the current selection.

use std::fmt;
use std::sync::Arc;

use datagrid_core::Record;

pub type SelectionPredicate = Arc<dyn Fn(&[Record]) -> bool>;
pub type SelectionHandler = Arc<dyn Fn(&[Record])>;

/// Stateless descriptor. Visibility and enablement are evaluated against the
/// selection every time they are asked for.
#[derive(Clone)]
pub struct BulkOperation {
    pub label: String,
    pub confirm_message: Option<String>,
    pub enabled_when: Option<SelectionPredicate>,
    pub visible_when: Option<SelectionPredicate>,
    action: SelectionHandler,
}

impl BulkOperation {
    pub fn new<F>(label: impl Into<String>, action: F) -> Self
    where
        F: Fn(&[Record]) + 'static,
    {
        Self {
            label: label.into(),
            confirm_message: None,
            enabled_when: None,
            visible_when: None,
            action: Arc::new(action),
        }
    }

    pub fn with_confirm(mut self, message: impl Into<String>) -> Self {
        self.confirm_message = Some(message.into());
        self
    }

    pub fn enabled_when<F: Fn(&[Record]) -> bool + 'static>(mut self, predicate: F) -> Self {
        self.enabled_when = Some(Arc::new(predicate));
        self
    }

    pub fn visible_when<F: Fn(&[Record]) -> bool + 'static>(mut self, predicate: F) -> Self {
        self.visible_when = Some(Arc::new(predicate));
        self
    }

    pub fn is_visible(&self, selected: &[Record]) -> bool {
        self.visible_when.as_ref().map_or(true, |p| p(selected))
    }

    /// Never enabled on an empty selection.
    pub fn is_enabled(&self, selected: &[Record]) -> bool {
        !selected.is_empty() && self.enabled_when.as_ref().map_or(true, |p| p(selected))
    }

    pub(crate) fn run(&self, selected: &[Record]) {
        (self.action)(selected)
    }

    pub fn view(&self, selected: &[Record]) -> BulkOperationView {
        BulkOperationView {
            label: self.label.clone(),
            visible: self.is_visible(selected),
            enabled: self.is_enabled(selected),
            confirm_message: self.confirm_message.clone(),
        }
    }
}

impl fmt::Debug for BulkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkOperation")
            .field("label", &self.label)
            .field("confirm_message", &self.confirm_message)
            .finish_non_exhaustive()
    }
}

/// Evaluated state of an operation (bulk or row action) for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOperationView {
    pub label: String,
    pub visible: bool,
    pub enabled: bool,
    pub confirm_message: Option<String>,
}

/// Result of asking to run an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Executed,
    /// Call again with `confirmed = true` once the user agrees.
    NeedsConfirmation(String),
}
