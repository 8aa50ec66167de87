//! Column model.
//!
//! Column descriptors are plain data plus a few host closures (row actions,
//! an optional display formatter). The model owns display order, visibility,
//! widths and pinning; everything else is read-only after setup.

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use datagrid_core::{Record, Value};

use crate::error::{GridError, Result};

/// Semantic type of a column. Drives filtering, sorting and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Date,
    Datetime,
    Boolean,
    Currency,
    Percentage,
    Status,
    Actions,
}

impl ColumnType {
    pub fn default_filter_kind(self) -> FilterKind {
        match self {
            ColumnType::Number | ColumnType::Currency | ColumnType::Percentage => FilterKind::Numeric,
            ColumnType::Date | ColumnType::Datetime => FilterKind::Date,
            ColumnType::Boolean => FilterKind::Boolean,
            ColumnType::Text | ColumnType::Status | ColumnType::Actions => FilterKind::Text,
        }
    }
}

/// How values of a column are compared by filters and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    Text,
    Numeric,
    Date,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pin {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

pub type RowPredicate = Arc<dyn Fn(&Record) -> bool>;
pub type RowHandler = Arc<dyn Fn(&Record)>;
/// Host-supplied cell formatter. Opaque to the engine.
pub type Formatter = Arc<dyn Fn(&Value) -> String>;

/// Per-row action shown in the actions column.
#[derive(Clone)]
pub struct RowAction {
    pub label: String,
    pub tooltip: Option<String>,
    pub confirm_message: Option<String>,
    pub enabled_when: Option<RowPredicate>,
    pub visible_when: Option<RowPredicate>,
    on_click: RowHandler,
}

impl RowAction {
    pub fn new<F>(label: impl Into<String>, on_click: F) -> Self
    where
        F: Fn(&Record) + 'static,
    {
        Self {
            label: label.into(),
            tooltip: None,
            confirm_message: None,
            enabled_when: None,
            visible_when: None,
            on_click: Arc::new(on_click),
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_confirm(mut self, message: impl Into<String>) -> Self {
        self.confirm_message = Some(message.into());
        self
    }

    pub fn enabled_when<F: Fn(&Record) -> bool + 'static>(mut self, predicate: F) -> Self {
        self.enabled_when = Some(Arc::new(predicate));
        self
    }

    pub fn visible_when<F: Fn(&Record) -> bool + 'static>(mut self, predicate: F) -> Self {
        self.visible_when = Some(Arc::new(predicate));
        self
    }

    pub fn is_visible(&self, row: &Record) -> bool {
        self.visible_when.as_ref().map_or(true, |p| p(row))
    }

    pub fn is_enabled(&self, row: &Record) -> bool {
        self.enabled_when.as_ref().map_or(true, |p| p(row))
    }

    pub(crate) fn run(&self, row: &Record) {
        (self.on_click)(row)
    }
}

impl fmt::Debug for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowAction")
            .field("label", &self.label)
            .field("confirm_message", &self.confirm_message)
            .finish_non_exhaustive()
    }
}

/// Describes one field of the grid.
#[derive(Clone)]
pub struct ColumnDescriptor {
    pub field: String,
    pub label: String,
    pub column_type: ColumnType,
    pub sortable: bool,
    pub filterable: bool,
    pub filter_kind: FilterKind,
    pub width: Option<f32>,
    pub pinned: Option<Pin>,
    pub visible: bool,
    pub exportable: bool,
    pub searchable: bool,
    pub aggregation: Option<Aggregation>,
    pub actions: Vec<RowAction>,
    pub formatter: Option<Formatter>,
}

impl ColumnDescriptor {
    pub fn new(field: impl Into<String>, label: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            column_type,
            sortable: true,
            filterable: true,
            filter_kind: column_type.default_filter_kind(),
            width: None,
            pinned: None,
            visible: true,
            exportable: true,
            searchable: true,
            aggregation: None,
            actions: Vec::new(),
            formatter: None,
        }
    }

    pub fn text(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, ColumnType::Text)
    }

    pub fn number(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, ColumnType::Number)
    }

    pub fn date(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, ColumnType::Date)
    }

    pub fn boolean(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, ColumnType::Boolean)
    }

    /// The actions column. Never sorted, filtered, searched or exported.
    pub fn actions(field: impl Into<String>, label: impl Into<String>, actions: Vec<RowAction>) -> Self {
        let mut column = Self::new(field, label, ColumnType::Actions);
        column.actions = actions;
        column
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn with_filter_kind(mut self, kind: FilterKind) -> Self {
        self.filter_kind = kind;
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn pinned(mut self, pin: Pin) -> Self {
        self.pinned = Some(pin);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn exportable(mut self, exportable: bool) -> Self {
        self.exportable = exportable;
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_formatter<F: Fn(&Value) -> String + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn is_actions(&self) -> bool {
        self.column_type == ColumnType::Actions
    }

    /// Exportable and carrying data (the actions column never is).
    pub fn is_export_eligible(&self) -> bool {
        self.exportable && !self.is_actions()
    }

    /// Actions column invariants: fixed right, sized to its buttons.
    fn normalize(&mut self) {
        if self.is_actions() {
            self.sortable = false;
            self.filterable = false;
            self.searchable = false;
            self.exportable = false;
            self.pinned = Some(Pin::Right);
            if self.width.is_none() {
                self.width = Some(self.actions.len().max(1) as f32 * 40.0 + 20.0);
            }
        }
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("field", &self.field)
            .field("label", &self.label)
            .field("column_type", &self.column_type)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("visible", &self.visible)
            .field("width", &self.width)
            .field("pinned", &self.pinned)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

/// Ordered set of columns for one grid instance.
#[derive(Debug, Clone, Default)]
pub struct ColumnModel {
    columns: Vec<ColumnDescriptor>,
    /// Width as declared at setup, for reset_width()
    declared_widths: FxHashMap<String, Option<f32>>,
}

impl ColumnModel {
    pub fn new(descriptors: Vec<ColumnDescriptor>) -> Result<Self> {
        let mut model = Self::default();
        model.set_columns(descriptors)?;
        Ok(model)
    }

    /// Replace the column set. Fails without changing anything if a field is
    /// empty or repeated, or if more than one actions column is given.
    pub fn set_columns(&mut self, mut descriptors: Vec<ColumnDescriptor>) -> Result<()> {
        let mut seen = FxHashSet::default();
        let mut actions_columns = 0;
        for column in &descriptors {
            if column.field.trim().is_empty() {
                return Err(GridError::Configuration("column field must not be empty".into()));
            }
            if !seen.insert(column.field.as_str()) {
                return Err(GridError::Configuration(format!(
                    "duplicate column field '{}'",
                    column.field
                )));
            }
            if column.is_actions() {
                actions_columns += 1;
            }
        }
        if actions_columns > 1 {
            return Err(GridError::Configuration(format!(
                "only one actions column is allowed, found {actions_columns}"
            )));
        }

        for column in descriptors.iter_mut() {
            column.normalize();
        }
        self.declared_widths = descriptors
            .iter()
            .map(|c| (c.field.clone(), c.width))
            .collect();
        self.columns = descriptors;
        Ok(())
    }

    /// All columns in display order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn require(&self, field: &str) -> Result<&ColumnDescriptor> {
        self.column(field)
            .ok_or_else(|| GridError::UnknownColumn(field.to_string()))
    }

    pub fn fields(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.field.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns.iter().filter(|c| c.visible).collect()
    }

    pub fn actions_column(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.is_actions())
    }

    pub fn searchable_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.searchable && !c.is_actions())
    }

    /// Columns that go into an export, in display order.
    pub fn exportable_columns(&self, visible_only: bool) -> Vec<&ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|c| c.is_export_eligible() && (!visible_only || c.visible))
            .collect()
    }

    /// Idempotent. Returns true if visibility changed.
    pub fn set_column_visible(&mut self, field: &str, visible: bool) -> Result<bool> {
        let column = self.column_mut(field)?;
        let changed = column.visible != visible;
        column.visible = visible;
        Ok(changed)
    }

    pub fn show_all(&mut self) -> bool {
        self.set_all_visible(true)
    }

    /// Hides every data column. The actions column is left as it is.
    pub fn hide_all(&mut self) -> bool {
        self.set_all_visible(false)
    }

    /// Reorder columns. `order` must name exactly the current fields.
    pub fn reorder<S: AsRef<str>>(&mut self, order: &[S]) -> Result<bool> {
        let requested: Vec<&str> = order.iter().map(|s| s.as_ref()).collect();
        let unique: FxHashSet<&str> = requested.iter().copied().collect();
        let current: FxHashSet<&str> = self.columns.iter().map(|c| c.field.as_str()).collect();

        if unique.len() != requested.len() {
            return Err(GridError::Configuration("column order repeats a field".into()));
        }
        if unique != current {
            let missing: Vec<&str> = current.difference(&unique).copied().collect();
            let unknown: Vec<&str> = unique.difference(&current).copied().collect();
            return Err(GridError::Configuration(format!(
                "column order must match the column set (missing: {missing:?}, unknown: {unknown:?})"
            )));
        }

        if requested == self.fields() {
            return Ok(false);
        }

        let position: FxHashMap<String, usize> = requested
            .iter()
            .enumerate()
            .map(|(i, f)| (f.to_string(), i))
            .collect();
        self.columns
            .sort_by_key(|c| position.get(&c.field).copied().unwrap_or(usize::MAX));
        Ok(true)
    }

    pub fn set_width(&mut self, field: &str, width: f32) -> Result<bool> {
        if !width.is_finite() || width <= 0.0 {
            return Err(GridError::Configuration(format!(
                "column width must be positive, got {width}"
            )));
        }
        let column = self.column_mut(field)?;
        let changed = column.width != Some(width);
        column.width = Some(width);
        Ok(changed)
    }

    /// Restore the width declared at setup.
    pub fn reset_width(&mut self, field: &str) -> Result<bool> {
        let declared = self.declared_widths.get(field).copied().flatten();
        let column = self.column_mut(field)?;
        let changed = column.width != declared;
        column.width = declared;
        Ok(changed)
    }

    pub fn set_pinned(&mut self, field: &str, pin: Option<Pin>) -> Result<bool> {
        let column = self.column_mut(field)?;
        if column.is_actions() {
            return Ok(false);
        }
        let changed = column.pinned != pin;
        column.pinned = pin;
        Ok(changed)
    }

    fn set_all_visible(&mut self, visible: bool) -> bool {
        let mut changed = false;
        for column in self.columns.iter_mut().filter(|c| !c.is_actions()) {
            changed |= column.visible != visible;
            column.visible = visible;
        }
        changed
    }

    fn column_mut(&mut self, field: &str) -> Result<&mut ColumnDescriptor> {
        self.columns
            .iter_mut()
            .find(|c| c.field == field)
            .ok_or_else(|| GridError::UnknownColumn(field.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::text("name", "Name"),
            ColumnDescriptor::number("age", "Age").with_width(80.0),
            ColumnDescriptor::text("email", "Email").hidden(),
        ]
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut columns = sample();
        columns.push(ColumnDescriptor::text("name", "Again"));
        let err = ColumnModel::new(columns).unwrap_err();
        assert!(matches!(err, GridError::Configuration(_)));
    }

    #[test]
    fn test_two_actions_columns_rejected() {
        let mut columns = sample();
        columns.push(ColumnDescriptor::actions("a1", "", vec![]));
        columns.push(ColumnDescriptor::actions("a2", "", vec![]));
        assert!(matches!(ColumnModel::new(columns), Err(GridError::Configuration(_))));
    }

    #[test]
    fn test_actions_column_normalized() {
        let mut columns = sample();
        columns.push(ColumnDescriptor::actions(
            "actions",
            "",
            vec![RowAction::new("Edit", |_| {}), RowAction::new("Delete", |_| {})],
        ));
        let model = ColumnModel::new(columns).unwrap();
        let actions = model.actions_column().unwrap();
        assert!(!actions.sortable);
        assert!(!actions.filterable);
        assert_eq!(actions.pinned, Some(Pin::Right));
        assert_eq!(actions.width, Some(100.0));
        assert!(model.exportable_columns(false).iter().all(|c| !c.is_actions()));
    }

    #[test]
    fn test_visible_columns_in_display_order() {
        let model = ColumnModel::new(sample()).unwrap();
        let fields: Vec<&str> = model.visible_columns().iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "age"]);
    }

    #[test]
    fn test_set_visible_idempotent() {
        let mut model = ColumnModel::new(sample()).unwrap();
        assert!(model.set_column_visible("email", true).unwrap());
        assert!(!model.set_column_visible("email", true).unwrap());
        assert!(matches!(
            model.set_column_visible("nope", true),
            Err(GridError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_reorder() {
        let mut model = ColumnModel::new(sample()).unwrap();
        assert!(model.reorder(&["email", "name", "age"]).unwrap());
        assert_eq!(model.fields(), vec!["email", "name", "age"]);
        assert!(!model.reorder(&["email", "name", "age"]).unwrap());
    }

    #[test]
    fn test_reorder_must_match_exactly() {
        let mut model = ColumnModel::new(sample()).unwrap();
        assert!(matches!(model.reorder(&["name", "age"]), Err(GridError::Configuration(_))));
        assert!(matches!(
            model.reorder(&["name", "age", "email", "extra"]),
            Err(GridError::Configuration(_))
        ));
        assert!(matches!(
            model.reorder(&["name", "name", "age"]),
            Err(GridError::Configuration(_))
        ));
        assert_eq!(model.fields(), vec!["name", "age", "email"], "order unchanged on error");
    }

    #[test]
    fn test_width_and_reset() {
        let mut model = ColumnModel::new(sample()).unwrap();
        model.set_width("age", 120.0).unwrap();
        assert_eq!(model.column("age").unwrap().width, Some(120.0));
        assert!(model.reset_width("age").unwrap());
        assert_eq!(model.column("age").unwrap().width, Some(80.0));
        assert!(model.set_width("age", 0.0).is_err());
    }

    #[test]
    fn test_show_hide_all() {
        let mut model = ColumnModel::new(sample()).unwrap();
        assert!(model.hide_all());
        assert!(model.visible_columns().is_empty());
        assert!(model.show_all());
        assert_eq!(model.visible_columns().len(), 3);
    }

    #[test]
    fn test_filter_kind_defaults() {
        assert_eq!(ColumnDescriptor::number("n", "N").filter_kind, FilterKind::Numeric);
        assert_eq!(
            ColumnDescriptor::new("c", "C", ColumnType::Currency).filter_kind,
            FilterKind::Numeric
        );
        assert_eq!(ColumnDescriptor::date("d", "D").filter_kind, FilterKind::Date);
        assert_eq!(ColumnDescriptor::boolean("b", "B").filter_kind, FilterKind::Boolean);

        // A status column stored as numbers can opt into numeric filtering
        let status = ColumnDescriptor::new("s", "S", ColumnType::Status).with_filter_kind(FilterKind::Numeric);
        assert_eq!(status.filter_kind, FilterKind::Numeric);
        assert_eq!(
            crate::filter::FilterOperator::default_for(status.filter_kind),
            crate::filter::FilterOperator::Equals
        );
    }

    #[test]
    fn test_row_action_builders() {
        let action = RowAction::new("Edit", |_| {})
            .with_tooltip("Edit user")
            .enabled_when(|r| r.get("active").as_bool() == Some(true));
        assert_eq!(action.tooltip.as_deref(), Some("Edit user"));
        assert!(action.is_visible(&Record::new()));
        assert!(!action.is_enabled(&Record::new()));
        assert!(action.is_enabled(&Record::new().with("active", true)));
    }
}
