//! DataGrid - composes columns, filters, sort, pagination, selection,
//! persistence and export into one command surface.
//!
//! Client mode owns the whole dataset and derives a view (filtered, sorted
//! row indices) from it. Server mode owns one page at a time and speaks the
//! fetch protocol: every query change emits `FetchRequested`, and only the
//! response to the latest request is applied.
//!
//! Key invariants:
//! - Row keys are unique within the loaded rows
//! - The selection holds keys, never indices, and is cleared only when the
//!   data source changes (client: `set_rows`; server: a different query)
//! - Every mutating command that changes state emits `StateChanged` and, when
//!   persistence is enabled, saves the new state

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use datagrid_core::value::format_number;
use datagrid_core::{InvalidSelection, Record, RowKey, Selection, SelectionMode, Value};

use crate::bulk::{BulkOperation, BulkOperationView, Outcome};
use crate::column::{Aggregation, ColumnDescriptor, ColumnModel, Pin};
use crate::config::{DataMode, GridConfig, SelectAllScope};
use crate::error::{FetchError, GridError, Result};
use crate::events::{EventCallback, EventCollector, GridEvent};
use crate::export::{default_file_name, with_extension, ExportOptions, ExportPayload, ExportTable, ImportPreview};
use crate::filter::{ActiveFilter, FilterEngine, FilterOperator};
use crate::format::format_value;
use crate::pagination::{LoadState, Pagination};
use crate::persist::{StatePersistence, StateStore};
use crate::refresh::RefreshSchedule;
use crate::request::{FetchResponse, RequestTracker};
use crate::sort::{SortDirection, SortEntry, SortState};
use crate::state::{ColumnState, GridState, PageState};

pub struct DataGrid {
    config: GridConfig,
    columns: ColumnModel,
    filters: FilterEngine,
    sort: SortState,
    pagination: Pagination,
    selection: Selection,

    /// Loaded rows in source order, with their keys alongside
    rows: Vec<Record>,
    keys: Vec<RowKey>,
    index: FxHashMap<RowKey, usize>,
    /// Indices into `rows` in display order (client: filtered and sorted)
    view: Vec<usize>,

    load_state: LoadState,
    requests: RequestTracker,
    /// Server-reported row count for the current query
    server_total: usize,

    bulk_operations: Vec<BulkOperation>,
    persistence: Option<StatePersistence>,
    refresh: RefreshSchedule,
    pending_import: Option<ImportPreview>,

    initialized: bool,
    /// Client: a dataset has arrived, so the row total is known
    rows_loaded: bool,
    events: EventCollector,
    subscribers: Vec<EventCallback>,
}

impl DataGrid {
    pub fn new(config: GridConfig, columns: Vec<ColumnDescriptor>) -> Result<Self> {
        config.validate()?;
        let columns = ColumnModel::new(columns)?;
        let pagination = Pagination::new(config.page_size, config.page_size_options.clone())?;
        Ok(Self {
            filters: FilterEngine::new(),
            sort: SortState::new(config.sort_mode),
            selection: Selection::new(config.selection_mode),
            refresh: RefreshSchedule::new(config.refresh_interval),
            pagination,
            columns,
            rows: Vec::new(),
            keys: Vec::new(),
            index: FxHashMap::default(),
            view: Vec::new(),
            load_state: LoadState::Idle,
            requests: RequestTracker::new(),
            server_total: 0,
            bulk_operations: Vec::new(),
            persistence: None,
            pending_import: None,
            initialized: false,
            rows_loaded: false,
            events: EventCollector::new(),
            subscribers: Vec::new(),
            config,
        })
    }

    /// Attach a durable store. Requires `persistence_key` in the config.
    pub fn with_store(mut self, store: Box<dyn StateStore>) -> Result<Self> {
        let key = self.config.persistence_key.clone().ok_or_else(|| {
            GridError::Configuration("a persistence key is required to attach a state store".into())
        })?;
        self.persistence = Some(StatePersistence::new(key, store));
        Ok(self)
    }

    pub fn with_bulk_operations(mut self, operations: Vec<BulkOperation>) -> Self {
        self.bulk_operations = operations;
        self
    }

    /// Restore saved state and, in server mode, request the first page.
    /// Only the first call does anything.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        let saved = self.persistence.as_ref().and_then(|p| p.load());
        if let Some(state) = saved {
            log::info!(
                "restoring grid state '{}'",
                self.config.persistence_key.as_deref().unwrap_or_default()
            );
            self.restore_state(state);
        }
        self.initialized = true;
        if self.config.mode == DataMode::Server {
            self.issue_fetch();
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn subscribe<F: FnMut(&GridEvent) + 'static>(&mut self, callback: F) {
        self.subscribers.push(Box::new(callback));
    }

    /// Queued events since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> &[GridEvent] {
        self.events.events()
    }

    fn emit(&mut self, event: GridEvent) {
        for callback in self.subscribers.iter_mut() {
            callback(&event);
        }
        self.events.push(event);
    }

    fn state_changed(&mut self) {
        let state = self.current_state();
        if let Some(persistence) = &self.persistence {
            persistence.save(&state);
        }
        self.emit(GridEvent::StateChanged(state));
    }

    fn selection_changed(&mut self) {
        let rows = self.selected_rows();
        self.emit(GridEvent::SelectionChanged(rows));
    }

    fn set_load_state(&mut self, state: LoadState) {
        if self.load_state != state {
            self.load_state = state;
            self.emit(GridEvent::LoadStateChanged(state));
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn mode(&self) -> DataMode {
        self.config.mode
    }

    pub fn columns(&self) -> &ColumnModel {
        &self.columns
    }

    pub fn filters(&self) -> &FilterEngine {
        &self.filters
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    /// Every loaded row in source order.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn row(&self, key: &RowKey) -> Option<&Record> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    pub fn row_key(&self, row: &Record) -> RowKey {
        RowKey::for_record(row, &self.config.data_key)
    }

    /// Rows passing the filter, in sort order, across all pages.
    /// In server mode this is the loaded page.
    pub fn filtered_rows(&self) -> Vec<&Record> {
        self.view.iter().map(|&i| &self.rows[i]).collect()
    }

    /// The rows on screen.
    pub fn displayed_rows(&self) -> Vec<&Record> {
        self.displayed_indices().iter().map(|&i| &self.rows[i]).collect()
    }

    pub fn displayed_keys(&self) -> Vec<RowKey> {
        self.displayed_indices()
            .iter()
            .map(|&i| self.keys[i].clone())
            .collect()
    }

    fn displayed_indices(&self) -> &[usize] {
        match self.config.mode {
            DataMode::Client => {
                let range = self.pagination.range(self.view.len());
                &self.view[range]
            }
            DataMode::Server => &self.view,
        }
    }

    /// All loaded rows (client) or the server-reported total (server).
    pub fn total_count(&self) -> usize {
        match self.config.mode {
            DataMode::Client => self.rows.len(),
            DataMode::Server => self.server_total,
        }
    }

    pub fn filtered_count(&self) -> usize {
        match self.config.mode {
            DataMode::Client => self.view.len(),
            DataMode::Server => self.server_total,
        }
    }

    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        self.filters.active_filters(&self.columns)
    }

    /// Formatted display value of one cell.
    pub fn display_value(&self, row: &Record, field: &str) -> Result<String> {
        let column = self.columns.require(field)?;
        Ok(format_value(column, row.get(field), &self.config.display))
    }

    // -------------------------------------------------------------------------
    // Dataset
    // -------------------------------------------------------------------------

    /// Replace the dataset with a new source. Clears the selection.
    pub fn set_rows(&mut self, rows: Vec<Record>) -> Result<()> {
        self.require_mode(DataMode::Client, "set_rows")?;
        self.load_rows(rows)?;
        if self.selection.clear() {
            self.selection_changed();
        }
        self.set_load_state(LoadState::Loaded);
        Ok(())
    }

    /// Reload the same source. Keeps selected keys that are still present.
    pub fn reload_rows(&mut self, rows: Vec<Record>) -> Result<()> {
        self.require_mode(DataMode::Client, "reload_rows")?;
        self.load_rows(rows)?;
        let index = &self.index;
        if self.selection.retain(|k| index.contains_key(k)) {
            self.selection_changed();
        }
        self.set_load_state(LoadState::Loaded);
        Ok(())
    }

    fn load_rows(&mut self, rows: Vec<Record>) -> Result<()> {
        let (keys, index) = index_rows(&rows, &self.config.data_key)?;
        self.rows = rows;
        self.keys = keys;
        self.index = index;
        self.rows_loaded = true;
        if self.recompute_view() {
            self.state_changed();
        }
        Ok(())
    }

    /// Client: derive the filtered, sorted view. Server: rows as delivered.
    /// Returns true if the page had to move to stay inside the view.
    ///
    /// Before the first dataset the total stays unknown, so a restored page
    /// survives until rows arrive.
    fn recompute_view(&mut self) -> bool {
        match self.config.mode {
            DataMode::Client => {
                let filter = self.filters.compile(&self.columns);
                let mut view: Vec<usize> = if filter.is_pass_through() {
                    (0..self.rows.len()).collect()
                } else {
                    (0..self.rows.len())
                        .filter(|&i| filter.matches(&self.rows[i]))
                        .collect()
                };
                self.sort.sort_indices(&self.columns, &self.rows, &mut view);
                log::debug!("view recomputed: {} of {} rows", view.len(), self.rows.len());
                self.view = view;
                self.rows_loaded && self.pagination.set_total(self.view.len())
            }
            DataMode::Server => {
                self.view = (0..self.rows.len()).collect();
                false
            }
        }
    }

    fn require_mode(&self, mode: DataMode, command: &'static str) -> Result<()> {
        if self.config.mode != mode {
            return Err(GridError::WrongMode(command));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Server fetch protocol
    // -------------------------------------------------------------------------

    fn issue_fetch(&mut self) {
        let request = self.requests.issue(
            self.pagination.page(),
            self.pagination.page_size(),
            self.sort.entries().to_vec(),
            self.filters.to_server_query(),
        );
        self.set_load_state(LoadState::Loading);
        self.emit(GridEvent::FetchRequested(request));
    }

    /// Answer a `FetchRequested`. Returns false when the response was stale
    /// and discarded.
    pub fn complete_fetch(
        &mut self,
        seq: u64,
        result: std::result::Result<FetchResponse, FetchError>,
    ) -> Result<bool> {
        self.require_mode(DataMode::Server, "complete_fetch")?;
        let Some(request) = self.requests.resolve(seq) else {
            log::debug!(
                "discarding stale fetch #{} (latest is #{})",
                seq,
                self.requests.last_seq()
            );
            return Ok(false);
        };

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                self.fail_fetch(seq, error);
                return Ok(true);
            }
        };

        let (keys, index) = match index_rows(&response.rows, &self.config.data_key) {
            Ok(indexed) => indexed,
            Err(e) => {
                self.fail_fetch(seq, FetchError::new(e.to_string()));
                return Err(e);
            }
        };

        self.rows = response.rows;
        self.keys = keys;
        self.index = index;
        self.server_total = response.total_count;
        self.recompute_view();

        if self.requests.mark_applied(request.query_key()) && self.selection.clear() {
            self.selection_changed();
        }
        self.set_load_state(LoadState::Loaded);

        // The result set shrank below the requested page.
        if self.pagination.set_total(response.total_count) {
            self.state_changed();
            self.issue_fetch();
        }
        Ok(true)
    }

    fn fail_fetch(&mut self, seq: u64, error: FetchError) {
        log::debug!("fetch #{} failed: {}", seq, error);
        self.set_load_state(LoadState::Errored);
        self.emit(GridEvent::FetchFailed { seq, error });
    }

    /// Re-run the current query without changing any state.
    pub fn refresh(&mut self) {
        match self.config.mode {
            DataMode::Client => {
                if self.recompute_view() {
                    self.state_changed();
                }
            }
            DataMode::Server => self.issue_fetch(),
        }
        self.emit(GridEvent::RefreshRequested);
    }

    /// Host clock tick. Refreshes when the auto-refresh interval elapsed.
    pub fn poll_refresh(&mut self, now: Instant) -> bool {
        if self.refresh.poll(now) {
            self.refresh();
            true
        } else {
            false
        }
    }

    pub fn set_auto_refresh(&mut self, interval: Option<Duration>) {
        self.refresh.set_interval(interval);
    }

    pub fn auto_refresh_interval(&self) -> Option<Duration> {
        self.refresh.interval()
    }

    /// Filter, sort or page changed: recompute locally or ask the server.
    fn query_changed(&mut self) {
        match self.config.mode {
            DataMode::Client => {
                self.recompute_view();
            }
            DataMode::Server => {
                if self.initialized {
                    self.issue_fetch();
                }
            }
        }
        self.state_changed();
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// Replace the column set. Filters and sort entries on columns that no
    /// longer exist (or can no longer be filtered/sorted) are dropped.
    pub fn set_columns(&mut self, descriptors: Vec<ColumnDescriptor>) -> Result<()> {
        self.columns.set_columns(descriptors)?;
        let columns = &self.columns;
        let filters: std::collections::BTreeMap<_, _> = self
            .filters
            .entries()
            .iter()
            .filter(|(field, _)| columns.column(field).is_some_and(|c| c.filterable))
            .map(|(f, e)| (f.clone(), e.clone()))
            .collect();
        let sort: Vec<SortEntry> = self
            .sort
            .entries()
            .iter()
            .filter(|e| columns.column(&e.field).is_some_and(|c| c.sortable))
            .cloned()
            .collect();
        self.filters.replace_entries(filters);
        self.sort.replace_entries(sort);
        self.query_changed();
        Ok(())
    }

    pub fn set_column_visible(&mut self, field: &str, visible: bool) -> Result<()> {
        if self.columns.set_column_visible(field, visible)? {
            self.state_changed();
        }
        Ok(())
    }

    pub fn show_all_columns(&mut self) {
        if self.columns.show_all() {
            self.state_changed();
        }
    }

    pub fn hide_all_columns(&mut self) {
        if self.columns.hide_all() {
            self.state_changed();
        }
    }

    pub fn reorder_columns<S: AsRef<str>>(&mut self, order: &[S]) -> Result<()> {
        if self.columns.reorder(order)? {
            self.state_changed();
        }
        Ok(())
    }

    pub fn set_column_width(&mut self, field: &str, width: f32) -> Result<()> {
        if self.columns.set_width(field, width)? {
            self.state_changed();
        }
        Ok(())
    }

    pub fn reset_column_width(&mut self, field: &str) -> Result<()> {
        if self.columns.reset_width(field)? {
            self.state_changed();
        }
        Ok(())
    }

    pub fn set_column_pinned(&mut self, field: &str, pin: Option<Pin>) -> Result<()> {
        if self.columns.set_pinned(field, pin)? {
            self.state_changed();
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    /// Set or clear (null value) a column filter. Any change returns to the
    /// first page.
    pub fn set_filter(
        &mut self,
        field: &str,
        operator: FilterOperator,
        value: impl Into<Value>,
        value_to: Option<Value>,
    ) -> Result<()> {
        let changed = self
            .filters
            .set_filter(&self.columns, field, operator, value.into(), value_to)?;
        if changed {
            self.pagination.reset_page();
            self.query_changed();
        }
        Ok(())
    }

    pub fn clear_filter(&mut self, field: &str) -> Result<()> {
        self.columns.require(field)?;
        if self.filters.clear_filter(field) {
            self.pagination.reset_page();
            self.query_changed();
        }
        Ok(())
    }

    pub fn set_global_search(&mut self, term: &str) {
        if self.filters.set_global_search(term) {
            self.pagination.reset_page();
            self.query_changed();
        }
    }

    /// Remove every filter and the search term in one step.
    pub fn clear_filters(&mut self) {
        if self.filters.clear_all() {
            self.pagination.reset_page();
            self.query_changed();
        }
    }

    // -------------------------------------------------------------------------
    // Sorting and paging
    // -------------------------------------------------------------------------

    pub fn set_sort(&mut self, field: &str, direction: SortDirection) -> Result<()> {
        if self.sort.set_sort(&self.columns, field, direction)? {
            self.query_changed();
        }
        Ok(())
    }

    pub fn remove_sort(&mut self, field: &str) {
        if self.sort.remove_sort(field) {
            self.query_changed();
        }
    }

    pub fn clear_sort(&mut self) {
        if self.sort.clear_sort() {
            self.query_changed();
        }
    }

    /// Header click: none → asc → desc → none.
    pub fn cycle_sort(&mut self, field: &str) -> Result<Option<SortDirection>> {
        let direction = self.sort.cycle_sort(&self.columns, field)?;
        self.query_changed();
        Ok(direction)
    }

    pub fn set_page(&mut self, page: usize) {
        if self.pagination.set_page(page) {
            self.page_changed();
        }
    }

    pub fn next_page(&mut self) {
        if self.pagination.next_page() {
            self.page_changed();
        }
    }

    pub fn prev_page(&mut self) {
        if self.pagination.prev_page() {
            self.page_changed();
        }
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        if self.pagination.set_page_size(size)? {
            self.page_changed();
        }
        Ok(())
    }

    fn page_changed(&mut self) {
        if self.config.mode == DataMode::Server && self.initialized {
            self.issue_fetch();
        }
        self.state_changed();
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        if self.selection.set_mode(mode) {
            self.selection_changed();
        }
    }

    /// Select loaded rows by key. Keys that are not loaded are ignored, but
    /// single mode still rejects more than one requested key.
    pub fn select(&mut self, keys: &[RowKey]) -> Result<()> {
        if self.selection.mode() == SelectionMode::Single && keys.len() > 1 {
            return Err(InvalidSelection { requested: keys.len() }.into());
        }
        let known = self.known_keys(keys);
        if self.selection.select(&known)? {
            self.selection_changed();
        }
        Ok(())
    }

    pub fn deselect(&mut self, keys: &[RowKey]) {
        if self.selection.deselect(keys) {
            self.selection_changed();
        }
    }

    pub fn toggle(&mut self, key: &RowKey) -> Result<()> {
        if !self.selection.contains(key) && !self.index.contains_key(key) {
            log::debug!("ignoring selection of unknown row '{}'", key);
            return Ok(());
        }
        if self.selection.toggle(key)? {
            self.selection_changed();
        }
        Ok(())
    }

    /// Select every row in the configured "select all" scope.
    pub fn select_all(&mut self) -> Result<()> {
        let keys: Vec<RowKey> = match self.config.select_all {
            SelectAllScope::Filtered => self.view.iter().map(|&i| self.keys[i].clone()).collect(),
            SelectAllScope::CurrentPage => self.displayed_keys(),
            SelectAllScope::Loaded => self.keys.clone(),
        };
        if self.selection.select_all(&keys)? {
            self.selection_changed();
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.selection_changed();
        }
    }

    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selection.contains(key)
    }

    pub fn selected_keys(&self) -> &[RowKey] {
        self.selection.keys()
    }

    /// Selected rows that are loaded, in selection order.
    pub fn selected_rows(&self) -> Vec<Record> {
        self.selection
            .keys()
            .iter()
            .filter_map(|k| self.row(k).cloned())
            .collect()
    }

    /// Selected keys among the rows passing the current filter.
    pub fn visible_selection(&self) -> Vec<RowKey> {
        self.selection
            .visible_selection(self.view.iter().map(|&i| &self.keys[i]))
    }

    fn known_keys(&self, keys: &[RowKey]) -> Vec<RowKey> {
        keys.iter()
            .filter(|k| {
                let known = self.index.contains_key(*k);
                if !known {
                    log::debug!("ignoring selection of unknown row '{}'", k);
                }
                known
            })
            .cloned()
            .collect()
    }

    // -------------------------------------------------------------------------
    // Bulk operations and row actions
    // -------------------------------------------------------------------------

    pub fn add_bulk_operation(&mut self, operation: BulkOperation) {
        self.bulk_operations.push(operation);
    }

    /// Operations as they should render for the current selection.
    pub fn bulk_operations(&self) -> Vec<BulkOperationView> {
        let selected = self.selected_rows();
        self.bulk_operations.iter().map(|op| op.view(&selected)).collect()
    }

    pub fn execute_bulk_operation(&mut self, label: &str, confirmed: bool) -> Result<Outcome> {
        let operation = self
            .bulk_operations
            .iter()
            .find(|op| op.label == label)
            .ok_or_else(|| GridError::UnknownOperation(label.to_string()))?;
        let selected = self.selected_rows();
        if !operation.is_visible(&selected) || !operation.is_enabled(&selected) {
            return Err(GridError::OperationDisabled(label.to_string()));
        }
        if let (Some(message), false) = (&operation.confirm_message, confirmed) {
            return Ok(Outcome::NeedsConfirmation(message.clone()));
        }
        operation.run(&selected);
        self.emit(GridEvent::BulkOperationExecuted {
            operation: label.to_string(),
            rows: selected,
        });
        Ok(Outcome::Executed)
    }

    /// Actions column buttons for one row.
    pub fn row_actions(&self, key: &RowKey) -> Result<Vec<BulkOperationView>> {
        let row = self.require_row(key)?;
        let Some(column) = self.columns.actions_column() else {
            return Ok(Vec::new());
        };
        Ok(column
            .actions
            .iter()
            .map(|action| BulkOperationView {
                label: action.label.clone(),
                visible: action.is_visible(row),
                enabled: action.is_enabled(row),
                confirm_message: action.confirm_message.clone(),
            })
            .collect())
    }

    pub fn execute_row_action(&mut self, key: &RowKey, label: &str, confirmed: bool) -> Result<Outcome> {
        let row = self.require_row(key)?.clone();
        let action = self
            .columns
            .actions_column()
            .and_then(|c| c.actions.iter().find(|a| a.label == label))
            .ok_or_else(|| GridError::UnknownOperation(label.to_string()))?;
        if !action.is_visible(&row) || !action.is_enabled(&row) {
            return Err(GridError::OperationDisabled(label.to_string()));
        }
        if let (Some(message), false) = (&action.confirm_message, confirmed) {
            return Ok(Outcome::NeedsConfirmation(message.clone()));
        }
        action.run(&row);
        self.emit(GridEvent::RowActionExecuted {
            action: label.to_string(),
            row,
        });
        Ok(Outcome::Executed)
    }

    fn require_row(&self, key: &RowKey) -> Result<&Record> {
        self.row(key)
            .ok_or_else(|| GridError::UnknownRow(key.to_string()))
    }

    // -------------------------------------------------------------------------
    // Export / import
    // -------------------------------------------------------------------------

    /// Build the export table for the current view and emit
    /// `ExportRequested`. Encoding is the host's job (see the io crate).
    pub fn export(&mut self, options: &ExportOptions) -> Result<ExportPayload> {
        if !options.format.is_supported() || !self.config.export_formats.contains(&options.format) {
            return Err(GridError::UnsupportedFormat(options.format.to_string()));
        }

        let columns = self.columns.exportable_columns(options.visible_columns_only);
        let rows: Vec<&Record> = self
            .view
            .iter()
            .filter(|&&i| !options.only_selected || self.selection.contains(&self.keys[i]))
            .map(|&i| &self.rows[i])
            .collect();
        let table = ExportTable::build(&columns, rows, &self.config.display);

        let file_name = match options.file_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => with_extension(name, options.format),
            _ => default_file_name(
                self.config.title.as_deref(),
                chrono::Local::now().date_naive(),
                options.format,
            ),
        };

        let payload = ExportPayload {
            format: options.format,
            file_name,
            table,
        };
        self.emit(GridEvent::ExportRequested(payload.clone()));
        Ok(payload)
    }

    /// Hold a parsed file until the user confirms it. Replaces any pending
    /// preview.
    pub fn stage_import(&mut self, preview: ImportPreview) {
        self.pending_import = Some(preview);
    }

    pub fn pending_import(&self) -> Option<&ImportPreview> {
        self.pending_import.as_ref()
    }

    /// Emit `ImportParsed` for the staged preview. The dataset is untouched.
    pub fn confirm_import(&mut self) -> Option<ImportPreview> {
        let preview = self.pending_import.take()?;
        self.emit(GridEvent::ImportParsed(preview.clone()));
        Some(preview)
    }

    pub fn cancel_import(&mut self) -> bool {
        self.pending_import.take().is_some()
    }

    pub fn report_import_error(&mut self, message: impl Into<String>) {
        self.pending_import = None;
        self.emit(GridEvent::ImportFailed(message.into()));
    }

    // -------------------------------------------------------------------------
    // Aggregation
    // -------------------------------------------------------------------------

    /// The column's aggregate over rows passing the filter. `None` when the
    /// column has no aggregation or there is nothing to aggregate.
    pub fn aggregate(&self, field: &str) -> Result<Option<f64>> {
        let column = self.columns.require(field)?;
        let Some(aggregation) = column.aggregation else {
            return Ok(None);
        };
        let values = self.view.iter().map(|&i| self.rows[i].get(field));

        Ok(match aggregation {
            Aggregation::Count => Some(values.filter(|v| !v.is_blank()).count() as f64),
            Aggregation::Sum => Some(values.filter_map(Value::as_number).sum::<f64>()),
            Aggregation::Avg => {
                let (sum, n) = values
                    .filter_map(Value::as_number)
                    .fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
                (n > 0).then(|| sum / n as f64)
            }
            Aggregation::Min => values.filter_map(Value::as_number).reduce(f64::min),
            Aggregation::Max => values.filter_map(Value::as_number).reduce(f64::max),
        })
    }

    pub fn format_aggregate(&self, field: &str) -> Result<Option<String>> {
        let column = self.columns.require(field)?;
        let Some(value) = self.aggregate(field)? else {
            return Ok(None);
        };
        Ok(Some(match column.aggregation {
            Some(Aggregation::Count) => format_number(value),
            _ => format_value(column, &Value::Number(value), &self.config.display),
        }))
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    pub fn current_state(&self) -> GridState {
        GridState {
            columns: self
                .columns
                .columns()
                .iter()
                .map(|c| ColumnState {
                    field: c.field.clone(),
                    visible: c.visible,
                    width: c.width,
                    pinned: c.pinned,
                    sort_order: self.sort.sort_order(&c.field),
                })
                .collect(),
            filters: self.filters.entries().clone(),
            global_search: self.filters.global_search().map(str::to_string),
            sort: self.sort.entries().to_vec(),
            pagination: PageState {
                page: self.pagination.page(),
                page_size: self.pagination.page_size(),
            },
        }
    }

    /// Apply a saved or host-built state. Entries naming unknown columns are
    /// skipped with a warning. Never clears the selection.
    pub fn apply_state(&mut self, state: GridState) {
        self.restore_state(state);
        self.state_changed();
    }

    fn restore_state(&mut self, state: GridState) {
        // Layout
        let mut order: Vec<String> = Vec::with_capacity(self.columns.len());
        for column_state in &state.columns {
            if self.columns.column(&column_state.field).is_none() {
                log::warn!("saved state names unknown column '{}'", column_state.field);
                continue;
            }
            if order.contains(&column_state.field) {
                continue;
            }
            order.push(column_state.field.clone());
            let field = column_state.field.as_str();
            let applied = self
                .columns
                .set_column_visible(field, column_state.visible)
                .and_then(|_| match column_state.width {
                    Some(width) => self.columns.set_width(field, width),
                    None => self.columns.reset_width(field),
                })
                .and_then(|_| self.columns.set_pinned(field, column_state.pinned));
            if let Err(e) = applied {
                log::warn!("skipping saved layout of column '{}': {}", field, e);
            }
        }
        for field in self.columns.fields() {
            if !order.iter().any(|f| f == field) {
                order.push(field.to_string());
            }
        }
        if let Err(e) = self.columns.reorder(order.as_slice()) {
            log::warn!("could not restore column order: {}", e);
        }

        // Filters
        let mut filters = FilterEngine::new();
        for (field, entry) in state.filters {
            if let Err(e) = filters.set_filter(
                &self.columns,
                &field,
                entry.operator,
                entry.value,
                entry.value_to,
            ) {
                log::warn!("skipping saved filter on '{}': {}", field, e);
            }
        }
        filters.set_global_search(state.global_search.as_deref().unwrap_or_default());
        self.filters = filters;

        // Sort
        let mut sort = SortState::new(self.config.sort_mode);
        for entry in state.sort {
            if let Err(e) = sort.set_sort(&self.columns, &entry.field, entry.direction) {
                log::warn!("skipping saved sort on '{}': {}", entry.field, e);
            }
        }
        self.sort = sort;

        // Page
        if state.pagination.page_size > 0 {
            if let Err(e) = self.pagination.set_page_size(state.pagination.page_size) {
                log::warn!("skipping saved page size: {}", e);
            }
        }
        if self.config.mode == DataMode::Client {
            self.recompute_view();
        }
        self.pagination.set_page(state.pagination.page);
        if self.config.mode == DataMode::Server && self.initialized {
            self.issue_fetch();
        }
    }

    /// Forget the persisted state (the in-memory state is unchanged).
    pub fn clear_saved_state(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.clear();
        }
    }
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("mode", &self.config.mode)
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .field("view", &self.view.len())
            .field("selected", &self.selection.len())
            .field("load_state", &self.load_state)
            .finish_non_exhaustive()
    }
}

/// Keys for `rows`, failing on the first duplicate.
fn index_rows(rows: &[Record], data_key: &str) -> Result<(Vec<RowKey>, FxHashMap<RowKey, usize>)> {
    let mut keys = Vec::with_capacity(rows.len());
    let mut index = FxHashMap::default();
    index.reserve(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let key = RowKey::for_record(row, data_key);
        if index.insert(key.clone(), i).is_some() {
            return Err(GridError::DuplicateRowKey(key.to_string()));
        }
        keys.push(key);
    }
    Ok((keys, index))
}
