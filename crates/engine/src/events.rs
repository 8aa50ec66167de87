//! Events emitted by the grid.
//!
//! Hosts either subscribe a callback or drain the queue after each command.
//! Events are emitted synchronously, in the order the state changed.

use datagrid_core::Record;

use crate::error::FetchError;
use crate::export::{ExportPayload, ImportPreview};
use crate::pagination::LoadState;
use crate::request::FetchRequest;
use crate::state::GridState;

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Selected records in selection order. Keys not currently loaded are
    /// left out.
    SelectionChanged(Vec<Record>),

    /// Layout, filters, sort or page changed.
    StateChanged(GridState),

    ExportRequested(ExportPayload),

    /// The user confirmed a staged import.
    ImportParsed(ImportPreview),

    ImportFailed(String),

    BulkOperationExecuted { operation: String, rows: Vec<Record> },

    RowActionExecuted { action: String, row: Record },

    /// Emitted by every refresh. Client mode: the host may reload and call
    /// `reload_rows`. Server mode: a `FetchRequested` precedes it.
    RefreshRequested,

    /// Server mode: the host should fetch and answer with `complete_fetch`.
    FetchRequested(FetchRequest),

    /// The current request failed. Previously loaded rows stay visible.
    FetchFailed { seq: u64, error: FetchError },

    LoadStateChanged(LoadState),
}

/// Callback type for receiving grid events.
pub type EventCallback = Box<dyn FnMut(&GridEvent)>;

/// Event queue, also handy in tests.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<GridEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GridEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn fetch_requests(&self) -> Vec<&FetchRequest> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::FetchRequested(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn selection_changes(&self) -> Vec<&[Record]> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::SelectionChanged(rows) => Some(rows.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn state_changes(&self) -> Vec<&GridState> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::StateChanged(s) => Some(s),
                _ => None,
            })
            .collect()
    }
}
