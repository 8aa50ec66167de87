//! Core types shared by every grid crate: cell values, records, row identity
//! and the selection tracker.

pub mod record;
pub mod selection;
pub mod value;

pub use record::{Record, RowKey};
pub use selection::{InvalidSelection, Selection, SelectionMode};
pub use value::Value;

/// Identity field used when a grid does not name one.
pub const DEFAULT_DATA_KEY: &str = "id";
