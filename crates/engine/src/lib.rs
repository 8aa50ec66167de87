pub mod bulk;
pub mod column;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod filter;
pub mod format;
pub mod grid;
pub mod pagination;
pub mod persist;
pub mod refresh;
pub mod request;
pub mod sort;
pub mod state;

pub use column::{ColumnDescriptor, ColumnModel, ColumnType};
pub use config::{DataMode, GridConfig, SelectAllScope};
pub use error::{FetchError, GridError, Result};
pub use events::GridEvent;
pub use grid::DataGrid;
