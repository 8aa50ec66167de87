use datagrid_core::InvalidSelection;

/// Failure reported by a server-mode data source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Invalid column or grid setup. Fatal at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    InvalidSelection(#[from] InvalidSelection),

    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' is not sortable")]
    NotSortable(String),

    #[error("column '{0}' is not filterable")]
    NotFilterable(String),

    #[error("invalid filter on '{field}': {reason}")]
    InvalidFilter { field: String, reason: String },

    #[error("duplicate row key '{0}'")]
    DuplicateRowKey(String),

    #[error("no loaded row with key '{0}'")]
    UnknownRow(String),

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("operation '{0}' is disabled for the current selection")]
    OperationDisabled(String),

    /// Command not available in the grid's data mode.
    #[error("{0} is not available in this data mode")]
    WrongMode(&'static str),
}

pub type Result<T> = std::result::Result<T, GridError>;
