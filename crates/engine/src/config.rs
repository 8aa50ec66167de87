//! Per-grid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use datagrid_core::{SelectionMode, DEFAULT_DATA_KEY};

use crate::error::{GridError, Result};
use crate::export::ExportFormat;
use crate::format::DisplayOptions;
use crate::pagination::{DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS};
use crate::refresh::DEFAULT_REFRESH_INTERVAL;
use crate::sort::SortMode;

/// Where rows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// The host hands over the whole dataset; the grid filters, sorts and pages.
    #[default]
    Client,
    /// The grid asks the host for one page at a time.
    Server,
}

/// Rows covered by "select all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectAllScope {
    /// Every loaded row passing the current filter, across pages
    #[default]
    Filtered,
    CurrentPage,
    /// Every loaded row, ignoring filters
    Loaded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub title: Option<String>,
    pub data_key: String,
    pub mode: DataMode,
    pub selection_mode: SelectionMode,
    pub sort_mode: SortMode,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub select_all: SelectAllScope,
    pub export_formats: Vec<ExportFormat>,
    /// Key under which grid state is persisted; `None` disables persistence.
    pub persistence_key: Option<String>,
    pub refresh_interval: Option<Duration>,
    pub display: DisplayOptions,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            title: None,
            data_key: DEFAULT_DATA_KEY.to_string(),
            mode: DataMode::Client,
            selection_mode: SelectionMode::Multiple,
            sort_mode: SortMode::Single,
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            select_all: SelectAllScope::Filtered,
            export_formats: vec![ExportFormat::Csv, ExportFormat::Excel],
            persistence_key: None,
            refresh_interval: None,
            display: DisplayOptions::default(),
        }
    }
}

impl GridConfig {
    pub fn client() -> Self {
        Self::default()
    }

    pub fn server() -> Self {
        Self {
            mode: DataMode::Server,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = key.into();
        self
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn with_sort_mode(mut self, mode: SortMode) -> Self {
        self.sort_mode = mode;
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn with_select_all(mut self, scope: SelectAllScope) -> Self {
        self.select_all = scope;
        self
    }

    pub fn with_export_formats(mut self, formats: Vec<ExportFormat>) -> Self {
        self.export_formats = formats;
        self
    }

    pub fn with_persistence_key(mut self, key: impl Into<String>) -> Self {
        self.persistence_key = Some(key.into());
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Auto-refresh at the default interval.
    pub fn with_auto_refresh(self) -> Self {
        self.with_refresh_interval(DEFAULT_REFRESH_INTERVAL)
    }

    pub fn with_display(mut self, display: DisplayOptions) -> Self {
        self.display = display;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_key.trim().is_empty() {
            return Err(GridError::Configuration("data key must not be empty".into()));
        }
        if self.page_size == 0 {
            return Err(GridError::Configuration("page size must be at least 1".into()));
        }
        if self.page_size_options.contains(&0) {
            return Err(GridError::Configuration("page size options must be at least 1".into()));
        }
        if self
            .persistence_key
            .as_deref()
            .is_some_and(|k| k.trim().is_empty())
        {
            return Err(GridError::Configuration("persistence key must not be empty".into()));
        }
        Ok(())
    }
}
