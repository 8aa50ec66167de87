// Grid settings
// Loaded from ~/.config/datagrid/settings.json (or an explicit .json/.toml file)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use datagrid_core::SelectionMode;
use datagrid_engine::column::ColumnDescriptor;
use datagrid_engine::export::ExportFormat;
use datagrid_engine::format::DisplayOptions;
use datagrid_engine::pagination::{DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS};
use datagrid_engine::sort::SortMode;
use datagrid_engine::{DataGrid, DataMode, GridConfig, SelectAllScope};

use crate::store::FileStateStore;
use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionSetting {
    Single,
    #[default]
    Multiple,
    /// Multiple selection driven by row checkboxes.
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    // Paging
    #[serde(rename = "grid.pageSize")]
    pub page_size: usize,

    #[serde(rename = "grid.pageSizeOptions")]
    pub page_size_options: Vec<usize>,

    // Selection and sort
    #[serde(rename = "grid.selectionMode")]
    pub selection_mode: SelectionSetting,

    #[serde(rename = "grid.multiSort")]
    pub multi_sort: bool,

    #[serde(rename = "grid.selectAll")]
    pub select_all: SelectAllScope,

    #[serde(rename = "grid.serverSide")]
    pub server_side: bool,

    // Formatting
    #[serde(rename = "format.date")]
    pub date_format: String,

    #[serde(rename = "format.datetime")]
    pub datetime_format: String,

    #[serde(rename = "format.currencySymbol")]
    pub currency_symbol: String,

    #[serde(rename = "format.decimals")]
    pub decimals: usize,

    // Export
    #[serde(rename = "export.formats")]
    pub export_formats: Vec<ExportFormat>,

    // State
    #[serde(rename = "state.persist")]
    pub persist_state: bool,

    #[serde(rename = "state.directory")]
    pub state_directory: Option<PathBuf>, // None = config dir

    // Refresh
    #[serde(rename = "refresh.enabled")]
    pub auto_refresh: bool,

    #[serde(rename = "refresh.intervalSeconds")]
    pub refresh_interval_seconds: Option<u64>, // None = default interval
}

impl Default for GridSettings {
    fn default() -> Self {
        let display = DisplayOptions::default();
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            selection_mode: SelectionSetting::Multiple,
            multi_sort: false,
            select_all: SelectAllScope::Filtered,
            server_side: false,
            date_format: display.date_format,
            datetime_format: display.datetime_format,
            currency_symbol: display.currency_symbol,
            decimals: display.decimals,
            export_formats: vec![ExportFormat::Csv, ExportFormat::Excel],
            persist_state: true,
            state_directory: None,
            auto_refresh: false,
            refresh_interval_seconds: None,
        }
    }
}

impl GridSettings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datagrid")
            .join("settings.json")
    }

    /// Load settings from the default path. Unreadable or invalid files are
    /// logged and replaced by defaults.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from `path`. A missing file yields defaults. Files
    /// ending in `.toml` are read as TOML (dotted keys must be quoted), all
    /// others as JSON with `//` line comments allowed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&contents).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })
        } else {
            Self::from_json(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    /// Parse JSON settings, skipping lines that start with `//`.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save settings as pretty JSON, creating the parent directory.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            date_format: self.date_format.clone(),
            datetime_format: self.datetime_format.clone(),
            currency_symbol: self.currency_symbol.clone(),
            decimals: self.decimals,
        }
    }

    /// Engine configuration for one grid. Persistence is keyed by
    /// `persistence_key` only when `state.persist` is on.
    pub fn grid_config(&self, title: Option<&str>, persistence_key: Option<&str>) -> GridConfig {
        let mut config = GridConfig {
            title: title.map(str::to_string),
            selection_mode: self.selection_mode.into(),
            mode: if self.server_side { DataMode::Server } else { DataMode::Client },
            sort_mode: if self.multi_sort { SortMode::Multiple } else { SortMode::Single },
            page_size: self.page_size,
            page_size_options: self.page_size_options.clone(),
            select_all: self.select_all,
            export_formats: self.export_formats.clone(),
            display: self.display_options(),
            ..GridConfig::default()
        };

        if self.persist_state {
            if let Some(key) = persistence_key {
                config.persistence_key = Some(key.to_string());
            }
        }
        if self.auto_refresh {
            config = match self.refresh_interval_seconds {
                Some(secs) => config.with_refresh_interval(Duration::from_secs(secs)),
                None => config.with_auto_refresh(),
            };
        }
        config
    }

    /// The store grid state is written to, if persistence is on.
    pub fn state_store(&self) -> Option<FileStateStore> {
        if !self.persist_state {
            return None;
        }
        Some(match &self.state_directory {
            Some(dir) => FileStateStore::new(dir),
            None => FileStateStore::at_default_location(),
        })
    }

    /// Build a grid from these settings, wired to the file state store when
    /// a persistence key is given and persistence is on.
    pub fn build_grid(
        &self,
        title: Option<&str>,
        persistence_key: Option<&str>,
        columns: Vec<ColumnDescriptor>,
    ) -> datagrid_engine::Result<DataGrid> {
        let config = self.grid_config(title, persistence_key);
        let persisted = config.persistence_key.is_some();
        let grid = DataGrid::new(config, columns)?;
        match self.state_store() {
            Some(store) if persisted => grid.with_store(Box::new(store)),
            _ => Ok(grid),
        }
    }
}

impl From<SelectionSetting> for SelectionMode {
    fn from(setting: SelectionSetting) -> Self {
        match setting {
            SelectionSetting::Single => SelectionMode::Single,
            SelectionSetting::Multiple | SelectionSetting::Checkbox => SelectionMode::Multiple,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagrid_engine::sort::SortDirection;
    use tempfile::tempdir;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(GridSettings::from_json("{}").unwrap(), GridSettings::default());
    }

    #[test]
    fn test_dotted_keys_with_comments() {
        let json = r#"{
    // Paging
    "grid.pageSize": 25,
    "grid.multiSort": true,
    "grid.selectionMode": "checkbox",
    "grid.selectAll": "currentPage",
    "format.currencySymbol": "$",
    "export.formats": ["csv"],
    "refresh.enabled": true,
    "refresh.intervalSeconds": 10
}"#;
        let settings = GridSettings::from_json(json).unwrap();
        assert_eq!(settings.page_size, 25);
        assert!(settings.multi_sort);
        assert_eq!(settings.selection_mode, SelectionSetting::Checkbox);
        assert_eq!(settings.select_all, SelectAllScope::CurrentPage);
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.export_formats, vec![ExportFormat::Csv]);
        assert!(settings.auto_refresh);
        assert_eq!(settings.refresh_interval_seconds, Some(10));
        // Untouched keys keep their defaults
        assert_eq!(settings.date_format, "%Y-%m-%d");
        assert_eq!(settings.page_size_options, vec![25, 50, 100, 200]);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let settings = GridSettings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, GridSettings::default());
    }

    #[test]
    fn test_load_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "\"grid.pageSize\" = 100\n\"grid.serverSide\" = true\n\"state.persist\" = false\n",
        )
        .unwrap();

        let settings = GridSettings::load_from(&path).unwrap();
        assert_eq!(settings.page_size, 100);
        assert!(settings.server_side);
        assert!(!settings.persist_state);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ \"grid.pageSize\": \"lots\" }").unwrap();
        let err = GridSettings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
        assert!(err.to_string().contains("settings.json"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = GridSettings {
            page_size: 100,
            decimals: 0,
            state_directory: Some(dir.path().join("state")),
            ..GridSettings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(GridSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_grid_config_mapping() {
        let settings = GridSettings {
            page_size: 25,
            multi_sort: true,
            selection_mode: SelectionSetting::Single,
            server_side: true,
            auto_refresh: true,
            refresh_interval_seconds: Some(15),
            ..GridSettings::default()
        };
        let config = settings.grid_config(Some("Users"), Some("users"));
        assert_eq!(config.title.as_deref(), Some("Users"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.sort_mode, SortMode::Multiple);
        assert_eq!(config.selection_mode, SelectionMode::Single);
        assert_eq!(config.mode, DataMode::Server);
        assert_eq!(config.persistence_key.as_deref(), Some("users"));
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(15)));
        assert!(config.validate().is_ok());

        let default_interval = GridSettings {
            auto_refresh: true,
            ..GridSettings::default()
        };
        assert_eq!(
            default_interval.grid_config(None, None).refresh_interval,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_persistence_off() {
        let settings = GridSettings {
            persist_state: false,
            refresh_interval_seconds: Some(10),
            ..GridSettings::default()
        };
        let config = settings.grid_config(None, Some("users"));
        assert_eq!(config.persistence_key, None);
        assert_eq!(config.refresh_interval, None);
        assert!(settings.state_store().is_none());
    }

    #[test]
    fn test_build_grid_persists_to_files() {
        let dir = tempdir().unwrap();
        let settings = GridSettings {
            state_directory: Some(dir.path().to_path_buf()),
            ..GridSettings::default()
        };
        let columns = || {
            vec![
                ColumnDescriptor::number("id", "ID"),
                ColumnDescriptor::text("name", "Name"),
            ]
        };

        let mut grid = settings.build_grid(Some("Users"), Some("admin/users"), columns()).unwrap();
        grid.initialize();
        grid.set_page_size(25).unwrap();
        grid.set_sort("name", SortDirection::Desc).unwrap();
        assert!(dir.path().join("admin%2Fusers.json").exists());

        let mut restored = settings.build_grid(Some("Users"), Some("admin/users"), columns()).unwrap();
        restored.initialize();
        assert_eq!(restored.pagination().page_size(), 25);
        assert_eq!(restored.sort().direction_of("name"), Some(SortDirection::Desc));
    }
}
