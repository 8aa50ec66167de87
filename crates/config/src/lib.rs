// Configuration loading

pub mod settings;
pub mod store;

use std::path::PathBuf;

pub use settings::{GridSettings, SelectionSetting};
pub use store::FileStateStore;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("error parsing {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("error parsing {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}
