// File-backed grid state store
// One JSON file per persistence key under ~/.config/datagrid/grid-state

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use datagrid_engine::persist::{StateStore, StoreError};

#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datagrid")
            .join("grid-state")
    }

    pub fn at_default_location() -> Self {
        Self::new(Self::default_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the state saved under `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl StateStore for FileStateStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        // Atomic replace
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Map a persistence key to a file stem. ASCII alphanumerics, `-` and `_`
/// are kept; every other byte becomes `%XX`, so distinct keys never share a
/// file and no stem can start with a dot.
fn sanitize_key(key: &str) -> String {
    if key.is_empty() {
        return "%".to_string();
    }
    let mut stem = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_') {
            stem.push(b as char);
        } else {
            stem.push_str(&format!("%{b:02X}"));
        }
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = FileStateStore::new(dir.path());
        assert_eq!(store.read("users").unwrap(), None);
    }

    #[test]
    fn test_write_read_remove() {
        let dir = tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("nested"));

        store.write("users", r#"{"version":1}"#).unwrap();
        assert_eq!(store.read("users").unwrap().as_deref(), Some(r#"{"version":1}"#));
        assert!(store.path_for("users").exists());

        store.write("users", "second").unwrap();
        assert_eq!(store.read("users").unwrap().as_deref(), Some("second"));

        store.remove("users").unwrap();
        assert_eq!(store.read("users").unwrap(), None);
        store.remove("users").unwrap();
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("users"), "users");
        assert_eq!(sanitize_key("admin/users grid"), "admin%2Fusers%20grid");
        assert_eq!(sanitize_key("../etc/passwd"), "%2E%2E%2Fetc%2Fpasswd");
        assert_eq!(sanitize_key("v1.2"), "v1%2E2");
        assert_eq!(sanitize_key("grün"), "gr%C3%BCn");
        assert_eq!(sanitize_key(""), "%");
    }

    #[test]
    fn test_distinct_keys_use_distinct_files() {
        let dir = tempdir().unwrap();
        let store = FileStateStore::new(dir.path());
        assert_ne!(store.path_for("admin/users"), store.path_for("admin_users"));
        assert_ne!(store.path_for("a b"), store.path_for("a%20b"));
        assert_ne!(store.path_for(""), store.path_for("_"));

        store.write("admin/users", "slash").unwrap();
        store.write("admin_users", "underscore").unwrap();
        assert_eq!(store.read("admin/users").unwrap().as_deref(), Some("slash"));
        assert_eq!(store.read("admin_users").unwrap().as_deref(), Some("underscore"));
    }

    #[test]
    fn test_keys_do_not_escape_dir() {
        let dir = tempdir().unwrap();
        let store = FileStateStore::new(dir.path());
        assert_eq!(store.path_for("../x").parent(), Some(dir.path()));
    }
}
