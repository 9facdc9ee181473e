//! Client-side session storage.
//!
//! The signup step writes the access token under [`TOKEN_KEY`]; every
//! authenticated request of the OTP step reads it back. The store is injected
//! so flows can run against [`MemorySessionStore`] in tests.
//!
//! [`FileSessionStore`] keeps values in `<base>/session.json` with restricted
//! permissions (0600). Values are never logged.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Well-known key for the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Key-value store shared by the signup and OTP steps.
pub trait SessionStore: Send + Sync + 'static {
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`; clearing a missing key is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self, key: &str) -> Result<()>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|e| anyhow::anyhow!("session store poisoned: {e}"))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// On-disk layout: a flat JSON object of key to value.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct SessionFile {
    #[serde(flatten)]
    values: HashMap<String, String>,
}

/// File-backed store, one JSON file per Plaza home.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new(paths::session_path())
    }
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns an empty file if it doesn't exist.
    fn load(&self) -> Result<SessionFile> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))
    }

    fn save(&self, file: &SessionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(file).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            let mut handle = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            // `mode` only applies on create; tighten a file that already existed.
            handle
                .set_permissions(fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict {}", self.path.display()))?;
            handle
                .write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut SessionFile)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| anyhow::anyhow!("session store poisoned: {e}"))?;
        let mut file = self.load()?;
        f(&mut file);
        self.save(&file)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.values.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|file| {
            file.values.insert(key.to_string(), value.to_string());
        })
    }

    fn clear(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|file| {
            file.values.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        store.set(TOKEN_KEY, "tok123").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok123"));
        store.clear(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("home").join("session.json");

        FileSessionStore::new(&path).set(TOKEN_KEY, "tok123").unwrap();
        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("tok123"));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"token": "tok123"}));
    }

    #[test]
    fn test_file_store_clear_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.set(TOKEN_KEY, "tok123").unwrap();
        store.set("email", "a@b.com").unwrap();

        store.clear(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get("email").unwrap().as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_file_store_clear_without_file_is_noop() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.clear(TOKEN_KEY).unwrap();
        assert!(!store.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_uses_restricted_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.set(TOKEN_KEY, "tok123").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        FileSessionStore::new(&path).set(TOKEN_KEY, "tok123").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
