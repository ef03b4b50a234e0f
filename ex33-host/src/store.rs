//! Key-value string persistence and the preferences loaded from it.

use ex33_core::{Ex33Error, Ex33Result, DEFAULT_CODE};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage key of the editor contents.
pub const CODE_KEY: &str = "ex33_code_v3";
/// Storage key of the dark-mode flag ("true" / "false").
pub const DARK_MODE_KEY: &str = "ex33_dark_mode";

/// Simple string store, localStorage-style.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Ex33Result<()>;
}

/// Volatile store; nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Ex33Result<()> {
        let mut values = self.values.lock().map_err(|e| Ex33Error::Storage {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk. Every `set` rewrites the file through a temp file + rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens (or lazily creates) the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Ex33Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| Ex33Error::Storage {
                key: path.display().to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Ex33Result<()> {
        let storage_err = |reason: String| Ex33Error::Storage {
            key: key.to_string(),
            reason,
        };
        let mut values = self.values.lock().map_err(|e| storage_err(e.to_string()))?;
        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next).map_err(|e| storage_err(e.to_string()))?;
        *values = next;
        Ok(())
    }
}

/// User preferences restored at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub code: String,
    pub dark_mode: bool,
}

impl Preferences {
    /// Reads stored values, falling back to the default snippet and light mode.
    /// An empty stored snippet also falls back to the default.
    pub fn load_or_default(store: &dyn KeyValueStore) -> Self {
        Self {
            code: store
                .get(CODE_KEY)
                .filter(|code| !code.is_empty())
                .unwrap_or_else(|| DEFAULT_CODE.to_string()),
            dark_mode: store.get(DARK_MODE_KEY).as_deref() == Some("true"),
        }
    }

    pub fn save_code(store: &dyn KeyValueStore, code: &str) -> Ex33Result<()> {
        store.set(CODE_KEY, code)
    }

    pub fn save_dark_mode(store: &dyn KeyValueStore, dark_mode: bool) -> Ex33Result<()> {
        store.set(DARK_MODE_KEY, if dark_mode { "true" } else { "false" })
    }
}
