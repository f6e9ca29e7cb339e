//! String key-value storage for small persisted preferences.
//!
//! Structure:
//! - `KeyValueStore`: the seam components write through
//! - `MemoryStore`: shared in-process map
//! - `JsonFileStore`: one JSON file on disk

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current store file format version.
const STORE_VERSION: u32 = 1;

/// Store filename within the data directory.
const STORE_FILENAME: &str = "storage.json";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed store file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported store version {found} in {}", .path.display())]
    UnsupportedVersion { path: PathBuf, found: u32 },
}

// ============================================================================
// TRAIT
// ============================================================================

/// Page-local persistent storage: string keys to string values.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

// ============================================================================
// JSON FILE STORE
// ============================================================================

/// On-disk layout of the store file.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    items: BTreeMap<String, String>,
}

/// Returns the default store directory.
///
/// On macOS: ~/Library/Application Support/pagenav/
pub fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pagenav")
}

/// Returns the default store file path.
pub fn default_store_path() -> PathBuf {
    default_store_dir().join(STORE_FILENAME)
}

/// Store backed by a single JSON file.
///
/// Every call reads the file; writes rewrite it whole. A missing file
/// reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    /// Store at [`default_store_path`].
    pub fn open_default() -> Self {
        Self::new(default_store_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreFile, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(StoreFile {
                    version: STORE_VERSION,
                    items: BTreeMap::new(),
                });
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let file: StoreFile =
            serde_json::from_str(&contents).map_err(|source| StorageError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        if file.version != STORE_VERSION {
            return Err(StorageError::UnsupportedVersion {
                path: self.path.clone(),
                found: file.version,
            });
        }
        Ok(file)
    }

    fn save(&self, file: &StoreFile) -> Result<(), StorageError> {
        let io_err = |source: io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(file).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut file = self.load()?;
        file.items.insert(key.to_string(), value.to_string());
        self.save(&file)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut file = self.load()?;
        if file.items.remove(key).is_some() {
            self.save(&file)?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
