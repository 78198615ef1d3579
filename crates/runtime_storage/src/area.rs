use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("storage file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage file {path} does not hold a JSON object")]
    NotAnObject { path: PathBuf },
}

/// A key/value store of JSON values, the shape of `chrome.storage.local`.
pub trait StorageArea {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
    /// Returns whether the key was present.
    fn remove(&mut self, key: &str) -> Result<bool, StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryArea {
    entries: HashMap<String, Value>,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageArea for MemoryArea {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// One JSON object on disk holding every key. The file is read on open and rewritten in
/// full after each change; a missing file is an empty area.
#[derive(Debug)]
pub struct JsonFileArea {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileArea {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => {
                let value: Value = serde_json::from_str(&text).map_err(|source| {
                    StorageError::Json {
                        path: path.clone(),
                        source,
                    }
                })?;
                match value {
                    Value::Object(map) => map,
                    _ => return Err(StorageError::NotAnObject { path }),
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        log::debug!(
            target: "veil.storage",
            "opened {} with {} keys",
            path.display(),
            entries.len()
        );
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StorageError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        // The previous file stays in place until the new content is fully written.
        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl StorageArea for JsonFileArea {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    // The map only keeps a change once it reached the file.
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(err) = self.flush() {
            match previous {
                Some(previous) => self.entries.insert(key.to_string(), previous),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(false);
        };
        if let Err(err) = self.flush() {
            self.entries.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(true)
    }
}
