//! Namespaced JSON key-value persistence.
//!
//! Each namespace is a single flat JSON object stored at
//! `<data_root>/<namespace>/data.json`. Every mutation is a full
//! read-modify-write of that file.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

const DATA_FILE: &str = "data.json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataStoreError {
    #[error("key '{key}' not found in namespace '{namespace}'")]
    KeyNotFound { namespace: String, key: String },

    #[error("failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
}

#[derive(Debug, Clone)]
pub struct FileDataStore {
    namespace: String,
    data_root: PathBuf,
}

impl FileDataStore {
    pub fn new(namespace: impl Into<String>, data_root: impl Into<PathBuf>) -> Self {
        Self {
            namespace: namespace.into(),
            data_root: data_root.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn data_file(&self) -> PathBuf {
        self.data_root.join(&self.namespace).join(DATA_FILE)
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn save(&self, key: &str, value: Value) -> Result<(), DataStoreError> {
        let mut data = self.read_all()?;
        data.insert(key.to_string(), value);
        self.write_all(&data)
    }

    pub fn load(&self, key: &str) -> Result<Value, DataStoreError> {
        let mut data = self.read_all()?;
        data.remove(key).ok_or_else(|| DataStoreError::KeyNotFound {
            namespace: self.namespace.clone(),
            key: key.to_string(),
        })
    }

    /// Remove `key`. Missing keys and a missing file are not errors.
    pub fn delete(&self, key: &str) -> Result<(), DataStoreError> {
        if !self.data_file().exists() {
            return Ok(());
        }
        let mut data = self.read_all()?;
        if data.remove(key).is_some() {
            self.write_all(&data)?;
        }
        Ok(())
    }

    pub fn keys(&self) -> Result<Vec<String>, DataStoreError> {
        Ok(self.read_all()?.keys().cloned().collect())
    }

    fn read_all(&self) -> Result<Map<String, Value>, DataStoreError> {
        let path = self.data_file();
        if !path.exists() {
            return Ok(Map::new());
        }

        let bytes = fs::read(&path).map_err(|e| read_error(&path, e))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice(&bytes).map_err(|e| read_error(&path, e))? {
            Value::Object(map) => Ok(map),
            _ => Err(DataStoreError::Read {
                path,
                message: "expected a JSON object".to_string(),
            }),
        }
    }

    /// Write atomically (tmp + rename).
    fn write_all(&self, data: &Map<String, Value>) -> Result<(), DataStoreError> {
        let path = self.data_file();
        let dir = path.parent().unwrap_or(&self.data_root);
        fs::create_dir_all(dir).map_err(|e| write_error(dir, e))?;

        let bytes = serde_json::to_vec_pretty(data).map_err(|e| write_error(&path, e))?;
        let tmp_path = dir.join(format!("{DATA_FILE}.tmp.{}", std::process::id()));
        fs::write(&tmp_path, bytes).map_err(|e| write_error(&tmp_path, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| write_error(&path, e))
    }
}

fn read_error(path: &Path, err: impl std::fmt::Display) -> DataStoreError {
    DataStoreError::Read {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> DataStoreError {
    DataStoreError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
