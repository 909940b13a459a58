//! Reads and validates a single scope's config file.

use std::io::ErrorKind;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::types::ConfigScope;

use super::error::{ConfigError, ConfigResult};
use super::schema::ConfigDocument;

/// Load one scope. `None` path means the scope has no file.
pub fn load_document(path: Option<&Path>, scope: ConfigScope) -> ConfigResult<Option<ConfigDocument>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let mapping = read_mapping(path, scope)?;
    ConfigDocument::from_mapping(mapping, scope)
        .map(Some)
        .map_err(|violation| ConfigError::Validation {
            scope,
            path: Some(path.to_path_buf()),
            field: violation.field,
            message: violation.message,
        })
}

/// Read a file as a raw YAML mapping. Empty documents become an empty mapping.
pub fn read_mapping(path: &Path, scope: ConfigScope) -> ConfigResult<Mapping> {
    let content = std::fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ConfigError::NotFound {
            scope,
            expected_path: path.to_path_buf(),
        },
        _ => ConfigError::io(scope, path, &err),
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|err| {
        let location = err.location();
        ConfigError::YamlParse {
            scope,
            path: path.to_path_buf(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
            message: err.to_string(),
        }
    })?;

    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(ConfigError::Validation {
            scope,
            path: Some(path.to_path_buf()),
            field: None,
            message: "Configuration root must be a mapping of keys to values.".to_string(),
        }),
    }
}

/// Serialize a mapping back to `path`, creating parent directories.
pub fn write_mapping(path: &Path, scope: ConfigScope, mapping: &Mapping) -> ConfigResult<()> {
    let content = serde_yaml::to_string(mapping).map_err(|err| ConfigError::Io {
        scope,
        path: path.to_path_buf(),
        message: format!("failed to serialize config: {err}"),
    })?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| ConfigError::io(scope, parent, &err))?;
    }
    std::fs::write(path, content).map_err(|err| ConfigError::io(scope, path, &err))
}
