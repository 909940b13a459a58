//! Errors raised while locating, reading or validating config files.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ConfigScope;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The path was resolved but the file is gone.
    #[error("{scope} config not found at {}", .expected_path.display())]
    NotFound {
        scope: ConfigScope,
        expected_path: PathBuf,
    },

    #[error("failed to access {scope} config at {}: {message}", .path.display())]
    Io {
        scope: ConfigScope,
        path: PathBuf,
        message: String,
    },

    #[error(
        "invalid YAML in {scope} config {}{}: {message}",
        .path.display(),
        location_suffix(.line, .column)
    )]
    YamlParse {
        scope: ConfigScope,
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    /// `path` is `None` only for the environment overlay.
    #[error(
        "invalid {scope} config{}{}: {message}",
        path_suffix(.path),
        field_suffix(.field)
    )]
    Validation {
        scope: ConfigScope,
        path: Option<PathBuf>,
        field: Option<String>,
        message: String,
    },
}

impl ConfigError {
    pub fn scope(&self) -> ConfigScope {
        match self {
            Self::NotFound { scope, .. }
            | Self::Io { scope, .. }
            | Self::YamlParse { scope, .. }
            | Self::Validation { scope, .. } => *scope,
        }
    }

    /// File the error refers to, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound { expected_path, .. } => Some(expected_path),
            Self::Io { path, .. } | Self::YamlParse { path, .. } => Some(path),
            Self::Validation { path, .. } => path.as_ref(),
        }
    }

    pub(crate) fn io(scope: ConfigScope, path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            scope,
            path: path.into(),
            message: err.to_string(),
        }
    }
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" (line {line}, column {column})"),
        (Some(line), None) => format!(" (line {line})"),
        _ => String::new(),
    }
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default()
}

fn field_suffix(field: &Option<String>) -> String {
    field.as_ref().map(|f| format!(" at '{f}'")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_error_display_includes_position() {
        let err = ConfigError::YamlParse {
            scope: ConfigScope::Global,
            path: PathBuf::from("/cfg/config.yaml"),
            line: Some(3),
            column: Some(7),
            message: "unexpected end".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid YAML in global config /cfg/config.yaml (line 3, column 7): unexpected end"
        );
    }

    #[test]
    fn validation_without_path_omits_it() {
        let err = ConfigError::Validation {
            scope: ConfigScope::Effective,
            path: None,
            field: Some("logging.enabled".to_string()),
            message: "expected a boolean".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid effective config at 'logging.enabled': expected a boolean"
        );
        assert!(err.path().is_none());
        assert_eq!(err.scope(), ConfigScope::Effective);
    }
}
