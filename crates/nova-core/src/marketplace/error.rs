//! Marketplace error taxonomy.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::source::MarketplaceSource;
use crate::source::resolver::SourceParseError;

pub type MarketplaceResult<T> = Result<T, MarketplaceError>;

/// Which stage of manifest loading failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestErrorKind {
    /// No `marketplace.json` at the source root.
    Missing,
    /// Not valid JSON.
    Malformed,
    /// Valid JSON that does not satisfy the manifest schema.
    Schema,
}

impl fmt::Display for ManifestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Missing => "missing",
            Self::Malformed => "malformed",
            Self::Schema => "schema",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketplaceError {
    #[error("invalid marketplace source '{input}': {message}")]
    SourceParse { input: String, message: String },

    #[error("failed to fetch marketplace from {origin}: {message}")]
    Fetch { origin: String, message: String },

    #[error("{message} ({})", .location.display())]
    InvalidManifest {
        location: PathBuf,
        kind: ManifestErrorKind,
        message: String,
    },

    #[error("marketplace '{name}' conflicts with existing marketplace '{existing_name}' ({existing_source})")]
    AlreadyExists {
        name: String,
        existing_name: String,
        existing_source: MarketplaceSource,
    },

    #[error("marketplace '{name_or_source}' not found{}", reason_suffix(.reason))]
    NotFound {
        name_or_source: String,
        reason: Option<String>,
    },

    #[error("install state error for '{name}': {message}")]
    State { name: String, message: String },

    #[error("failed to manage marketplace files at {}: {message}", .path.display())]
    Storage { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MarketplaceError {
    pub(crate) fn not_found(name_or_source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            name_or_source: name_or_source.into(),
            reason: Some(reason.into()),
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        Self::Storage {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<SourceParseError> for MarketplaceError {
    fn from(err: SourceParseError) -> Self {
        Self::SourceParse {
            input: err.input,
            message: err.message,
        }
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigScope;

    #[test]
    fn source_parse_error_converts() {
        let err: MarketplaceError = SourceParseError {
            input: "  ".to_string(),
            message: "Marketplace source cannot be empty.".to_string(),
        }
        .into();
        assert_eq!(
            err,
            MarketplaceError::SourceParse {
                input: "  ".to_string(),
                message: "Marketplace source cannot be empty.".to_string(),
            }
        );
    }

    #[test]
    fn config_errors_are_wrapped_transparently() {
        let config = ConfigError::NotFound {
            scope: ConfigScope::Global,
            expected_path: PathBuf::from("/cfg/config.yaml"),
        };
        let err = MarketplaceError::from(config.clone());
        assert_eq!(err.to_string(), config.to_string());
    }

    #[test]
    fn not_found_display_includes_reason() {
        let err = MarketplaceError::not_found("official", "no install state");
        assert_eq!(
            err.to_string(),
            "marketplace 'official' not found: no install state"
        );
    }
}
