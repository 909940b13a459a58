//! Typed view of a scope's YAML document.
//!
//! Reserved keys (`marketplaces`, `logging`) are validated against the value
//! tree before conversion so violations can be reported with a dotted field
//! path such as `marketplaces.0.source.repo`. Every other key is carried
//! through untouched in `extra`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::settings::Settings;
use crate::source::resolver::{expand_tilde, is_github_repo, is_valid_git_url};
use crate::source::MarketplaceSource;
use crate::types::ConfigScope;

pub const MARKETPLACES_KEY: &str = "marketplaces";
pub const LOGGING_KEY: &str = "logging";

/// A named marketplace source as stored in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceEntry {
    pub name: String,
    pub source: MarketplaceSource,
}

impl MarketplaceEntry {
    pub fn new(name: impl Into<String>, source: MarketplaceSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Fails when the source cannot be represented in YAML, e.g. a local
    /// path that is not valid UTF-8.
    pub fn to_value(&self) -> Result<Value, serde_yaml::Error> {
        serde_yaml::to_value(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Success,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info | Self::Success => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// `logging` section, only honoured in the global scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub log_level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: LogLevel::Info,
            log_file: None,
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Log file to write to, with `~` expanded.
    pub fn resolved_log_file(&self, settings: &Settings) -> PathBuf {
        match &self.log_file {
            Some(file) => expand_tilde(file, dirs::home_dir().as_deref()),
            None => settings.default_log_file(),
        }
    }
}

/// First schema violation found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SchemaViolation {
    pub field: Option<String>,
    pub message: String,
}

impl SchemaViolation {
    fn at(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

type SchemaResult<T> = Result<T, SchemaViolation>;

/// One scope's validated configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    pub marketplaces: Vec<MarketplaceEntry>,
    pub logging: Option<LoggingConfig>,
    /// Non-reserved keys, in file order.
    pub extra: Mapping,
}

impl ConfigDocument {
    pub fn from_mapping(mut mapping: Mapping, scope: ConfigScope) -> SchemaResult<Self> {
        let marketplaces = match mapping.shift_remove(MARKETPLACES_KEY) {
            Some(value) => parse_marketplaces(&value)?,
            None => Vec::new(),
        };

        let logging = match mapping.shift_remove(LOGGING_KEY) {
            Some(value) => parse_logging(value, scope)?,
            None => None,
        };

        Ok(Self {
            marketplaces,
            logging,
            extra: mapping,
        })
    }

    pub fn to_mapping(&self) -> SchemaResult<Mapping> {
        let mut mapping = Mapping::new();
        if !self.marketplaces.is_empty() {
            mapping.insert(
                Value::from(MARKETPLACES_KEY),
                marketplaces_to_value(&self.marketplaces)?,
            );
        }
        if let Some(logging) = &self.logging {
            mapping.insert(Value::from(LOGGING_KEY), logging_to_value(logging)?);
        }
        for (key, value) in &self.extra {
            mapping.insert(key.clone(), value.clone());
        }
        Ok(mapping)
    }
}

/// Merged configuration of every scope plus environment overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveConfig {
    /// Unique by name, in first-seen order.
    pub marketplaces: Vec<MarketplaceEntry>,
    pub logging: LoggingConfig,
    pub extra: Mapping,
}

impl EffectiveConfig {
    /// Rebuild from a raw mapping, validating reserved keys.
    pub fn from_mapping(mapping: Mapping) -> SchemaResult<Self> {
        let document = ConfigDocument::from_mapping(mapping, ConfigScope::Effective)?;
        Ok(Self {
            marketplaces: document.marketplaces,
            logging: document.logging.unwrap_or_default(),
            extra: document.extra,
        })
    }

    pub fn to_mapping(&self) -> SchemaResult<Mapping> {
        let mut mapping = Mapping::new();
        mapping.insert(
            Value::from(MARKETPLACES_KEY),
            marketplaces_to_value(&self.marketplaces)?,
        );
        mapping.insert(Value::from(LOGGING_KEY), logging_to_value(&self.logging)?);
        for (key, value) in &self.extra {
            mapping.insert(key.clone(), value.clone());
        }
        Ok(mapping)
    }

    /// Look up a value by dotted key (`a.b.c`). `None` also when the
    /// config cannot be serialized.
    pub fn get(&self, dotted: &str) -> Option<Value> {
        let root = Value::Mapping(self.to_mapping().ok()?);
        dotted
            .split('.')
            .try_fold(&root, |node, segment| match node {
                Value::Mapping(map) => map.get(segment),
                Value::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
            .cloned()
    }

    pub fn marketplace(&self, name: &str) -> Option<&MarketplaceEntry> {
        self.marketplaces.iter().find(|entry| entry.name == name)
    }
}

fn marketplaces_to_value(entries: &[MarketplaceEntry]) -> SchemaResult<Value> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            entry.to_value().map_err(|e| {
                SchemaViolation::at(
                    format!("{MARKETPLACES_KEY}.{index}"),
                    format!("cannot be serialized: {e}"),
                )
            })
        })
        .collect::<SchemaResult<Vec<_>>>()
        .map(Value::Sequence)
}

fn logging_to_value(logging: &LoggingConfig) -> SchemaResult<Value> {
    serde_yaml::to_value(logging)
        .map_err(|e| SchemaViolation::at(LOGGING_KEY, format!("cannot be serialized: {e}")))
}

fn parse_logging(value: Value, scope: ConfigScope) -> SchemaResult<Option<LoggingConfig>> {
    if !matches!(scope, ConfigScope::Global | ConfigScope::Effective) {
        return Err(SchemaViolation::at(
            LOGGING_KEY,
            "Logging configuration can only be set in global config",
        ));
    }
    if value.is_null() {
        return Ok(None);
    }
    serde_yaml::from_value(value)
        .map(Some)
        .map_err(|e| SchemaViolation::at(LOGGING_KEY, e.to_string()))
}

fn parse_marketplaces(value: &Value) -> SchemaResult<Vec<MarketplaceEntry>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(items) => items,
        _ => {
            return Err(SchemaViolation::at(
                MARKETPLACES_KEY,
                "expected a list of marketplace entries",
            ));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_entry(item, &format!("{MARKETPLACES_KEY}.{index}")))
        .collect()
}

fn parse_entry(value: &Value, loc: &str) -> SchemaResult<MarketplaceEntry> {
    let map = value
        .as_mapping()
        .ok_or_else(|| SchemaViolation::at(loc, "expected a mapping with 'name' and 'source'"))?;

    let name = required_str(map, "name", loc)?;
    if name.trim().is_empty() {
        return Err(SchemaViolation::at(
            format!("{loc}.name"),
            "marketplace name must not be empty",
        ));
    }

    let source_loc = format!("{loc}.source");
    let source = match map.get("source") {
        Some(Value::Mapping(source)) => parse_source_mapping(source, &source_loc)?,
        Some(_) => return Err(SchemaViolation::at(source_loc, "expected a mapping")),
        None => return Err(SchemaViolation::at(source_loc, "field required")),
    };

    Ok(MarketplaceEntry::new(name, source))
}

fn parse_source_mapping(map: &Mapping, loc: &str) -> SchemaResult<MarketplaceSource> {
    let kind = required_str(map, "type", loc)?;
    match kind {
        "github" => {
            let repo = required_str(map, "repo", loc)?;
            if !is_github_repo(repo) {
                return Err(SchemaViolation::at(
                    format!("{loc}.repo"),
                    format!("repository '{repo}' must be in 'owner/repo' format"),
                ));
            }
            Ok(MarketplaceSource::github(repo))
        }
        "git" => {
            let url = required_str(map, "url", loc)?;
            if !is_valid_git_url(url) {
                return Err(SchemaViolation::at(
                    format!("{loc}.url"),
                    format!("URL '{url}' must start with http://, https://, git@ or git://"),
                ));
            }
            Ok(MarketplaceSource::git(url))
        }
        "local" => {
            let raw = required_str(map, "path", loc)?;
            let path = expand_tilde(raw, dirs::home_dir().as_deref());
            check_local_dir(&path).map_err(|message| {
                SchemaViolation::at(format!("{loc}.path"), message)
            })?;
            Ok(MarketplaceSource::local(path))
        }
        other => Err(SchemaViolation::at(
            format!("{loc}.type"),
            format!("unknown source type '{other}', expected github, git or local"),
        )),
    }
}

fn check_local_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("path does not exist: {}", path.display()));
    }
    if !path.is_dir() {
        return Err(format!("path is not a directory: {}", path.display()));
    }
    Ok(())
}

fn required_str<'a>(map: &'a Mapping, key: &str, loc: &str) -> SchemaResult<&'a str> {
    match map.get(key) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(SchemaViolation::at(format!("{loc}.{key}"), "expected a string")),
        None => Err(SchemaViolation::at(format!("{loc}.{key}"), "field required")),
    }
}
