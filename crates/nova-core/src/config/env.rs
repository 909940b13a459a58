//! Environment variable overrides (`NOVA_CONFIG__A__B=value`).

use std::ffi::OsString;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::types::ConfigScope;

use super::error::{ConfigError, ConfigResult};
use super::merge::deep_merge;
use super::schema::{EffectiveConfig, SchemaViolation};

pub const ENV_PREFIX: &str = "NOVA_CONFIG__";
const SEPARATOR: &str = "__";

/// Apply overrides from the process environment.
///
/// Variables whose name or value is not valid UTF-8 are skipped; they can
/// never carry a `NOVA_CONFIG__` override.
pub fn apply_env_overrides(config: EffectiveConfig) -> ConfigResult<EffectiveConfig> {
    apply_env_overrides_from(config, utf8_vars(std::env::vars_os()))
}

fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

/// Apply overrides from an explicit set of variables.
///
/// Lists are replaced wholesale, including `marketplaces`. The result is
/// re-validated since an override can replace reserved keys.
pub fn apply_env_overrides_from<I, K, V>(config: EffectiveConfig, vars: I) -> ConfigResult<EffectiveConfig>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let overlay = build_overlay(vars);
    if overlay.is_empty() {
        return Ok(config);
    }

    let invalid = |violation: SchemaViolation| ConfigError::Validation {
        scope: ConfigScope::Effective,
        path: None,
        field: violation.field,
        message: violation.message,
    };

    let mut mapping = config.to_mapping().map_err(invalid)?;
    deep_merge(&mut mapping, overlay);

    EffectiveConfig::from_mapping(mapping).map_err(invalid)
}

/// Build the nested override mapping from matching variables.
pub fn build_overlay<I, K, V>(vars: I) -> Mapping
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut overlay = Mapping::new();
    for (key, value) in vars {
        let Some(segments) = key_segments(key.as_ref()) else {
            continue;
        };
        debug!(key = key.as_ref(), "applying config override from environment");
        insert_path(&mut overlay, &segments, parse_value(value.as_ref()));
    }
    overlay
}

/// `NOVA_CONFIG__A__B_` -> `["a", "b"]`. `None` for other variables or an
/// empty remainder.
fn key_segments(key: &str) -> Option<Vec<String>> {
    let remainder = key.strip_prefix(ENV_PREFIX)?.trim_matches('_');
    let segments: Vec<String> = remainder
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(str::to_lowercase)
        .collect();
    (!segments.is_empty()).then_some(segments)
}

/// Parse as YAML so numbers, booleans and collections keep their type.
fn parse_value(raw: &str) -> Value {
    serde_yaml::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn insert_path(target: &mut Mapping, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = target;
    for segment in parents {
        let key = Value::from(segment.as_str());
        if !matches!(current.get(&key), Some(Value::Mapping(_))) {
            current.insert(key.clone(), Value::Mapping(Mapping::new()));
        }
        current = match current.get_mut(&key) {
            Some(Value::Mapping(next)) => next,
            _ => return,
        };
    }
    current.insert(Value::from(last.as_str()), value);
}
