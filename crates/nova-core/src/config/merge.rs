//! Configuration layer merging logic
//!
//! Implements the 3-layer merge strategy:
//! Global -> Project -> User

use serde_yaml::{Mapping, Value};

use super::schema::{ConfigDocument, EffectiveConfig, MarketplaceEntry};

/// Merge scope documents, later scopes taking precedence.
///
/// # Arguments
/// * `global` - Global configuration from `<config dir>/nova/config.yaml`
/// * `project` - Project configuration from `.nova/config.yaml`
/// * `user` - Per-user overrides from `.nova/config.local.yaml`
///
/// # Returns
/// Merged configuration. Marketplaces are merged by name: an entry keeps the
/// position of the first scope that declared it and the value of the last.
pub fn merge_configs(
    global: Option<ConfigDocument>,
    project: Option<ConfigDocument>,
    user: Option<ConfigDocument>,
) -> EffectiveConfig {
    let mut merged = EffectiveConfig::default();

    for document in [global, project, user].into_iter().flatten() {
        merge_marketplaces(&mut merged.marketplaces, document.marketplaces);
        if let Some(logging) = document.logging {
            merged.logging = logging;
        }
        deep_merge(&mut merged.extra, document.extra);
    }

    merged
}

/// Identity-aware list merge keyed by marketplace name.
pub fn merge_marketplaces(base: &mut Vec<MarketplaceEntry>, incoming: Vec<MarketplaceEntry>) {
    for entry in incoming {
        match base.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => *existing = entry,
            None => base.push(entry),
        }
    }
}

/// Recursively merge `overlay` onto `base`.
///
/// Nested mappings merge key by key; any other value replaces the base
/// value. Null never overwrites: an absent value is not the same as a falsy
/// one.
pub fn deep_merge(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        if value.is_null() {
            continue;
        }
        match value {
            Value::Mapping(incoming) => match base.get_mut(&key) {
                Some(Value::Mapping(existing)) => deep_merge(existing, incoming),
                _ => {
                    base.insert(key, strip_nulls(Value::Mapping(incoming)));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LoggingConfig;
    use crate::source::MarketplaceSource;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn doc(yaml: &str) -> ConfigDocument {
        ConfigDocument {
            extra: mapping(yaml),
            ..ConfigDocument::default()
        }
    }

    fn entry(name: &str, repo: &str) -> MarketplaceEntry {
        MarketplaceEntry::new(name, MarketplaceSource::github(repo))
    }

    #[test]
    fn nested_mappings_merge_key_by_key() {
        let merged = merge_configs(
            Some(doc("editor: {name: vim, tabs: 4}\ntheme: light")),
            Some(doc("editor: {tabs: 2}")),
            Some(doc("theme: dark")),
        );

        assert_eq!(
            merged.extra,
            mapping("editor: {name: vim, tabs: 2}\ntheme: dark")
        );
    }

    #[test]
    fn lists_are_replaced_not_concatenated() {
        let merged = merge_configs(Some(doc("tags: [a, b]")), None, Some(doc("tags: [c]")));
        assert_eq!(merged.extra, mapping("tags: [c]"));
    }

    #[test]
    fn null_never_clobbers_but_falsy_values_do() {
        let merged = merge_configs(
            Some(doc("a: 1\nb: true\nc: text\nd: {e: 1}")),
            Some(doc("a: 0\nb: false\nc: ''\nd: ~")),
            Some(doc("a: ~")),
        );

        assert_eq!(
            merged.extra,
            mapping("a: 0\nb: false\nc: ''\nd: {e: 1}")
        );
    }

    #[test]
    fn nested_nulls_are_dropped_on_insert() {
        let mut base = Mapping::new();
        deep_merge(&mut base, mapping("x: {keep: 1, drop: ~}"));
        assert_eq!(base, mapping("x: {keep: 1}"));
    }

    #[test]
    fn marketplaces_keep_first_position_and_last_value() {
        let global = ConfigDocument {
            marketplaces: vec![entry("official", "a/official"), entry("shared", "a/shared")],
            ..ConfigDocument::default()
        };
        let project = ConfigDocument {
            marketplaces: vec![entry("team", "a/team"), entry("official", "a/official-fork")],
            ..ConfigDocument::default()
        };

        let merged = merge_configs(Some(global), Some(project), None);

        assert_eq!(
            merged.marketplaces,
            vec![
                entry("official", "a/official-fork"),
                entry("shared", "a/shared"),
                entry("team", "a/team"),
            ]
        );
    }

    #[test]
    fn marketplace_merge_is_idempotent() {
        let mut list = vec![entry("a", "o/a"), entry("b", "o/b")];
        let snapshot = list.clone();
        merge_marketplaces(&mut list, snapshot.clone());
        assert_eq!(list, snapshot);
    }

    #[test]
    fn logging_comes_from_last_scope_that_sets_it() {
        let global = ConfigDocument {
            logging: Some(LoggingConfig {
                enabled: false,
                ..LoggingConfig::default()
            }),
            ..ConfigDocument::default()
        };

        let merged = merge_configs(Some(global), Some(ConfigDocument::default()), None);
        assert!(!merged.logging.enabled);

        let merged = merge_configs(None, None, None);
        assert_eq!(merged.logging, LoggingConfig::default());
    }
}
