//! Config store for loading the layered configuration and editing the
//! marketplace lists of individual scope files.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::settings::Settings;
use crate::source::MarketplaceSource;
use crate::types::{ConfigScope, MarketplaceScope};

use super::env::apply_env_overrides;
use super::error::{ConfigError, ConfigResult};
use super::loader::{load_document, read_mapping, write_mapping};
use super::merge::merge_configs;
use super::paths::{self, ConfigPaths};
use super::schema::{ConfigDocument, EffectiveConfig, MARKETPLACES_KEY, MarketplaceEntry};

/// Scope order used when searching every file, lowest precedence first.
const LOAD_ORDER: [ConfigScope; 3] = [ConfigScope::Global, ConfigScope::Project, ConfigScope::User];

/// Scope order used when removing without an explicit scope.
const REMOVE_ORDER: [MarketplaceScope; 2] = [MarketplaceScope::Project, MarketplaceScope::Global];

#[derive(Debug, Clone)]
pub struct ConfigStore {
    settings: Settings,
    working_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(settings: &Settings, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings: settings.clone(),
            working_dir: working_dir.into(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Config files currently visible from the working directory.
    pub fn paths(&self) -> ConfigPaths {
        paths::discover(&self.settings, &self.working_dir)
    }

    /// Load every scope, merge them and apply environment overrides.
    ///
    /// Scopes load Global, Project, User; the first failure aborts.
    pub fn load(&self) -> ConfigResult<EffectiveConfig> {
        let paths = self.paths();
        let global = load_document(paths.global_path.as_deref(), ConfigScope::Global)?;
        let project = load_document(paths.project_path.as_deref(), ConfigScope::Project)?;
        let user = load_document(paths.user_path.as_deref(), ConfigScope::User)?;

        apply_env_overrides(merge_configs(global, project, user))
    }

    /// Load a single scope; `None` when that scope has no file.
    pub fn load_scope(&self, scope: ConfigScope) -> ConfigResult<Option<ConfigDocument>> {
        if scope == ConfigScope::Effective {
            let effective = self.load()?;
            return Ok(Some(ConfigDocument {
                marketplaces: effective.marketplaces,
                logging: Some(effective.logging),
                extra: effective.extra,
            }));
        }
        load_document(self.paths().for_scope(scope), scope)
    }

    /// Marketplaces of the effective configuration.
    pub fn marketplaces(&self) -> ConfigResult<Vec<MarketplaceEntry>> {
        Ok(self.load()?.marketplaces)
    }

    /// First entry in any scope whose name or source matches.
    pub fn find_conflict(
        &self,
        name: &str,
        source: &MarketplaceSource,
    ) -> ConfigResult<Option<MarketplaceEntry>> {
        let paths = self.paths();
        for scope in LOAD_ORDER {
            let Some(document) = load_document(paths.for_scope(scope), scope)? else {
                continue;
            };
            if let Some(entry) = document
                .marketplaces
                .into_iter()
                .find(|entry| entry.name == name || &entry.source == source)
            {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Append an entry to the scope's file, creating it when missing.
    ///
    /// Duplicates are not checked here. Returns the file written.
    pub fn add_marketplace(
        &self,
        entry: &MarketplaceEntry,
        scope: MarketplaceScope,
    ) -> ConfigResult<PathBuf> {
        let config_scope = ConfigScope::from(scope);
        let path = self.target_path(config_scope)?;
        let value = entry.to_value().map_err(|err| ConfigError::Validation {
            scope: config_scope,
            path: Some(path.clone()),
            field: Some(MARKETPLACES_KEY.to_string()),
            message: format!("marketplace '{}' cannot be serialized: {err}", entry.name),
        })?;

        let mut mapping = if path.exists() {
            read_mapping(&path, config_scope)?
        } else {
            Mapping::new()
        };
        ConfigDocument::from_mapping(mapping.clone(), config_scope).map_err(|violation| {
            ConfigError::Validation {
                scope: config_scope,
                path: Some(path.clone()),
                field: violation.field,
                message: violation.message,
            }
        })?;

        match mapping.get_mut(MARKETPLACES_KEY) {
            Some(Value::Sequence(items)) => items.push(value),
            _ => {
                mapping.insert(Value::from(MARKETPLACES_KEY), Value::Sequence(vec![value]));
            }
        }

        write_mapping(&path, config_scope, &mapping)?;
        debug!(name = %entry.name, scope = %scope, path = %path.display(), "added marketplace to config");
        Ok(path)
    }

    /// Remove an entry by name.
    ///
    /// With no scope, Project is tried before Global. Returns the scope and
    /// entry removed, or `None` when no file holds the name.
    pub fn remove_marketplace(
        &self,
        name: &str,
        scope: Option<MarketplaceScope>,
    ) -> ConfigResult<Option<(MarketplaceScope, MarketplaceEntry)>> {
        let scopes = match scope {
            Some(scope) => vec![scope],
            None => REMOVE_ORDER.to_vec(),
        };

        let paths = self.paths();
        for scope in scopes {
            let config_scope = ConfigScope::from(scope);
            let Some(path) = paths.for_scope(config_scope) else {
                continue;
            };
            if let Some(entry) = remove_from_file(path, config_scope, name)? {
                debug!(name = %name, scope = %scope, path = %path.display(), "removed marketplace from config");
                return Ok(Some((scope, entry)));
            }
        }
        Ok(None)
    }

    fn target_path(&self, scope: ConfigScope) -> ConfigResult<PathBuf> {
        paths::target_path(&self.settings, &self.working_dir, scope).ok_or_else(|| {
            ConfigError::Validation {
                scope,
                path: None,
                field: None,
                message: "the effective configuration cannot be written".to_string(),
            }
        })
    }
}

fn remove_from_file(
    path: &Path,
    scope: ConfigScope,
    name: &str,
) -> ConfigResult<Option<MarketplaceEntry>> {
    let Some(document) = load_document(Some(path), scope)? else {
        return Ok(None);
    };
    let Some(entry) = document.marketplaces.into_iter().find(|e| e.name == name) else {
        return Ok(None);
    };

    let mut mapping = read_mapping(path, scope)?;
    if let Some(Value::Sequence(items)) = mapping.get_mut(MARKETPLACES_KEY) {
        items.retain(|item| item.get("name").and_then(Value::as_str) != Some(name));
    }
    write_mapping(path, scope, &mapping)?;
    Ok(Some(entry))
}
