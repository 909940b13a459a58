//! Add, remove, list and get pipelines.
//!
//! Every step short-circuits on the first error. The pipelines are not
//! transactional: an add can leave install state without a config entry,
//! and a remove can drop the config entry but keep files or state. Retrying
//! either operation converges.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{ConfigStore, MarketplaceEntry};
use crate::git::{GitCli, GitCloner};
use crate::settings::Settings;
use crate::source::{MarketplaceSource, SourceProvider, parse_source};
use crate::types::MarketplaceScope;

use super::error::{MarketplaceError, MarketplaceResult};
use super::manifest::{MarketplaceInfo, load_manifest};
use super::state::{MarketplaceState, MarketplaceStateStore};

/// Marketplace registry bound to one settings value and working directory.
pub struct Marketplace {
    config: ConfigStore,
    state: MarketplaceStateStore,
    marketplaces_dir: PathBuf,
    temp_root: PathBuf,
    working_dir: PathBuf,
    cloner: Box<dyn GitCloner>,
}

impl Marketplace {
    pub fn new(settings: &Settings, working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            config: ConfigStore::new(settings, working_dir.clone()),
            state: MarketplaceStateStore::new(settings),
            marketplaces_dir: settings.marketplaces_dir(),
            temp_root: std::env::temp_dir(),
            working_dir,
            cloner: Box::new(GitCli::new()),
        }
    }

    pub fn with_cloner(mut self, cloner: impl GitCloner + 'static) -> Self {
        self.cloner = Box::new(cloner);
        self
    }

    /// Directory that receives temporary clones.
    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Register a new marketplace from raw source input.
    pub fn add(&self, raw: &str, scope: MarketplaceScope) -> MarketplaceResult<MarketplaceInfo> {
        let source = parse_source(raw, Some(&self.working_dir))?;
        debug!(source = %source, scope = %scope, "adding marketplace");

        let fetched = source.fetch(self.cloner.as_ref(), &self.temp_root)?;

        let manifest = load_manifest(&fetched.root).inspect_err(|_| fetched.discard())?;

        let conflict = self
            .config
            .find_conflict(&manifest.name, &source)
            .inspect_err(|_| fetched.discard())?;
        if let Some(existing) = conflict {
            fetched.discard();
            return Err(MarketplaceError::AlreadyExists {
                name: manifest.name,
                existing_name: existing.name,
                existing_source: existing.source,
            });
        }

        let install_location =
            source.move_to_storage(&fetched, &self.marketplaces_dir, &manifest.name)?;

        self.state.save(&MarketplaceState::new(
            manifest.name.clone(),
            source.clone(),
            install_location,
        ))?;

        self.config
            .add_marketplace(&MarketplaceEntry::new(manifest.name.clone(), source.clone()), scope)?;

        debug!(name = %manifest.name, bundles = manifest.bundles.len(), "marketplace added");
        Ok(manifest.to_info(source))
    }

    /// Remove a marketplace by name or by the source it was added from.
    ///
    /// Returns the removed name. Missing install state is not an error.
    pub fn remove(
        &self,
        name_or_source: &str,
        scope: Option<MarketplaceScope>,
    ) -> MarketplaceResult<String> {
        let name = self.resolve_name(name_or_source)?;

        let Some((removed_from, entry)) = self.config.remove_marketplace(&name, scope)? else {
            let reason = match scope {
                Some(scope) => format!("no entry named '{name}' in {scope} config"),
                None => format!("no entry named '{name}' in project or global config"),
            };
            return Err(MarketplaceError::not_found(name_or_source, reason));
        };
        debug!(name = %entry.name, scope = %removed_from, "removed config entry");

        match self.state.load(&name)? {
            Some(state) => {
                state.source.cleanup_on_removal(&state.install_location)?;
                self.state.delete(&name)?;
            }
            None => debug!(name = %name, "no install state to clean up"),
        }

        Ok(name)
    }

    /// Installed marketplaces. Entries without state or a readable manifest
    /// are skipped.
    pub fn list(&self) -> MarketplaceResult<Vec<MarketplaceInfo>> {
        let entries = self.config.marketplaces()?;
        let mut infos = Vec::with_capacity(entries.len());
        for entry in &entries {
            match self.resolve_info(entry) {
                Ok(info) => infos.push(info),
                Err(err) => warn!(name = %entry.name, error = %err, "skipping marketplace"),
            }
        }
        Ok(infos)
    }

    /// A single marketplace. Config errors surface as is; any failure to
    /// resolve the entry itself is reported as not found.
    pub fn get(&self, name: &str) -> MarketplaceResult<MarketplaceInfo> {
        let entries = self.config.marketplaces()?;
        let entry = entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| MarketplaceError::not_found(name, "not configured in any scope"))?;

        self.resolve_info(entry).map_err(|err| match err {
            MarketplaceError::NotFound { .. } => err,
            other => MarketplaceError::not_found(name, other.to_string()),
        })
    }

    fn resolve_info(&self, entry: &MarketplaceEntry) -> MarketplaceResult<MarketplaceInfo> {
        let state = self
            .state
            .load(&entry.name)?
            .ok_or_else(|| MarketplaceError::not_found(&entry.name, "no install state"))?;
        let manifest = load_manifest(&state.install_location)?;
        Ok(manifest.to_info(entry.source.clone()))
    }

    /// Input that parses as a source resolves to the configured entry with
    /// that source; anything else is taken as a name.
    fn resolve_name(&self, input: &str) -> MarketplaceResult<String> {
        let literal = input.trim().to_string();
        let Ok(source) = parse_source(input, Some(&self.working_dir)) else {
            return Ok(literal);
        };
        Ok(self
            .find_by_source(&source)?
            .map(|entry| entry.name)
            .unwrap_or(literal))
    }

    fn find_by_source(&self, source: &MarketplaceSource) -> MarketplaceResult<Option<MarketplaceEntry>> {
        Ok(self
            .config
            .marketplaces()?
            .into_iter()
            .find(|entry| &entry.source == source))
    }
}
