//! Install bookkeeping for fetched marketplaces, keyed by name.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datastore::{DataStoreError, FileDataStore};
use crate::settings::Settings;
use crate::source::MarketplaceSource;

use super::error::{MarketplaceError, MarketplaceResult};

pub const STATE_NAMESPACE: &str = "marketplaces";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceState {
    pub name: String,
    pub source: MarketplaceSource,
    /// Absolute path of the marketplace content.
    pub install_location: PathBuf,
    pub last_updated: DateTime<Utc>,
}

impl MarketplaceState {
    pub fn new(name: impl Into<String>, source: MarketplaceSource, install_location: PathBuf) -> Self {
        Self {
            name: name.into(),
            source,
            install_location,
            last_updated: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketplaceStateStore {
    store: FileDataStore,
}

impl MarketplaceStateStore {
    pub fn new(settings: &Settings) -> Self {
        Self {
            store: FileDataStore::new(STATE_NAMESPACE, settings.data_root()),
        }
    }

    pub fn save(&self, state: &MarketplaceState) -> MarketplaceResult<()> {
        let value = serde_json::to_value(state).map_err(|e| state_error(&state.name, e))?;
        self.store
            .save(&state.name, value)
            .map_err(|e| state_error(&state.name, e))
    }

    /// `Ok(None)` when no record exists for `name`.
    pub fn load(&self, name: &str) -> MarketplaceResult<Option<MarketplaceState>> {
        match self.store.load(name) {
            Ok(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| state_error(name, e)),
            Err(DataStoreError::KeyNotFound { .. }) => Ok(None),
            Err(err) => Err(state_error(name, err)),
        }
    }

    pub fn delete(&self, name: &str) -> MarketplaceResult<()> {
        self.store.delete(name).map_err(|e| state_error(name, e))
    }
}

fn state_error(name: &str, err: impl std::fmt::Display) -> MarketplaceError {
    MarketplaceError::State {
        name: name.to_string(),
        message: err.to_string(),
    }
}
