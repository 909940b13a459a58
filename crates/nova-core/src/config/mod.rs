//! Configuration management for different scopes
//!
//! Supports three configuration scopes, merged in precedence order:
//! - Global: `<config dir>/nova/config.yaml`
//! - Project: `<project root>/.nova/config.yaml`, shared with the team
//! - User: `<project root>/.nova/config.local.yaml`, per-user overrides
//!
//! Environment variables prefixed `NOVA_CONFIG__` are applied last.

pub mod env;
pub mod error;
pub mod loader;
pub mod merge;
pub mod paths;
pub mod schema;
pub mod store;

pub use env::{ENV_PREFIX, apply_env_overrides, apply_env_overrides_from};
pub use error::{ConfigError, ConfigResult};
pub use loader::load_document;
pub use merge::{deep_merge, merge_configs, merge_marketplaces};
pub use paths::{ConfigPaths, discover, find_project_root};
pub use schema::{
    ConfigDocument, EffectiveConfig, LogFormat, LogLevel, LoggingConfig, MarketplaceEntry,
};
pub use store::ConfigStore;
