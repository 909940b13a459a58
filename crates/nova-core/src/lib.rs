//! Nova Core Library
//!
//! Resolves the layered configuration (global, project, user and
//! environment overrides) and manages the registry of marketplaces that
//! bundles are installed from.

pub mod config;
pub mod datastore;
pub mod git;
pub mod marketplace;
pub mod settings;
pub mod source;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigDocument, ConfigError, ConfigStore, EffectiveConfig, LogFormat, LogLevel,
        LoggingConfig, MarketplaceEntry,
    };

    // Marketplace
    pub use crate::marketplace::{
        Marketplace, MarketplaceError, MarketplaceInfo, MarketplaceManifest, MarketplaceState,
    };

    // Sources
    pub use crate::source::{MarketplaceSource, parse_source};

    // Git
    pub use crate::git::{GitCli, GitCloner};

    // Shared
    pub use crate::settings::Settings;
    pub use crate::types::{ConfigScope, MarketplaceScope};
}
