//! Shared core types used across configuration and marketplace layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Configuration scope levels.
///
/// Precedence when merging is `User > Project > Global`; `Effective` names
/// the merged result and is never backed by a file of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigScope {
    /// User-wide configuration under the platform config directory.
    Global,
    /// Project configuration, shared (checked into version control).
    Project,
    /// Per-user overrides inside the project marker directory.
    User,
    /// The merged view of all scopes plus environment overrides.
    Effective,
}

impl ConfigScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Project => "project",
            Self::User => "user",
            Self::Effective => "effective",
        }
    }
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scopes a marketplace entry may be written to.
///
/// User files are read-only from the marketplace's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketplaceScope {
    Global,
    Project,
}

impl MarketplaceScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Project => "project",
        }
    }
}

impl From<MarketplaceScope> for ConfigScope {
    fn from(scope: MarketplaceScope) -> Self {
        match scope {
            MarketplaceScope::Global => ConfigScope::Global,
            MarketplaceScope::Project => ConfigScope::Project,
        }
    }
}

impl fmt::Display for MarketplaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketplaceScope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "project" => Ok(Self::Project),
            other => Err(format!(
                "Unknown marketplace scope: {other}. Use 'global' or 'project'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marketplace_scope_parses_case_insensitively() {
        assert_eq!(
            "GLOBAL".parse::<MarketplaceScope>().unwrap(),
            MarketplaceScope::Global
        );
        assert_eq!(
            "project".parse::<MarketplaceScope>().unwrap(),
            MarketplaceScope::Project
        );
        assert!("user".parse::<MarketplaceScope>().is_err());
    }

    #[test]
    fn marketplace_scope_maps_to_config_scope() {
        assert_eq!(ConfigScope::from(MarketplaceScope::Global), ConfigScope::Global);
        assert_eq!(
            ConfigScope::from(MarketplaceScope::Project),
            ConfigScope::Project
        );
    }
}
