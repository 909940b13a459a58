//! Marketplace source descriptor types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where a marketplace's content originates.
///
/// Serialized with a `type` tag, matching the `source` mapping stored in
/// config files: `{type: github, repo: owner/repo}`, `{type: git, url: ...}`
/// or `{type: local, path: ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MarketplaceSource {
    /// GitHub shorthand (`owner/repo`)
    Github { repo: String },
    /// Any git remote (https, ssh or git protocol)
    Git { url: String },
    /// Directory on the local filesystem, used in place
    Local { path: PathBuf },
}

impl MarketplaceSource {
    pub fn github(repo: impl Into<String>) -> Self {
        Self::Github { repo: repo.into() }
    }

    pub fn git(url: impl Into<String>) -> Self {
        Self::Git { url: url.into() }
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local { path: path.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Github { .. } => "github",
            Self::Git { .. } => "git",
            Self::Local { .. } => "local",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }

    pub fn is_remote(&self) -> bool {
        !self.is_local()
    }

    /// URL handed to the clone capability; `None` for local sources.
    pub fn clone_url(&self) -> Option<String> {
        match self {
            Self::Github { repo } => Some(format!("https://github.com/{repo}.git")),
            Self::Git { url } => Some(url.clone()),
            Self::Local { .. } => None,
        }
    }

    pub fn as_local_path(&self) -> Option<&Path> {
        match self {
            Self::Local { path } => Some(path),
            _ => None,
        }
    }

    /// Short human-readable identifier (repo, url or path).
    pub fn display_name(&self) -> String {
        match self {
            Self::Github { repo } => repo.clone(),
            Self::Git { url } => url.clone(),
            Self::Local { path } => path.display().to_string(),
        }
    }
}

impl fmt::Display for MarketplaceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.kind())
    }
}
