//! Per-source-type fetch, storage and cleanup behaviour.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::git::GitCloner;
use crate::marketplace::MarketplaceError;

use super::spec::MarketplaceSource;

const TEMP_PREFIX: &str = "nova-marketplace";

/// Content made available by [`SourceProvider::fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSource {
    pub root: PathBuf,
    /// Whether `root` is a scratch directory owned by this fetch.
    pub temporary: bool,
}

impl FetchedSource {
    /// Best-effort removal of a scratch directory. Never fails.
    pub fn discard(&self) {
        if !self.temporary || !self.root.exists() {
            return;
        }
        if let Err(err) = fs::remove_dir_all(&self.root) {
            warn!(path = %self.root.display(), error = %err, "failed to remove temporary marketplace directory");
        }
    }
}

pub trait SourceProvider {
    /// Make the source content available on the local filesystem.
    fn fetch(
        &self,
        cloner: &dyn GitCloner,
        temp_root: &Path,
    ) -> Result<FetchedSource, MarketplaceError>;

    /// Move fetched content to its permanent location and return it.
    fn move_to_storage(
        &self,
        fetched: &FetchedSource,
        marketplaces_dir: &Path,
        name: &str,
    ) -> Result<PathBuf, MarketplaceError>;

    /// Delete content owned by the marketplace store.
    fn cleanup_on_removal(&self, install_location: &Path) -> Result<(), MarketplaceError>;
}

impl SourceProvider for MarketplaceSource {
    fn fetch(
        &self,
        cloner: &dyn GitCloner,
        temp_root: &Path,
    ) -> Result<FetchedSource, MarketplaceError> {
        let Some(url) = self.clone_url() else {
            let root = self.as_local_path().map(Path::to_path_buf).unwrap_or_default();
            return Ok(FetchedSource {
                root,
                temporary: false,
            });
        };

        let destination = temp_root.join(format!("{TEMP_PREFIX}-{}", Uuid::new_v4()));
        debug!(source = %self, destination = %destination.display(), "fetching marketplace");
        let root = cloner
            .clone_repo(&url, &destination)
            .map_err(|err| MarketplaceError::Fetch {
                origin: self.display_name(),
                message: err.to_string(),
            })?;

        Ok(FetchedSource {
            root,
            temporary: true,
        })
    }

    fn move_to_storage(
        &self,
        fetched: &FetchedSource,
        marketplaces_dir: &Path,
        name: &str,
    ) -> Result<PathBuf, MarketplaceError> {
        if self.is_local() {
            return Ok(fetched.root.clone());
        }

        let target = marketplaces_dir.join(name);
        fs::create_dir_all(marketplaces_dir)
            .map_err(|e| MarketplaceError::storage(marketplaces_dir, e))?;
        if target.exists() {
            debug!(path = %target.display(), "replacing stale marketplace directory");
            fs::remove_dir_all(&target).map_err(|e| MarketplaceError::storage(&target, e))?;
        }

        if fs::rename(&fetched.root, &target).is_err() {
            copy_dir_recursive(&fetched.root, &target)
                .map_err(|e| MarketplaceError::storage(&target, e))?;
            fetched.discard();
        }

        debug!(name = %name, path = %target.display(), "marketplace moved to storage");
        Ok(target)
    }

    fn cleanup_on_removal(&self, install_location: &Path) -> Result<(), MarketplaceError> {
        if self.is_local() || !install_location.exists() {
            return Ok(());
        }
        fs::remove_dir_all(install_location)
            .map_err(|e| MarketplaceError::storage(install_location, e))?;
        debug!(path = %install_location.display(), "removed marketplace directory");
        Ok(())
    }
}

/// Copy a directory tree, used when a rename crosses filesystems.
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&from, &to)?;
        } else {
            fs::copy(&from, &to)?;
        }
    }
    Ok(())
}
