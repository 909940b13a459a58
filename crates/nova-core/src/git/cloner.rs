//! Shallow clone capability used to fetch remote marketplaces.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CloneError {
    #[error("git executable not found; install git to fetch remote marketplaces")]
    GitUnavailable,

    #[error("clone destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("git clone of {url} failed: {stderr}")]
    Failed { url: String, stderr: String },

    #[error("I/O error preparing clone: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can materialize a repository at a local path.
pub trait GitCloner {
    /// Clone `url` into `destination`, which must not exist yet.
    fn clone_repo(&self, url: &str, destination: &Path) -> Result<PathBuf, CloneError>;
}

/// Shallow clones (`--depth 1`) by shelling out to the `git` executable.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }
}

impl GitCloner for GitCli {
    fn clone_repo(&self, url: &str, destination: &Path) -> Result<PathBuf, CloneError> {
        if destination.exists() {
            return Err(CloneError::DestinationExists(destination.to_path_buf()));
        }
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut cmd = Command::new("git");
        cmd.args(["clone", "--depth", "1"])
            .arg(url)
            .arg(destination)
            .env("GIT_TERMINAL_PROMPT", "0");

        debug!(url = %url, destination = %destination.display(), "cloning repository");
        let output = cmd.output().map_err(|err| match err.kind() {
            ErrorKind::NotFound => CloneError::GitUnavailable,
            _ => CloneError::Io(err),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CloneError::Failed {
                url: url.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(destination.to_path_buf())
    }
}
