//! Application settings shared by every component.
//!
//! Frontends build one [`Settings`] value and pass it by reference to the
//! config store, the datastore and the marketplace lifecycle.

use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "nova";
pub const PROJECT_MARKER: &str = ".nova";

/// File names used for each configuration scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFileNames {
    /// Global config file inside the config root.
    pub global_file: String,
    /// Project config file inside the project marker directory.
    pub project_file: String,
    /// User config file inside the project marker directory.
    pub user_file: String,
}

impl Default for ConfigFileNames {
    fn default() -> Self {
        Self {
            global_file: "config.yaml".to_string(),
            project_file: "config.yaml".to_string(),
            user_file: "config.local.yaml".to_string(),
        }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    app_name: String,
    project_marker: String,
    filenames: ConfigFileNames,
    config_root: PathBuf,
    data_root: PathBuf,
}

impl Settings {
    /// Create settings rooted at the platform config and data directories.
    pub fn from_platform() -> anyhow::Result<Self> {
        let home = dirs::home_dir();
        let config_base = dirs::config_dir()
            .or_else(|| home.as_ref().map(|h| h.join(".config")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        let data_base = dirs::data_dir()
            .or_else(|| home.as_ref().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(Self::with_roots(
            config_base.join(APP_NAME),
            data_base.join(APP_NAME),
        ))
    }

    /// Create settings with explicit config and data roots (for testing).
    pub fn with_roots(config_root: impl Into<PathBuf>, data_root: impl Into<PathBuf>) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            project_marker: PROJECT_MARKER.to_string(),
            filenames: ConfigFileNames::default(),
            config_root: config_root.into(),
            data_root: data_root.into(),
        }
    }

    pub fn with_project_marker(mut self, marker: impl Into<String>) -> Self {
        self.project_marker = marker.into();
        self
    }

    pub fn with_filenames(mut self, filenames: ConfigFileNames) -> Self {
        self.filenames = filenames;
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn project_marker(&self) -> &str {
        &self.project_marker
    }

    pub fn filenames(&self) -> &ConfigFileNames {
        &self.filenames
    }

    pub fn config_root(&self) -> &Path {
        &self.config_root
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Candidate path of the global config file (may not exist).
    pub fn global_config_path(&self) -> PathBuf {
        self.config_root.join(&self.filenames.global_file)
    }

    /// Directory holding cloned marketplace content, one subdirectory per
    /// name. Kept apart from the datastore namespaces so a marketplace name
    /// can never shadow a state file.
    pub fn marketplaces_dir(&self) -> PathBuf {
        self.data_root.join("repos")
    }

    pub fn default_log_file(&self) -> PathBuf {
        self.data_root
            .join("logs")
            .join(format!("{}.log", self.app_name))
    }
}
