//! Config path discovery.
//!
//! Nothing here is cached: every call re-reads the filesystem so external
//! edits are observed.

use std::path::{Path, PathBuf};

use crate::settings::Settings;
use crate::types::ConfigScope;

/// Existing config files for each scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPaths {
    pub global_path: Option<PathBuf>,
    pub project_path: Option<PathBuf>,
    pub user_path: Option<PathBuf>,
    /// Nearest ancestor holding the project marker directory.
    pub project_root: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn for_scope(&self, scope: ConfigScope) -> Option<&Path> {
        match scope {
            ConfigScope::Global => self.global_path.as_deref(),
            ConfigScope::Project => self.project_path.as_deref(),
            ConfigScope::User => self.user_path.as_deref(),
            ConfigScope::Effective => None,
        }
    }
}

/// Locate the config files visible from `working_dir`.
pub fn discover(settings: &Settings, working_dir: &Path) -> ConfigPaths {
    let global_path = Some(settings.global_config_path()).filter(|p| p.is_file());
    let project_root = find_project_root(working_dir, settings.project_marker());

    let (project_path, user_path) = match &project_root {
        Some(root) => {
            let marker = root.join(settings.project_marker());
            let filenames = settings.filenames();
            (
                Some(marker.join(&filenames.project_file)).filter(|p| p.is_file()),
                Some(marker.join(&filenames.user_file)).filter(|p| p.is_file()),
            )
        }
        None => (None, None),
    };

    ConfigPaths {
        global_path,
        project_path,
        user_path,
        project_root,
    }
}

/// Walk up from `working_dir` (inclusive) to the first directory containing
/// a `marker` subdirectory.
pub fn find_project_root(working_dir: &Path, marker: &str) -> Option<PathBuf> {
    let start = normalize_start(working_dir);
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

/// File a write to `scope` should target, whether or not it exists yet.
///
/// Project and user files fall back to `working_dir` when no project root
/// exists. `Effective` has no backing file.
pub fn target_path(settings: &Settings, working_dir: &Path, scope: ConfigScope) -> Option<PathBuf> {
    let filenames = settings.filenames();
    let marker_dir = || {
        find_project_root(working_dir, settings.project_marker())
            .unwrap_or_else(|| normalize_start(working_dir))
            .join(settings.project_marker())
    };

    match scope {
        ConfigScope::Global => Some(settings.global_config_path()),
        ConfigScope::Project => Some(marker_dir().join(&filenames.project_file)),
        ConfigScope::User => Some(marker_dir().join(&filenames.user_file)),
        ConfigScope::Effective => None,
    }
}

fn normalize_start(working_dir: &Path) -> PathBuf {
    let start = if working_dir.is_file() {
        working_dir.parent().unwrap_or(working_dir)
    } else {
        working_dir
    };
    std::fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(temp: &TempDir) -> Settings {
        Settings::with_roots(temp.path().join("config"), temp.path().join("data"))
    }

    #[test]
    fn finds_marker_in_ancestor() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("repo");
        let nested = root.join("src").join("deep");
        std::fs::create_dir_all(root.join(".nova")).unwrap();
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_project_root(&nested, ".nova").unwrap();
        assert_eq!(found, std::fs::canonicalize(&root).unwrap());
    }

    #[test]
    fn marker_must_be_a_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".nova"), "not a dir").unwrap();

        let canonical = std::fs::canonicalize(temp.path()).unwrap();
        assert_ne!(find_project_root(temp.path(), ".nova"), Some(canonical));
    }

    #[test]
    fn file_working_dir_starts_from_parent() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".nova")).unwrap();
        let file = temp.path().join("notes.txt");
        std::fs::write(&file, "").unwrap();

        assert_eq!(
            find_project_root(&file, ".nova"),
            Some(std::fs::canonicalize(temp.path()).unwrap())
        );
    }

    #[test]
    fn discover_checks_each_file_independently() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let project = temp.path().join("project");
        std::fs::create_dir_all(project.join(".nova")).unwrap();
        std::fs::write(project.join(".nova").join("config.local.yaml"), "a: 1").unwrap();

        let paths = discover(&settings, &project);
        assert_eq!(paths.global_path, None);
        assert_eq!(paths.project_path, None);
        assert_eq!(
            paths.user_path,
            Some(
                std::fs::canonicalize(&project)
                    .unwrap()
                    .join(".nova")
                    .join("config.local.yaml")
            )
        );
    }

    #[test]
    fn discover_observes_new_files() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        assert_eq!(discover(&settings, temp.path()).global_path, None);

        std::fs::create_dir_all(settings.config_root()).unwrap();
        std::fs::write(settings.global_config_path(), "{}").unwrap();
        assert_eq!(
            discover(&settings, temp.path()).global_path,
            Some(settings.global_config_path())
        );
    }

    #[test]
    fn project_target_falls_back_to_working_dir() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);

        let target = target_path(&settings, temp.path(), ConfigScope::Project).unwrap();
        assert_eq!(
            target,
            std::fs::canonicalize(temp.path())
                .unwrap()
                .join(".nova")
                .join("config.yaml")
        );
        assert_eq!(target_path(&settings, temp.path(), ConfigScope::Effective), None);
    }
}
