//! Classifies raw user input into a [`MarketplaceSource`].

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use url::Url;

use super::spec::MarketplaceSource;

/// Raw input could not be turned into a marketplace source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid marketplace source '{input}': {message}")]
pub struct SourceParseError {
    /// The untrimmed input, kept verbatim for diagnostics
    pub input: String,
    pub message: String,
}

impl SourceParseError {
    fn new(input: &str, message: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            message: message.into(),
        }
    }
}

/// Parse a raw source string.
///
/// Classification is ordered and the first match wins:
/// 1. `owner/repo` -> GitHub
/// 2. `git@...`, `git://...`, `*.git` or an http(s) URL with a host -> git
/// 3. anything else -> local directory, resolved against `working_dir`
///    (the process working directory when `None`)
pub fn parse_source(
    raw: &str,
    working_dir: Option<&Path>,
) -> Result<MarketplaceSource, SourceParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(SourceParseError::new(
            raw,
            "Marketplace source cannot be empty.",
        ));
    }

    if is_github_repo(value) {
        return Ok(MarketplaceSource::github(value));
    }

    if looks_like_git(value) {
        if !is_valid_git_url(value) {
            return Err(SourceParseError::new(
                raw,
                "git repository URL must start with http://, https://, git@ or git://",
            ));
        }
        return Ok(MarketplaceSource::git(value));
    }

    let base_dir = resolve_base_dir(working_dir)
        .map_err(|e| SourceParseError::new(raw, format!("cannot resolve working directory: {e}")))?;
    resolve_local(raw, value, &base_dir)
}

/// `owner/repo`: both halves non-empty, `[A-Za-z0-9_-]` owner and
/// `[A-Za-z0-9_.-]` repository name.
pub fn is_github_repo(value: &str) -> bool {
    let Some((owner, repo)) = value.split_once('/') else {
        return false;
    };
    let owner_ok = !owner.is_empty()
        && owner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    let repo_ok = !repo.is_empty()
        && repo
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    owner_ok && repo_ok
}

/// Accepted prefixes for a stored git URL.
pub fn is_valid_git_url(value: &str) -> bool {
    ["http://", "https://", "git@", "git://"]
        .iter()
        .any(|prefix| value.starts_with(prefix))
}

fn looks_like_git(value: &str) -> bool {
    if value.starts_with("git@") || value.starts_with("git://") || value.ends_with(".git") {
        return true;
    }
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

fn resolve_base_dir(working_dir: Option<&Path>) -> std::io::Result<PathBuf> {
    let base = match working_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let base = if base.is_file() {
        base.parent().map(Path::to_path_buf).unwrap_or(base)
    } else {
        base
    };
    Ok(std::fs::canonicalize(&base).unwrap_or(base))
}

fn resolve_local(
    raw: &str,
    value: &str,
    base_dir: &Path,
) -> Result<MarketplaceSource, SourceParseError> {
    let expanded = expand_tilde(value, dirs::home_dir().as_deref());
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    };

    let resolved = std::fs::canonicalize(&joined).unwrap_or_else(|_| normalize(&joined));
    if !resolved.exists() {
        return Err(SourceParseError::new(
            raw,
            format!("local marketplace path does not exist: {}", resolved.display()),
        ));
    }
    if !resolved.is_dir() {
        return Err(SourceParseError::new(
            raw,
            format!("local marketplace path is not a directory: {}", resolved.display()),
        ));
    }

    Ok(MarketplaceSource::local(resolved))
}

/// Expand a leading `~` against `home`.
pub(crate) fn expand_tilde(value: &str, home: Option<&Path>) -> PathBuf {
    match (value, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (v, Some(home)) if v.starts_with("~/") => home.join(&v[2..]),
        (v, _) => PathBuf::from(v),
    }
}

/// Lexically remove `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rejects_empty_and_whitespace() {
        let err = parse_source("", None).unwrap_err();
        assert_eq!(err.input, "");

        let err = parse_source("   ", None).unwrap_err();
        assert_eq!(err.input, "   ");
        assert!(err.message.contains("empty"));
    }

    #[test]
    fn owner_repo_is_always_github() {
        let source = parse_source("owner/repo", None).unwrap();
        assert_eq!(source, MarketplaceSource::github("owner/repo"));

        let source = parse_source("  my-org/my.repo_1  ", None).unwrap();
        assert_eq!(source, MarketplaceSource::github("my-org/my.repo_1"));
    }

    #[test]
    fn github_shorthand_wins_over_local_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("owner").join("repo")).unwrap();

        let source = parse_source("owner/repo", Some(temp.path())).unwrap();
        assert!(matches!(source, MarketplaceSource::Github { .. }));
    }

    #[test]
    fn detects_git_urls() {
        for url in [
            "https://github.com/owner/repo",
            "https://git.example.com/team/bundles.git",
            "git@github.com:owner/repo.git",
            "git://example.com/repo",
            "http://localhost:8080/repo",
        ] {
            let source = parse_source(url, None).unwrap();
            assert_eq!(source, MarketplaceSource::git(url), "{url}");
        }
    }

    #[test]
    fn dot_git_suffix_without_scheme_is_rejected_not_local() {
        let err = parse_source("repo.git", None).unwrap_err();
        assert_eq!(err.input, "repo.git");
        assert!(err.message.contains("git repository URL"));
    }

    #[test]
    fn resolves_relative_local_path_against_working_dir() {
        let temp = TempDir::new().unwrap();
        let market = temp.path().join("marketplace");
        std::fs::create_dir(&market).unwrap();

        let source = parse_source("./marketplace", Some(temp.path())).unwrap();
        let expected = std::fs::canonicalize(&market).unwrap();
        assert_eq!(source, MarketplaceSource::local(expected));
    }

    #[test]
    fn resolves_absolute_local_path() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().display().to_string();

        let source = parse_source(&input, None).unwrap();
        assert_eq!(
            source,
            MarketplaceSource::local(std::fs::canonicalize(temp.path()).unwrap())
        );
    }

    #[test]
    fn rejects_missing_local_path() {
        let err = parse_source("/nonexistent/nova/marketplace", None).unwrap_err();
        assert!(err.message.contains("does not exist"));
    }

    #[test]
    fn rejects_local_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("marketplace.json");
        std::fs::write(&file, "{}").unwrap();

        let err = parse_source(&file.display().to_string(), None).unwrap_err();
        assert!(err.message.contains("not a directory"));
    }

    #[test]
    fn preserves_untrimmed_input_in_error() {
        let err = parse_source("  ./does-not-exist  ", Some(Path::new("/"))).unwrap_err();
        assert_eq!(err.input, "  ./does-not-exist  ");
    }

    #[test]
    fn expands_tilde_against_home() {
        let home = Path::new("/home/tester");
        assert_eq!(expand_tilde("~", Some(home)), PathBuf::from("/home/tester"));
        assert_eq!(
            expand_tilde("~/markets/a", Some(home)),
            PathBuf::from("/home/tester/markets/a")
        );
        assert_eq!(expand_tilde("~/x", None), PathBuf::from("~/x"));
    }

    #[test]
    fn github_pattern_edges() {
        assert!(is_github_repo("a/b"));
        assert!(!is_github_repo("a/b/c"));
        assert!(!is_github_repo("/b"));
        assert!(!is_github_repo("a/"));
        assert!(!is_github_repo("a.b/c"));
    }
}
