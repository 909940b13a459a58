//! `marketplace.json` parsing and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::source::MarketplaceSource;

use super::error::{ManifestErrorKind, MarketplaceError, MarketplaceResult};

pub const MANIFEST_FILE: &str = "marketplace.json";

/// Marketplace owner or bundle author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleCategory {
    Development,
}

/// A bundle listed in a marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub name: String,
    pub description: String,
    /// Bundle location, relative to the marketplace root or remote.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<BundleCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<semver::Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Contact>,
}

/// Marketplace manifest. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub owner: Contact,
    pub bundles: Vec<BundleEntry>,
}

/// Summary returned by add, list and get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketplaceInfo {
    pub name: String,
    pub description: String,
    pub source: MarketplaceSource,
    pub bundle_count: usize,
}

impl MarketplaceManifest {
    /// Parse manifest JSON text without touching the filesystem.
    pub fn parse(content: &str) -> Result<Self, (ManifestErrorKind, String)> {
        let value: serde_json::Value = serde_json::from_str(content).map_err(|e| {
            (
                ManifestErrorKind::Malformed,
                format!("Invalid JSON in marketplace.json: {e}"),
            )
        })?;
        let manifest: Self = serde_json::from_value(value).map_err(|e| {
            (
                ManifestErrorKind::Schema,
                format!("Invalid marketplace.json: {e}"),
            )
        })?;
        manifest.validate().map_err(|e| {
            (
                ManifestErrorKind::Schema,
                format!("Invalid marketplace.json: {e}"),
            )
        })?;
        Ok(manifest)
    }

    /// Check constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        non_empty(&self.version, "version")?;
        validate_contact(&self.owner, "owner")?;

        for (index, bundle) in self.bundles.iter().enumerate() {
            let loc = format!("bundles.{index}");
            non_empty(&bundle.name, &format!("{loc}.name"))?;
            non_empty(&bundle.description, &format!("{loc}.description"))?;
            non_empty(&bundle.source, &format!("{loc}.source"))?;
            if let Some(author) = &bundle.author {
                validate_contact(author, &format!("{loc}.author"))?;
            }
        }
        Ok(())
    }

    pub fn to_info(&self, source: MarketplaceSource) -> MarketplaceInfo {
        MarketplaceInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            source,
            bundle_count: self.bundles.len(),
        }
    }
}

/// Read and validate `<dir>/marketplace.json`.
pub fn load_manifest(dir: &Path) -> MarketplaceResult<MarketplaceManifest> {
    let path = dir.join(MANIFEST_FILE);
    let invalid = |kind, message: String| MarketplaceError::InvalidManifest {
        location: dir.to_path_buf(),
        kind,
        message,
    };

    if !path.is_file() {
        return Err(invalid(
            ManifestErrorKind::Missing,
            "marketplace.json not found in repository".to_string(),
        ));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| {
        invalid(
            ManifestErrorKind::Malformed,
            format!("Failed to read marketplace.json: {e}"),
        )
    })?;

    let manifest =
        MarketplaceManifest::parse(&content).map_err(|(kind, message)| invalid(kind, message))?;
    debug!(name = %manifest.name, bundles = manifest.bundles.len(), "marketplace validated");
    Ok(manifest)
}

fn non_empty(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field}: must not be empty"));
    }
    Ok(())
}

/// The name becomes a directory under the data root.
fn validate_name(name: &str) -> Result<(), String> {
    non_empty(name, "name")?;
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(format!("name: '{name}' is not a valid directory name"));
    }
    Ok(())
}

fn validate_contact(contact: &Contact, field: &str) -> Result<(), String> {
    non_empty(&contact.name, &format!("{field}.name"))?;
    if let Some(email) = &contact.email {
        if !is_email(email) {
            return Err(format!("{field}.email: '{email}' is not a valid email address"));
        }
    }
    Ok(())
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = r#"{
        "name": "official",
        "version": "1.0.0",
        "description": "Official bundles",
        "owner": {"name": "Nova Team", "email": "team@example.com"},
        "homepage": "ignored",
        "bundles": [
            {"name": "lint", "description": "Linters", "source": "./bundles/lint",
             "category": "development", "version": "0.2.0",
             "author": {"name": "Ada"}},
            {"name": "fmt", "description": "Formatters", "source": "./bundles/fmt"}
        ]
    }"#;

    fn write_manifest(dir: &Path, content: &str) {
        std::fs::write(dir.join(MANIFEST_FILE), content).unwrap();
    }

    fn kind_of(err: MarketplaceError) -> ManifestErrorKind {
        match err {
            MarketplaceError::InvalidManifest { kind, .. } => kind,
            other => panic!("expected InvalidManifest, got {other:?}"),
        }
    }

    #[test]
    fn loads_valid_manifest() {
        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), VALID);

        let manifest = load_manifest(temp.path()).unwrap();
        assert_eq!(manifest.name, "official");
        assert_eq!(manifest.bundles.len(), 2);
        assert_eq!(
            manifest.bundles[0].version,
            Some(semver::Version::new(0, 2, 0))
        );
        assert_eq!(manifest.bundles[0].category, Some(BundleCategory::Development));

        let info = manifest.to_info(MarketplaceSource::github("acme/official"));
        assert_eq!(info.bundle_count, 2);
        assert_eq!(info.description, "Official bundles");
    }

    #[test]
    fn distinguishes_missing_malformed_and_schema() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            kind_of(load_manifest(temp.path()).unwrap_err()),
            ManifestErrorKind::Missing
        );

        write_manifest(temp.path(), "{ not json");
        assert_eq!(
            kind_of(load_manifest(temp.path()).unwrap_err()),
            ManifestErrorKind::Malformed
        );

        write_manifest(temp.path(), r#"{"name": "x"}"#);
        assert_eq!(
            kind_of(load_manifest(temp.path()).unwrap_err()),
            ManifestErrorKind::Schema
        );
    }

    #[test]
    fn rejects_empty_required_strings() {
        let content = VALID.replace(r#""source": "./bundles/fmt""#, r#""source": "  ""#);
        let (kind, message) = MarketplaceManifest::parse(&content).unwrap_err();
        assert_eq!(kind, ManifestErrorKind::Schema);
        assert!(message.contains("bundles.1.source"), "{message}");
    }

    #[test]
    fn rejects_bad_email_version_and_category() {
        let bad_email = VALID.replace("team@example.com", "not-an-email");
        assert!(MarketplaceManifest::parse(&bad_email).unwrap_err().1.contains("owner.email"));

        let bad_version = VALID.replace(r#""version": "0.2.0""#, r#""version": "two""#);
        assert_eq!(
            MarketplaceManifest::parse(&bad_version).unwrap_err().0,
            ManifestErrorKind::Schema
        );

        let bad_category = VALID.replace("development", "games");
        assert_eq!(
            MarketplaceManifest::parse(&bad_category).unwrap_err().0,
            ManifestErrorKind::Schema
        );
    }

    #[test]
    fn rejects_names_that_escape_storage() {
        for name in ["../evil", "a/b", ".."] {
            let content = VALID.replace(r#""name": "official""#, &format!(r#""name": "{name}""#));
            let (kind, _) = MarketplaceManifest::parse(&content).unwrap_err();
            assert_eq!(kind, ManifestErrorKind::Schema, "{name}");
        }
    }
}
