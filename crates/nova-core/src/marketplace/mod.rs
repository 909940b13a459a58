//! Marketplace registry: named sources of installable bundles.
//!
//! A marketplace is registered in a config scope, its content is fetched
//! into the data root (remote sources) or used in place (local sources),
//! and install bookkeeping is kept in the `marketplaces` datastore
//! namespace.

pub mod error;
pub mod lifecycle;
pub mod manifest;
pub mod state;

pub use error::{ManifestErrorKind, MarketplaceError, MarketplaceResult};
pub use lifecycle::Marketplace;
pub use manifest::{
    BundleCategory, BundleEntry, Contact, MANIFEST_FILE, MarketplaceInfo, MarketplaceManifest,
    load_manifest,
};
pub use state::{MarketplaceState, MarketplaceStateStore};
