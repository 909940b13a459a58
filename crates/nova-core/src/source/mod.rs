//! Marketplace sources.
//!
//! Raw user input is classified into a [`MarketplaceSource`]:
//! - GitHub shorthand (`owner/repo`)
//! - Git remotes (`https://...`, `git@...`, `git://...`)
//! - Local directories, used in place

pub mod provider;
pub mod resolver;
mod spec;

pub use provider::{FetchedSource, SourceProvider};
pub use resolver::{SourceParseError, parse_source};
pub use spec::MarketplaceSource;
