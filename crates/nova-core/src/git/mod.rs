//! Git operations for fetching remote marketplaces.
//!
//! Cloning goes through the [`GitCloner`] trait so callers can substitute
//! their own implementation; [`GitCli`] shells out to `git clone`.

mod cloner;

pub use cloner::{CloneError, GitCli, GitCloner};
