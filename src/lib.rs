//! Release-candidate pull requests and tagged releases driven by CI events.
//!
//! A push to a release branch opens (or refreshes) an `rc/{version}-{base}`
//! pull request carrying the version bump and changelog; merging that pull
//! request publishes the tagged release.
pub mod branch;
pub mod bumper;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod forge;
pub mod handler;
pub mod manifest;
pub mod orchestrator;
pub mod outputs;
pub mod process;
pub mod rc_branch;
pub mod repo;
pub mod router;

pub use cli::Args;
pub use error::{ReleaseError, Result};
pub use orchestrator::execute;

#[cfg(test)]
pub mod test_helpers;
