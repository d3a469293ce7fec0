//! Handlers that carry out a routed [`crate::router::Decision`].

/// Promotes a merged release candidate into a tagged release.
pub mod merge;

/// Keeps the release-candidate pull request of a base branch in sync.
pub mod push;

pub use merge::{MergeHandler, MergeOutcome};
pub use push::{PushHandler, PushOutcome};
