//! Interface to the hosting platform (GitHub).
//!
//! Provides token-based authentication, release management, pull request
//! operations and commit queries through a common trait.

/// Configuration and authentication for the hosting platform.
pub mod config;

/// GitHub API client implementation.
pub mod github;

/// Wrapper shared by every component of one invocation.
pub mod manager;

/// Request and response types.
pub mod request;

/// Common traits for forge platform abstraction.
pub mod traits;
