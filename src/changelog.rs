//! Changelog and next-version generation.

/// git-cliff process wrapper.
pub mod git_cliff;

/// [`traits::Changelog`] trait and rendering options.
pub mod traits;
