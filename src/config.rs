//! Configuration loading and parsing for `streamlined-releases.toml` files.
//!
//! Every setting is optional in the file; [`resolver::ConfigResolver`]
//! combines it with explicit overrides and built-in defaults into a
//! [`Config`].
use log::*;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{ReleaseError, Result};

pub mod resolver;

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "streamlined-releases.toml";
/// Branches that get release candidates unless configured otherwise.
pub const DEFAULT_RELEASE_BRANCHES: &[&str] = &["dev", "stg", "main"];
pub const DEFAULT_BUMP_ACTOR_NAME: &str = "github-actions[bot]";
pub const DEFAULT_BUMP_ACTOR_EMAIL: &str =
    "41898282+github-actions[bot]@users.noreply.github.com";
pub const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG.md";
pub const DEFAULT_MANIFEST_FILES: &[&str] = &["pyproject.toml"];

/// Identity that authors version bump commits. Pushes made by this actor
/// never trigger another release candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpActor {
    pub name: String,
    pub email: String,
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub release_branches: Vec<String>,
    pub bump_actor: BumpActor,
    /// Changelog file, relative to the workspace.
    pub changelog_path: PathBuf,
    /// Files the version command rewrites, relative to the workspace.
    pub manifest_files: Vec<String>,
    pub changelog_tool: String,
    pub version_command: Vec<String>,
    pub remote: String,
}

impl Config {
    /// Whether pushes to `name` sync a release candidate.
    pub fn is_release_branch(&self, name: &str) -> bool {
        self.release_branches.iter().any(|b| b == name)
    }
}

/// `[bump_actor]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)] // Use default for missing fields
pub struct BumpActorConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Raw contents of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)] // Use default for missing fields
pub struct FileConfig {
    pub release_branches: Option<Vec<String>>,
    pub bump_actor: BumpActorConfig,
    pub changelog_path: Option<PathBuf>,
    pub manifest_files: Option<Vec<String>>,
    pub changelog_tool: Option<String>,
    pub version_command: Option<Vec<String>>,
    pub remote: Option<String>,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the config file.
    ///
    /// An explicitly given path must exist. Otherwise the default file in
    /// `workspace` is used when present, and an empty config when not.
    pub fn load(workspace: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = workspace.join(DEFAULT_CONFIG_FILE);
                if !default_path.exists() {
                    debug!(
                        "no {DEFAULT_CONFIG_FILE} found: using defaults"
                    );
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&path).map_err(|err| {
            ReleaseError::invalid_config(format!(
                "failed to read config file {}: {err}",
                path.display()
            ))
        })?;

        info!("loading configuration from {}", path.display());

        Self::parse(&content)
    }
}
