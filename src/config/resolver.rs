//! Configuration resolver using builder pattern.
//!
//! ## Resolution Precedence (highest to lowest)
//!
//! 1. Explicit CLI / action input values
//! 2. Values from the config file
//! 3. Built-in defaults

use derive_builder::Builder;
use std::path::PathBuf;

use crate::{
    changelog::git_cliff::DEFAULT_CHANGELOG_TOOL,
    cli::ExplicitOverrides,
    config::{
        BumpActor, Config, DEFAULT_BUMP_ACTOR_EMAIL, DEFAULT_BUMP_ACTOR_NAME,
        DEFAULT_CHANGELOG_PATH, DEFAULT_MANIFEST_FILES,
        DEFAULT_RELEASE_BRANCHES, FileConfig,
    },
    error::{ReleaseError, Result},
    manifest::DEFAULT_VERSION_COMMAND,
    repo::DEFAULT_REMOTE,
};

/// Resolves configuration by combining file values with explicit overrides.
#[derive(Builder)]
#[builder(setter(into))]
pub struct ConfigResolver {
    file_config: FileConfig,
    overrides: ExplicitOverrides,
}

impl ConfigResolver {
    /// Resolves the configuration and returns the fully resolved Config.
    pub fn resolve(&self) -> Result<Config> {
        let file = &self.file_config;
        let explicit = &self.overrides;

        let release_branches = Self::resolve_list(
            explicit.release_branches.as_ref(),
            file.release_branches.as_ref(),
            DEFAULT_RELEASE_BRANCHES,
        );

        if release_branches.is_empty() {
            return Err(ReleaseError::invalid_config(
                "release_branches must name at least one branch",
            ));
        }

        let bump_actor = BumpActor {
            name: Self::resolve_value(
                explicit.bump_actor_name.as_ref(),
                file.bump_actor.name.as_ref(),
                DEFAULT_BUMP_ACTOR_NAME,
            ),
            email: Self::resolve_value(
                explicit.bump_actor_email.as_ref(),
                file.bump_actor.email.as_ref(),
                DEFAULT_BUMP_ACTOR_EMAIL,
            ),
        };

        let changelog_path = explicit
            .changelog_path
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| file.changelog_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CHANGELOG_PATH));

        let manifest_files = Self::resolve_list(
            explicit.manifest_files.as_ref(),
            file.manifest_files.as_ref(),
            DEFAULT_MANIFEST_FILES,
        );

        let changelog_tool = Self::resolve_value(
            explicit.changelog_tool.as_ref(),
            file.changelog_tool.as_ref(),
            DEFAULT_CHANGELOG_TOOL,
        );

        let version_command = Self::resolve_list(
            explicit.version_command.as_ref(),
            file.version_command.as_ref(),
            DEFAULT_VERSION_COMMAND,
        );

        if version_command.is_empty() {
            return Err(ReleaseError::invalid_config(
                "version_command must not be empty",
            ));
        }

        let remote = Self::resolve_value(
            explicit.remote.as_ref(),
            file.remote.as_ref(),
            DEFAULT_REMOTE,
        );

        Ok(Config {
            release_branches,
            bump_actor,
            changelog_path,
            manifest_files,
            changelog_tool,
            version_command,
            remote,
        })
    }

    /// Blank strings count as unset, in the file and in CI inputs alike.
    fn resolve_value(
        explicit: Option<&String>,
        file: Option<&String>,
        default: &str,
    ) -> String {
        let set = |v: &&String| !v.trim().is_empty();
        explicit
            .filter(set)
            .or(file.filter(set))
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| default.to_string())
    }

    fn resolve_list(
        explicit: Option<&Vec<String>>,
        file: Option<&Vec<String>>,
        default: &[&str],
    ) -> Vec<String> {
        let clean = |list: &Vec<String>| -> Vec<String> {
            list.iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect()
        };

        explicit
            .map(clean)
            .filter(|v| !v.is_empty())
            .or_else(|| file.map(clean))
            .unwrap_or_else(|| default.iter().map(|v| v.to_string()).collect())
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;
