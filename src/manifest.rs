//! Version manifest editing through an external command.
use log::*;
use std::path::PathBuf;

#[cfg(test)]
use mockall::automock;

use crate::{
    error::{ReleaseError, Result},
    process::run_tool,
};

/// Default manifest editor invocation; the target version is appended.
pub const DEFAULT_VERSION_COMMAND: &[&str] = &["uv", "version", "--frozen", "--short"];

/// Rewrites the project's version manifest.
#[cfg_attr(test, automock)]
pub trait ManifestEditor {
    /// Set the manifest version and return the normalized version reported
    /// by the editor.
    fn set_version(&self, version: &str) -> Result<String>;
}

/// Runs a configurable command such as `uv version --frozen --short`.
pub struct CommandManifestEditor {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
}

impl CommandManifestEditor {
    /// Editor running `command` with the version appended. Fails on an
    /// empty command.
    pub fn new(command: &[String], workdir: impl Into<PathBuf>) -> Result<Self> {
        let (program, args) = command.split_first().ok_or_else(|| {
            ReleaseError::invalid_config("version command must not be empty")
        })?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            workdir: workdir.into(),
        })
    }
}

impl ManifestEditor for CommandManifestEditor {
    fn set_version(&self, version: &str) -> Result<String> {
        let mut args = self.args.clone();
        args.push(version.to_string());

        let reported = run_tool(&self.program, &args, &self.workdir)?;
        let normalized = normalize_version(&reported);

        info!("bumped version to '{normalized}'");

        Ok(normalized)
    }
}

/// Semver-valid output (with or without a leading "v") is rendered in
/// canonical semver form; anything else is returned as reported.
pub fn normalize_version(reported: &str) -> String {
    let reported = reported.trim();
    let candidate = reported.strip_prefix('v').unwrap_or(reported);

    match semver::Version::parse(candidate) {
        Ok(version) => version.to_string(),
        Err(_) => reported.to_string(),
    }
}
