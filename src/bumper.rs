//! Version bumps on a target branch.
use log::*;

use crate::{
    changelog::traits::Changelog,
    config::Config,
    error::Result,
    manifest::ManifestEditor,
    repo::Workspace,
};

/// Commit message used for version bump commits.
pub fn bump_commit_message(version: &str) -> String {
    format!("chore(release): Bumped version to {version}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BumpOptions {
    /// Regenerate the changelog, commit and push the bump.
    pub commit: bool,
    /// Force-push the target branch.
    pub force: bool,
}

/// Rewrites the version manifest on a branch and optionally commits the
/// result. Operates on the shared working tree, so calls must not overlap.
pub struct VersionBumper<'a> {
    config: &'a Config,
    workspace: &'a dyn Workspace,
    manifest: &'a dyn ManifestEditor,
    changelog: &'a dyn Changelog,
}

impl<'a> VersionBumper<'a> {
    /// Bumper over the run's workspace and version tools.
    pub fn new(
        config: &'a Config,
        workspace: &'a dyn Workspace,
        manifest: &'a dyn ManifestEditor,
        changelog: &'a dyn Changelog,
    ) -> Self {
        Self {
            config,
            workspace,
            manifest,
            changelog,
        }
    }

    /// Returns the version as normalized by the manifest editor.
    pub fn bump(
        &self,
        version: &str,
        target_ref: &str,
        options: BumpOptions,
    ) -> Result<String> {
        self.workspace.checkout(target_ref)?;

        let normalized = self.manifest.set_version(version)?;

        if !options.commit {
            return Ok(normalized);
        }

        self.changelog.write_file(&self.config.changelog_path)?;

        self.workspace.stage(&self.stage_paths())?;

        if !self.workspace.has_staged_changes()? {
            info!("version {version} already committed on {target_ref}");
            return Ok(normalized);
        }

        let actor = &self.config.bump_actor;
        let sha = self.workspace.commit(
            &bump_commit_message(version),
            &actor.name,
            &actor.email,
        )?;
        info!("committed version bump {version} on {target_ref}: {sha}");

        self.workspace.push(target_ref, options.force)?;

        Ok(normalized)
    }

    /// Manifest files plus the changelog. Lock files are never staged.
    fn stage_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .config
            .manifest_files
            .iter()
            .filter(|path| {
                let is_lock = path.ends_with(".lock");
                if is_lock {
                    warn!("not staging lock file: {path}");
                }
                !is_lock
            })
            .cloned()
            .collect();

        paths.push(self.config.changelog_path.display().to_string());

        paths
    }
}
