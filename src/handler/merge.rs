use log::*;

use crate::{
    changelog::traits::{Changelog, DiffOptions},
    error::Result,
    forge::{
        manager::ForgeManager,
        request::{CreateReleaseRequest, Release},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub release: Release,
    /// False when the release already existed.
    pub created: bool,
}

/// Every merge of an RC branch lands here, including promotions of an
/// already released version to later branches, so the release is only
/// created when its tag has none yet.
pub struct MergeHandler<'a> {
    forge: &'a ForgeManager,
    changelog: &'a dyn Changelog,
}

impl<'a> MergeHandler<'a> {
    /// Handler over the run's forge handle and changelog tool.
    pub fn new(forge: &'a ForgeManager, changelog: &'a dyn Changelog) -> Self {
        Self { forge, changelog }
    }

    /// Publish `version` at `sha` unless its release already exists.
    pub async fn handle(&self, version: &str, sha: &str) -> Result<MergeOutcome> {
        if let Some(release) = self.forge.get_release_by_tag(version).await? {
            info!("release {version} already exists, skipping creation");
            return Ok(MergeOutcome {
                release,
                created: false,
            });
        }

        info!("generating changelog diff for release body");
        let body = self.changelog.diff(DiffOptions::release_notes())?;
        debug!("release body:\n{body}");

        info!("creating release {version} at {sha}");
        let release = self
            .forge
            .create_tag_and_release(CreateReleaseRequest {
                tag: version.to_string(),
                tag_message: version.to_string(),
                sha: sha.to_string(),
                name: version.to_string(),
                body,
            })
            .await?;

        info!("release {} published: {}", release.tag, release.url);

        Ok(MergeOutcome {
            release,
            created: true,
        })
    }
}
