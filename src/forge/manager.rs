//! Manager that wraps forge implementations
use log::*;

use crate::{
    error::Result,
    forge::{
        config::RemoteConfig,
        request::{
            CreatePrRequest, CreateReleaseRequest, PrState, PullRequest,
            Release, UpdatePrRequest,
        },
        traits::Forge,
    },
};

/// Single hosting-platform handle for one invocation. Every mutating call
/// is routed through here so dry runs never reach the platform.
pub struct ForgeManager {
    forge: Box<dyn Forge>,
    remote_config: RemoteConfig,
}

impl ForgeManager {
    /// Wrap `forge`, reading its remote config once.
    pub fn new(forge: Box<dyn Forge>) -> Self {
        let remote_config = forge.remote_config();
        Self {
            forge,
            remote_config,
        }
    }

    /// All open pull requests of the repository.
    pub async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        let prs = self.forge.list_open_prs().await?;
        debug!("found {} open pull requests", prs.len());
        Ok(prs)
    }

    /// Pull requests associated with commit `sha`.
    pub async fn get_commit_prs(&self, sha: &str) -> Result<Vec<PullRequest>> {
        debug!("getting pull requests associated with commit: {sha}");
        self.forge.get_commit_prs(sha).await
    }

    /// The release for `tag`, if one exists.
    pub async fn get_release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        self.forge.get_release_by_tag(tag).await
    }

    /// Open a pull request. Dry runs return a placeholder numbered 0.
    pub async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        if self.remote_config.dry_run {
            warn!("dry_run: would create PR: req: {:#?}", req);
            return Ok(PullRequest {
                number: 0,
                head_ref: req.head_branch,
                head_sha: "fff".into(),
                base_ref: req.base_branch,
                title: req.title,
                body: req.body,
                state: PrState::Open,
                url: "".into(),
            });
        }

        info!(
            "creating pull request '{}' from '{}' to '{}'",
            req.title, req.head_branch, req.base_branch
        );
        let pr = self.forge.create_pr(req).await?;
        info!("pull request (#{}) created: {}", pr.number, pr.url);
        Ok(pr)
    }

    /// Replace the title and body of a pull request.
    pub async fn update_pr(&self, req: UpdatePrRequest) -> Result<()> {
        if self.remote_config.dry_run {
            warn!("dry_run: would update PR: req: {:#?}", req);
            return Ok(());
        }
        self.forge.update_pr(req).await
    }

    pub async fn close_pr(&self, pr_number: u64) -> Result<()> {
        if self.remote_config.dry_run {
            warn!("dry_run: would close PR: {pr_number}");
            return Ok(());
        }
        self.forge.close_pr(pr_number).await
    }

    /// Create the annotated tag, its ref and the release.
    pub async fn create_tag_and_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<Release> {
        if self.remote_config.dry_run {
            warn!("dry_run: would create tag and release: req: {:#?}", req);
            return Ok(Release {
                tag: req.tag,
                name: req.name,
                notes: req.body,
                url: "".into(),
            });
        }
        self.forge.create_tag_and_release(req).await
    }
}
