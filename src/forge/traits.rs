//! Traits related to remote git forges
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    error::Result,
    forge::{
        config::RemoteConfig,
        request::{
            CreatePrRequest, CreateReleaseRequest, PullRequest, Release,
            UpdatePrRequest,
        },
    },
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    fn remote_config(&self) -> RemoteConfig;
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>>;
    async fn get_commit_prs(&self, sha: &str) -> Result<Vec<PullRequest>>;
    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest>;
    async fn update_pr(&self, req: UpdatePrRequest) -> Result<()>;
    async fn close_pr(&self, pr_number: u64) -> Result<()>;
    /// Returns `None` when the platform reports the tag has no release.
    async fn get_release_by_tag(&self, tag: &str) -> Result<Option<Release>>;
    async fn create_tag_and_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<Release>;
}
