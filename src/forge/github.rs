//! Implements the Forge trait for Github
use async_trait::async_trait;
use log::*;
use octocrab::{
    Octocrab, Page,
    models::{IssueState, pulls::PullRequest as GithubPullRequest},
    params::{self, repos::Reference},
};
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ReleaseError, Result},
    forge::{
        config::{DEFAULT_PAGE_SIZE, RemoteConfig},
        request::{
            CreatePrRequest, CreateReleaseRequest, PrState, PullRequest,
            Release, UpdatePrRequest,
        },
        traits::Forge,
    },
};

#[derive(Debug, Deserialize)]
struct GitTagObject {
    pub sha: String,
}

/// Query for raw list endpoints.
#[derive(Debug, Serialize)]
struct PageQuery {
    per_page: u8,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// GitHub forge implementation using Octocrab for pull request, commit and
/// release queries.
pub struct Github {
    config: RemoteConfig,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with token authentication and verify the
    /// repository is reachable.
    pub async fn new(config: RemoteConfig) -> Result<Self> {
        let token = config.token.expose_secret().to_string();
        let instance = Octocrab::builder()
            .personal_token(token)
            .base_uri(config.api_url.clone())?
            .build()?;

        let repo = instance.repos(&config.owner, &config.repo).get().await?;

        info!(
            "connected to repository: {}",
            repo.full_name.unwrap_or_else(|| config.full_name())
        );

        Ok(Self { config, instance })
    }

    fn repo_endpoint(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.config.api_url, self.config.owner, self.config.repo, path
        )
    }

    fn to_pull_request(pr: GithubPullRequest) -> PullRequest {
        let state = if pr.merged_at.is_some() {
            PrState::Merged
        } else {
            match pr.state {
                Some(IssueState::Closed) => PrState::Closed,
                _ => PrState::Open,
            }
        };

        PullRequest {
            number: pr.number,
            head_ref: pr.head.ref_field,
            head_sha: pr.head.sha,
            base_ref: pr.base.ref_field,
            title: pr.title.unwrap_or_default(),
            body: pr.body.unwrap_or_default(),
            state,
            url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Forge for Github {
    fn remote_config(&self) -> RemoteConfig {
        self.config.clone()
    }

    async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        let page = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(params::State::Open)
            .per_page(DEFAULT_PAGE_SIZE)
            .send()
            .await?;

        let prs = self.instance.all_pages(page).await?;

        Ok(prs.into_iter().map(Self::to_pull_request).collect())
    }

    async fn get_commit_prs(&self, sha: &str) -> Result<Vec<PullRequest>> {
        let endpoint = self.repo_endpoint(&format!("commits/{sha}/pulls"));

        let page: Page<GithubPullRequest> = self
            .instance
            .get(endpoint, Some(&PageQuery::default()))
            .await?;

        let prs = self.instance.all_pages(page).await?;

        Ok(prs.into_iter().map(Self::to_pull_request).collect())
    }

    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .create(req.title, req.head_branch, req.base_branch)
            .body(req.body)
            .send()
            .await?;

        Ok(Self::to_pull_request(pr))
    }

    async fn update_pr(&self, req: UpdatePrRequest) -> Result<()> {
        self.instance
            .pulls(&self.config.owner, &self.config.repo)
            .update(req.pr_number)
            .title(req.title)
            .body(req.body)
            .send()
            .await?;

        Ok(())
    }

    async fn close_pr(&self, pr_number: u64) -> Result<()> {
        let endpoint = self.repo_endpoint(&format!("pulls/{pr_number}"));

        let _: serde_json::Value = self
            .instance
            .patch(endpoint, Some(&serde_json::json!({ "state": "closed" })))
            .await?;

        Ok(())
    }

    async fn get_release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .get_by_tag(tag)
            .await;

        match result {
            Ok(release) => Ok(Some(Release {
                tag: release.tag_name,
                name: release.name.unwrap_or_default(),
                notes: release.body.unwrap_or_default(),
                url: release.html_url.to_string(),
            })),
            Err(octocrab::Error::GitHub { source, .. })
                if source.status_code == StatusCode::NOT_FOUND =>
            {
                debug!("no release found for tag: {tag}");
                Ok(None)
            }
            Err(err) => {
                error!("error getting release for tag {tag}: {err}");
                Err(ReleaseError::from(err))
            }
        }
    }

    async fn create_tag_and_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<Release> {
        let tag_object: GitTagObject = self
            .instance
            .post(
                self.repo_endpoint("git/tags"),
                Some(&serde_json::json!({
                  "tag": req.tag,
                  "message": req.tag_message,
                  "object": req.sha,
                  "type": "commit",
                })),
            )
            .await?;

        info!("created tag object {} for tag {}", tag_object.sha, req.tag);

        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .create_ref(&Reference::Tag(req.tag.clone()), tag_object.sha)
            .await?;

        let release = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .create(&req.tag)
            .name(&req.name)
            .body(&req.body)
            .target_commitish(&req.sha)
            .draft(false)
            .prerelease(false)
            .send()
            .await?;

        Ok(Release {
            tag: release.tag_name,
            name: release.name.unwrap_or_default(),
            notes: release.body.unwrap_or_default(),
            url: release.html_url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_pulls_are_requested_by_full_pages() {
        let github = Github {
            config: RemoteConfig {
                owner: "acme".into(),
                repo: "widgets".into(),
                ..RemoteConfig::default()
            },
            instance: Octocrab::builder().build().unwrap(),
        };

        assert_eq!(
            github.repo_endpoint("commits/abc123/pulls"),
            "https://api.github.com/repos/acme/widgets/commits/abc123/pulls"
        );
        assert_eq!(
            serde_json::to_value(PageQuery::default()).unwrap(),
            serde_json::json!({ "per_page": DEFAULT_PAGE_SIZE })
        );
    }
}
