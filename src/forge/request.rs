//! Request and response types exchanged with the hosting platform.

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

/// Pull request information normalized from the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub head_ref: String,
    pub head_sha: String,
    pub base_ref: String,
    pub title: String,
    pub body: String,
    pub state: PrState,
    pub url: String,
}

/// Published release information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag: String,
    pub name: String,
    pub notes: String,
    pub url: String,
}

#[derive(Debug, Clone)]
/// Request to create a new pull request.
pub struct CreatePrRequest {
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
/// Request to update existing pull request.
pub struct UpdatePrRequest {
    pub pr_number: u64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
/// Request to create an annotated tag and the release published from it.
pub struct CreateReleaseRequest {
    pub tag: String,
    pub tag_message: String,
    pub sha: String,
    pub name: String,
    pub body: String,
}
