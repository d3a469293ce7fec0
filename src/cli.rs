//! CLI argument parsing.
//!
//! Every argument can also be supplied through the environment: `GITHUB_*`
//! variables carry the event context provided by the runner, `INPUT_*`
//! variables carry action inputs.
use clap::Parser;
use std::path::PathBuf;

use crate::forge::config::DEFAULT_API_URL;

/// Keeps release-candidate pull requests in sync and promotes merged
/// candidates into tagged releases
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    /// Name of the event that triggered the run (push, pull_request, ...).
    pub event_name: String,

    #[arg(long, env = "GITHUB_EVENT_PATH")]
    /// Path to the JSON webhook payload.
    pub event_path: Option<PathBuf>,

    #[arg(long, env = "GITHUB_ACTOR", default_value = "")]
    /// Login of the user or app that triggered the event.
    pub actor: String,

    #[arg(long, env = "GITHUB_REF_NAME", default_value = "")]
    /// Short name of the ref that triggered the event.
    pub ref_name: String,

    #[arg(long, env = "GITHUB_HEAD_REF")]
    /// Head branch of the pull request.
    pub head_ref: Option<String>,

    #[arg(long, env = "GITHUB_BASE_REF")]
    /// Base branch of the pull request.
    pub base_ref: Option<String>,

    #[arg(long, env = "GITHUB_SHA")]
    /// Commit that triggered the event.
    pub sha: String,

    #[arg(long, env = "GITHUB_REPOSITORY")]
    /// Repository in owner/repo form.
    pub repository: String,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    /// Access token used for the API and for git pushes.
    pub token: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    /// REST API base url. Set this for GitHub Enterprise.
    pub api_url: String,

    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    /// Local checkout of the repository.
    pub workspace: PathBuf,

    #[arg(long, env = "GITHUB_OUTPUT")]
    /// File that step outputs are appended to.
    pub output: Option<PathBuf>,

    #[arg(long, env = "INPUT_CONFIG")]
    /// Config file. Defaults to streamlined-releases.toml in the workspace.
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ExplicitOverrides,

    #[arg(long, env = "INPUT_DRY_RUN", default_value_t = false)]
    /// Log pushes and hosting-platform mutations instead of performing them
    pub dry_run: bool,

    #[arg(long, env = "INPUT_SAFE_DIRECTORY", default_value_t = false)]
    /// Mark the workspace as a git safe.directory before opening it
    pub safe_directory: bool,

    #[arg(long, env = "INPUT_DEBUG", default_value_t = false)]
    /// Enables debug logs
    pub debug: bool,
}

/// Settings given on the command line or as action inputs. These win over
/// the config file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ExplicitOverrides {
    #[arg(long, env = "INPUT_RELEASE_BRANCHES", value_delimiter = ',')]
    /// Branches that get release candidates (comma separated).
    pub release_branches: Option<Vec<String>>,

    #[arg(long, env = "INPUT_BUMP_ACTOR_NAME")]
    /// Name used for version bump commits.
    pub bump_actor_name: Option<String>,

    #[arg(long, env = "INPUT_BUMP_ACTOR_EMAIL")]
    /// Email used for version bump commits.
    pub bump_actor_email: Option<String>,

    #[arg(long, env = "INPUT_CHANGELOG_PATH")]
    pub changelog_path: Option<PathBuf>,

    #[arg(long, env = "INPUT_MANIFEST_FILES", value_delimiter = ',')]
    /// Files rewritten by the version command (comma separated).
    pub manifest_files: Option<Vec<String>>,

    #[arg(long, env = "INPUT_CHANGELOG_TOOL")]
    pub changelog_tool: Option<String>,

    #[arg(
        long,
        env = "INPUT_VERSION_COMMAND",
        value_delimiter = ' ',
        allow_hyphen_values = true
    )]
    /// Command that sets the manifest version; the version is appended.
    pub version_command: Option<Vec<String>>,

    #[arg(long, env = "INPUT_REMOTE")]
    /// Git remote to fetch from and push to.
    pub remote: Option<String>,
}
