//! Common test helper functions shared across test modules.
use secrecy::SecretString;

use crate::{
    config::{
        BumpActor, Config, DEFAULT_BUMP_ACTOR_EMAIL, DEFAULT_BUMP_ACTOR_NAME,
    },
    event::{EventKind, ReleaseEvent},
    forge::{
        config::RemoteConfig,
        manager::ForgeManager,
        request::{PrState, PullRequest, Release},
        traits::MockForge,
    },
};

/// Creates a test RemoteConfig with sensible defaults.
pub fn create_test_remote_config() -> RemoteConfig {
    RemoteConfig {
        api_url: "https://api.github.com".to_string(),
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        token: SecretString::from("test-token".to_string()),
        dry_run: false,
    }
}

/// Wraps a mock forge in a manager. The mock gets its `remote_config`
/// expectation here.
pub fn create_test_forge_manager(mut mock: MockForge) -> ForgeManager {
    mock.expect_remote_config()
        .returning(create_test_remote_config);
    ForgeManager::new(Box::new(mock))
}

/// Config with the default release branches and bump actor.
pub fn create_test_config() -> Config {
    Config {
        release_branches: vec!["dev".into(), "stg".into(), "main".into()],
        bump_actor: BumpActor {
            name: DEFAULT_BUMP_ACTOR_NAME.into(),
            email: DEFAULT_BUMP_ACTOR_EMAIL.into(),
        },
        changelog_path: "CHANGELOG.md".into(),
        manifest_files: vec!["pyproject.toml".into()],
        changelog_tool: "git-cliff".into(),
        version_command: vec![
            "uv".into(),
            "version".into(),
            "--frozen".into(),
            "--short".into(),
        ],
        remote: "origin".into(),
    }
}

pub fn create_push_event(ref_name: &str, actor: &str) -> ReleaseEvent {
    ReleaseEvent {
        kind: EventKind::Push,
        action: None,
        ref_name: ref_name.into(),
        head_ref: None,
        base_ref: None,
        commit_sha: "abc123".into(),
        actor: actor.into(),
        merged: false,
    }
}

pub fn create_pull_request_event(
    action: &str,
    head_ref: &str,
    base_ref: &str,
    merged: bool,
) -> ReleaseEvent {
    ReleaseEvent {
        kind: EventKind::PullRequest,
        action: Some(action.into()),
        ref_name: "12/merge".into(),
        head_ref: Some(head_ref.into()),
        base_ref: Some(base_ref.into()),
        commit_sha: "abc123".into(),
        actor: "octocat".into(),
        merged,
    }
}

pub fn create_test_pull_request(
    number: u64,
    head_ref: &str,
    base_ref: &str,
    state: PrState,
) -> PullRequest {
    PullRequest {
        number,
        head_ref: head_ref.into(),
        head_sha: format!("sha-{number}"),
        base_ref: base_ref.into(),
        title: format!("PR {number}"),
        body: String::new(),
        state,
        url: format!("https://github.com/acme/widgets/pull/{number}"),
    }
}

pub fn create_test_release(tag: &str, notes: &str) -> Release {
    Release {
        tag: tag.into(),
        name: tag.into(),
        notes: notes.into(),
        url: format!("https://github.com/acme/widgets/releases/tag/{tag}"),
    }
}
