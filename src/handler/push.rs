use color_eyre::eyre::eyre;
use log::*;

use crate::{
    branch::BranchSynchronizer,
    bumper::{BumpOptions, VersionBumper},
    changelog::traits::{Changelog, DiffOptions},
    config::Config,
    error::Result,
    forge::{
        manager::ForgeManager,
        request::{CreatePrRequest, PullRequest, UpdatePrRequest},
    },
    manifest::ManifestEditor,
    rc_branch::RcBranch,
    repo::Workspace,
};

/// Title of the release-candidate pull request.
pub fn rc_pr_title(version: &str, base_ref: &str) -> String {
    format!("[Release Candidate] {version}-{base_ref} 🚀")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub version: String,
    pub rc_branch: String,
    /// Pull request body, also exposed as the `diff-changelog` output.
    pub body: String,
    pub pr: PullRequest,
    /// False when an existing pull request was updated.
    pub created: bool,
}

pub struct PushHandler<'a> {
    config: &'a Config,
    forge: &'a ForgeManager,
    workspace: &'a dyn Workspace,
    manifest: &'a dyn ManifestEditor,
    changelog: &'a dyn Changelog,
}

impl<'a> PushHandler<'a> {
    /// Handler borrowing the run's shared components.
    pub fn new(
        config: &'a Config,
        forge: &'a ForgeManager,
        workspace: &'a dyn Workspace,
        manifest: &'a dyn ManifestEditor,
        changelog: &'a dyn Changelog,
    ) -> Self {
        Self {
            config,
            forge,
            workspace,
            manifest,
            changelog,
        }
    }

    /// Create or refresh the release candidate for `base_ref`.
    pub async fn handle(&self, base_ref: &str) -> Result<PushOutcome> {
        let bumped_version = self.changelog.bumped_version()?;
        if bumped_version.is_empty() {
            return Err(eyre!("changelog tool reported an empty version").into());
        }
        info!("bumped version: {bumped_version}");

        let rc_branch = RcBranch::new(&bumped_version, base_ref).name();

        let mut rc_pr = self.find_rc_pr(base_ref).await?;

        if let Some((pr, version)) = &rc_pr
            && *version != bumped_version
        {
            warn!(
                "version mismatch in RC pull request (#{}): expected {bumped_version}, found {version}: closing it",
                pr.number
            );
            self.forge.close_pr(pr.number).await?;
            rc_pr = None;
        }

        info!("generating changelog diff for pull request body");
        let body = self.pr_body(&bumped_version, &rc_branch)?;
        debug!("pull request body:\n{body}");

        let title = rc_pr_title(&bumped_version, base_ref);
        let sync = BranchSynchronizer::new(self.workspace, &self.config.remote);
        let bumper = VersionBumper::new(
            self.config,
            self.workspace,
            self.manifest,
            self.changelog,
        );

        let (pr, created) = match rc_pr {
            None => {
                info!("no RC pull request found for {rc_branch}: creating one");
                sync.ensure(&rc_branch, base_ref)?;
                bumper.bump(
                    &bumped_version,
                    &rc_branch,
                    BumpOptions {
                        commit: true,
                        force: false,
                    },
                )?;

                let pr = self
                    .forge
                    .create_pr(CreatePrRequest {
                        head_branch: rc_branch.clone(),
                        base_branch: base_ref.to_string(),
                        title,
                        body: body.clone(),
                    })
                    .await?;

                (pr, true)
            }
            Some((mut pr, _)) => {
                info!(
                    "updating RC pull request (#{}) for {rc_branch}",
                    pr.number
                );
                sync.reset(&rc_branch, &pr.head_sha)?;
                bumper.bump(
                    &bumped_version,
                    &rc_branch,
                    BumpOptions {
                        commit: true,
                        force: true,
                    },
                )?;

                self.forge
                    .update_pr(UpdatePrRequest {
                        pr_number: pr.number,
                        title: title.clone(),
                        body: body.clone(),
                    })
                    .await?;

                pr.title = title;
                pr.body = body.clone();

                (pr, false)
            }
        };

        Ok(PushOutcome {
            version: bumped_version,
            rc_branch,
            body,
            pr,
            created,
        })
    }

    /// First open pull request whose head is an RC branch for `base_ref`,
    /// with the version encoded in its head.
    async fn find_rc_pr(
        &self,
        base_ref: &str,
    ) -> Result<Option<(PullRequest, String)>> {
        let prs = self.forge.list_open_prs().await?;

        let found = prs
            .into_iter()
            .filter(|pr| pr.base_ref == base_ref)
            .find_map(|pr| {
                RcBranch::parse_for_base(&pr.head_ref, base_ref)
                    .map(|version| (pr, version))
            });

        if let Some((pr, _)) = &found {
            info!(
                "found active RC pull request (#{}) from {}",
                pr.number, pr.head_ref
            );
        }

        Ok(found)
    }

    /// The compare link points at the RC branch since the version tag does
    /// not exist yet.
    fn pr_body(&self, version: &str, rc_branch: &str) -> Result<String> {
        let diff = self.changelog.diff(DiffOptions::release_notes())?;
        Ok(diff.replace(&format!("...{version}"), &format!("...{rc_branch}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        changelog::traits::MockChangelog,
        error::ReleaseError,
        forge::{request::PrState, traits::MockForge},
        manifest::MockManifestEditor,
        repo::MockWorkspace,
        test_helpers::*,
    };
    use mockall::predicate::eq;

    const DIFF: &str = "## [v1.2.0](https://github.com/acme/widgets/compare/v1.1.0...v1.2.0)\n- feat: login";

    fn changelog(version: &'static str) -> MockChangelog {
        let mut changelog = MockChangelog::new();
        changelog
            .expect_bumped_version()
            .times(1)
            .returning(move || Ok(version.into()));
        changelog
            .expect_diff()
            .times(1)
            .returning(|_| Ok(DIFF.into()));
        changelog.expect_write_file().returning(|_| Ok(()));
        changelog
    }

    fn manifest() -> MockManifestEditor {
        let mut manifest = MockManifestEditor::new();
        manifest
            .expect_set_version()
            .returning(|v| Ok(v.trim_start_matches('v').into()));
        manifest
    }

    /// Workspace for a fresh RC branch that commits one bump.
    fn fresh_branch_workspace(rc_branch: &'static str) -> MockWorkspace {
        let mut workspace = MockWorkspace::new();
        workspace
            .expect_remote_branch_exists()
            .with(eq(rc_branch))
            .times(1)
            .returning(|_| Ok(false));
        workspace
            .expect_create_branch()
            .with(eq(rc_branch), eq("main"))
            .times(1)
            .returning(|_, _| Ok(()));
        workspace
            .expect_push_upstream()
            .with(eq(rc_branch))
            .times(1)
            .returning(|_| Ok(()));
        workspace
            .expect_checkout()
            .with(eq(rc_branch))
            .returning(|_| Ok(()));
        workspace.expect_stage().returning(|_| Ok(()));
        workspace
            .expect_has_staged_changes()
            .returning(|| Ok(true));
        workspace
            .expect_commit()
            .times(1)
            .returning(|_, _, _| Ok("bump-sha".into()));
        workspace
            .expect_push()
            .with(eq(rc_branch), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));
        workspace
    }

    #[test_log::test(tokio::test)]
    async fn creates_rc_branch_and_pr_when_none_exists() {
        let mut mock = MockForge::new();
        mock.expect_list_open_prs().times(1).returning(|| {
            Ok(vec![create_test_pull_request(
                3,
                "feature/x",
                "main",
                PrState::Open,
            )])
        });
        mock.expect_close_pr().never();
        mock.expect_update_pr().never();
        mock.expect_create_pr()
            .times(1)
            .withf(|req| {
                req.head_branch == "rc/v1.2.0-main"
                    && req.base_branch == "main"
                    && req.title == "[Release Candidate] v1.2.0-main 🚀"
                    && req.body.contains("v1.1.0...rc/v1.2.0-main")
            })
            .returning(|req| {
                Ok(create_test_pull_request(
                    8,
                    &req.head_branch,
                    &req.base_branch,
                    PrState::Open,
                ))
            });

        let config = create_test_config();
        let forge = create_test_forge_manager(mock);
        let workspace = fresh_branch_workspace("rc/v1.2.0-main");
        let manifest = manifest();
        let mut changelog = MockChangelog::new();
        changelog
            .expect_bumped_version()
            .returning(|| Ok("v1.2.0".into()));
        changelog.expect_diff().times(1).returning(|_| Ok(DIFF.into()));
        changelog.expect_write_file().times(1).returning(|_| Ok(()));

        let handler =
            PushHandler::new(&config, &forge, &workspace, &manifest, &changelog);
        let outcome = handler.handle("main").await.unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.version, "v1.2.0");
        assert_eq!(outcome.rc_branch, "rc/v1.2.0-main");
        assert_eq!(outcome.pr.number, 8);
        assert!(outcome.body.contains("compare/v1.1.0...rc/v1.2.0-main"));
    }

    #[tokio::test]
    async fn repeated_push_updates_existing_pr_without_new_branch() {
        let mut mock = MockForge::new();
        mock.expect_list_open_prs().times(1).returning(|| {
            Ok(vec![create_test_pull_request(
                7,
                "rc/v1.2.0-main",
                "main",
                PrState::Open,
            )])
        });
        mock.expect_create_pr().never();
        mock.expect_close_pr().never();
        mock.expect_update_pr()
            .times(1)
            .withf(|req| {
                req.pr_number == 7
                    && req.title == "[Release Candidate] v1.2.0-main 🚀"
            })
            .returning(|_| Ok(()));

        let mut workspace = MockWorkspace::new();
        workspace.expect_remote_branch_exists().never();
        workspace.expect_push_upstream().never();
        workspace
            .expect_fetch_branch()
            .with(eq("rc/v1.2.0-main"))
            .returning(|_| Ok(()));
        workspace
            .expect_create_branch()
            .with(eq("rc/v1.2.0-main"), eq("sha-7"))
            .times(1)
            .returning(|_, _| Ok(()));
        workspace.expect_checkout().returning(|_| Ok(()));
        workspace
            .expect_reset_hard()
            .with(eq("sha-7"))
            .times(1)
            .returning(|_| Ok(()));
        workspace.expect_stage().returning(|_| Ok(()));
        // nothing new since the last run
        workspace
            .expect_has_staged_changes()
            .returning(|| Ok(false));
        workspace.expect_commit().never();
        workspace.expect_push().never();

        let config = create_test_config();
        let forge = create_test_forge_manager(mock);
        let manifest = manifest();
        let changelog = changelog("v1.2.0");

        let handler =
            PushHandler::new(&config, &forge, &workspace, &manifest, &changelog);
        let outcome = handler.handle("main").await.unwrap();

        assert!(!outcome.created);
        assert_eq!(outcome.pr.number, 7);
        assert_eq!(outcome.pr.title, "[Release Candidate] v1.2.0-main 🚀");
    }

    #[tokio::test]
    async fn existing_pr_with_new_commits_is_force_pushed() {
        let mut mock = MockForge::new();
        mock.expect_list_open_prs().returning(|| {
            Ok(vec![create_test_pull_request(
                7,
                "rc/v1.2.0-main",
                "main",
                PrState::Open,
            )])
        });
        mock.expect_update_pr().times(1).returning(|_| Ok(()));

        let mut workspace = MockWorkspace::new();
        workspace.expect_fetch_branch().returning(|_| Ok(()));
        workspace.expect_create_branch().returning(|_, _| Ok(()));
        workspace.expect_checkout().returning(|_| Ok(()));
        workspace.expect_reset_hard().returning(|_| Ok(()));
        workspace.expect_stage().returning(|_| Ok(()));
        workspace
            .expect_has_staged_changes()
            .returning(|| Ok(true));
        workspace
            .expect_commit()
            .times(1)
            .returning(|_, _, _| Ok("bump-sha".into()));
        workspace
            .expect_push()
            .with(eq("rc/v1.2.0-main"), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));

        let config = create_test_config();
        let forge = create_test_forge_manager(mock);
        let manifest = manifest();
        let changelog = changelog("v1.2.0");

        let handler =
            PushHandler::new(&config, &forge, &workspace, &manifest, &changelog);
        let outcome = handler.handle("main").await.unwrap();

        assert!(!outcome.created);
    }

    #[tokio::test]
    async fn stale_rc_pr_is_closed_and_replaced() {
        let mut mock = MockForge::new();
        mock.expect_list_open_prs().times(1).returning(|| {
            Ok(vec![create_test_pull_request(
                7,
                "rc/v1.2.0-main",
                "main",
                PrState::Open,
            )])
        });
        mock.expect_close_pr()
            .times(1)
            .withf(|n| *n == 7)
            .returning(|_| Ok(()));
        mock.expect_update_pr().never();
        mock.expect_create_pr()
            .times(1)
            .withf(|req| {
                req.head_branch == "rc/v1.3.0-main"
                    && req.title == "[Release Candidate] v1.3.0-main 🚀"
            })
            .returning(|req| {
                Ok(create_test_pull_request(
                    9,
                    &req.head_branch,
                    &req.base_branch,
                    PrState::Open,
                ))
            });

        let config = create_test_config();
        let forge = create_test_forge_manager(mock);
        let workspace = fresh_branch_workspace("rc/v1.3.0-main");
        let manifest = manifest();
        let changelog = changelog("v1.3.0");

        let handler =
            PushHandler::new(&config, &forge, &workspace, &manifest, &changelog);
        let outcome = handler.handle("main").await.unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.pr.number, 9);
        assert_eq!(outcome.rc_branch, "rc/v1.3.0-main");
    }

    #[tokio::test]
    async fn rc_prs_for_other_bases_are_ignored() {
        let mut mock = MockForge::new();
        mock.expect_list_open_prs().returning(|| {
            Ok(vec![
                create_test_pull_request(
                    4,
                    "rc/v1.0.0-dev",
                    "dev",
                    PrState::Open,
                ),
                create_test_pull_request(
                    5,
                    "rc/v1.0.0-stg",
                    "stg",
                    PrState::Open,
                ),
            ])
        });
        mock.expect_close_pr().never();
        mock.expect_create_pr().times(1).returning(|req| {
            Ok(create_test_pull_request(
                10,
                &req.head_branch,
                &req.base_branch,
                PrState::Open,
            ))
        });

        let config = create_test_config();
        let forge = create_test_forge_manager(mock);
        let workspace = fresh_branch_workspace("rc/v1.2.0-main");
        let manifest = manifest();
        let changelog = changelog("v1.2.0");

        let handler =
            PushHandler::new(&config, &forge, &workspace, &manifest, &changelog);
        let outcome = handler.handle("main").await.unwrap();

        assert_eq!(outcome.pr.number, 10);
    }

    #[tokio::test]
    async fn rc_pr_into_base_sharing_a_suffix_is_ignored() {
        let mut mock = MockForge::new();
        mock.expect_list_open_prs().returning(|| {
            Ok(vec![create_test_pull_request(
                6,
                "rc/v1.2.0-dev-main",
                "dev-main",
                PrState::Open,
            )])
        });
        mock.expect_close_pr().never();
        mock.expect_update_pr().never();
        mock.expect_create_pr()
            .times(1)
            .withf(|req| req.head_branch == "rc/v1.2.0-main")
            .returning(|req| {
                Ok(create_test_pull_request(
                    12,
                    &req.head_branch,
                    &req.base_branch,
                    PrState::Open,
                ))
            });

        let config = create_test_config();
        let forge = create_test_forge_manager(mock);
        let workspace = fresh_branch_workspace("rc/v1.2.0-main");
        let manifest = manifest();
        let changelog = changelog("v1.2.0");

        let handler =
            PushHandler::new(&config, &forge, &workspace, &manifest, &changelog);
        let outcome = handler.handle("main").await.unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.pr.number, 12);
    }

    #[tokio::test]
    async fn branch_failure_is_fatal_before_pr_creation() {
        let mut mock = MockForge::new();
        mock.expect_list_open_prs().returning(|| Ok(vec![]));
        mock.expect_create_pr().never();

        let mut workspace = MockWorkspace::new();
        workspace
            .expect_remote_branch_exists()
            .returning(|_| Ok(false));
        workspace.expect_create_branch().returning(|_, _| Ok(()));
        workspace
            .expect_push_upstream()
            .returning(|_| Err(ReleaseError::forge("permission denied")));

        let config = create_test_config();
        let forge = create_test_forge_manager(mock);
        let manifest = MockManifestEditor::new();
        let changelog = changelog("v1.2.0");

        let handler =
            PushHandler::new(&config, &forge, &workspace, &manifest, &changelog);
        let result = handler.handle("main").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_bumped_version_is_an_error() {
        let mock = MockForge::new();
        let workspace = MockWorkspace::new();
        let manifest = MockManifestEditor::new();
        let mut changelog = MockChangelog::new();
        changelog.expect_bumped_version().returning(|| Ok("".into()));

        let config = create_test_config();
        let forge = create_test_forge_manager(mock);

        let handler =
            PushHandler::new(&config, &forge, &workspace, &manifest, &changelog);

        assert!(handler.handle("main").await.is_err());
    }

    #[test]
    fn title_includes_version_and_base() {
        assert_eq!(
            rc_pr_title("v1.2.0", "main"),
            "[Release Candidate] v1.2.0-main 🚀"
        );
    }
}
