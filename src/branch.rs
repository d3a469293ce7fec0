//! Release-candidate branch lifecycle on the local checkout and the remote.
use log::*;

use crate::{error::Result, repo::Workspace};

pub struct BranchSynchronizer<'a> {
    workspace: &'a dyn Workspace,
    remote: &'a str,
}

impl<'a> BranchSynchronizer<'a> {
    /// Synchronizer pushing to `remote`.
    pub fn new(workspace: &'a dyn Workspace, remote: &'a str) -> Self {
        Self { workspace, remote }
    }

    /// Make `branch` available locally, creating and publishing it from
    /// `base_ref` when the remote does not have it yet.
    pub fn ensure(&self, branch: &str, base_ref: &str) -> Result<()> {
        if !self.workspace.remote_branch_exists(branch)? {
            info!("creating branch {branch} from {base_ref}");
            self.workspace.create_branch(branch, base_ref)?;
            self.workspace.push_upstream(branch)?;
            return Ok(());
        }

        info!("branch {branch} already exists on {}", self.remote);
        self.workspace.fetch_branch(branch)?;

        if !self.workspace.local_branch_exists(branch)? {
            let tracking = format!("{}/{branch}", self.remote);
            self.workspace.create_branch(branch, &tracking)?;
        }

        Ok(())
    }

    /// Point `branch` at `to_sha`, check it out and discard any working
    /// tree changes.
    pub fn reset(&self, branch: &str, to_sha: &str) -> Result<()> {
        info!("resetting {branch} to {to_sha}");
        self.workspace.fetch_branch(branch)?;
        self.workspace.create_branch(branch, to_sha)?;
        self.workspace.checkout(branch)?;
        self.workspace.reset_hard(to_sha)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ReleaseError, repo::MockWorkspace};
    use mockall::{Sequence, predicate::eq};

    #[test]
    fn ensure_creates_and_publishes_missing_branch() {
        let mut seq = Sequence::new();
        let mut workspace = MockWorkspace::new();
        workspace
            .expect_remote_branch_exists()
            .with(eq("rc/v1.2.0-main"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        workspace
            .expect_create_branch()
            .with(eq("rc/v1.2.0-main"), eq("main"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        workspace
            .expect_push_upstream()
            .with(eq("rc/v1.2.0-main"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        workspace.expect_fetch_branch().never();

        let sync = BranchSynchronizer::new(&workspace, "origin");
        sync.ensure("rc/v1.2.0-main", "main").unwrap();
    }

    #[test]
    fn ensure_tracks_existing_remote_branch() {
        let mut workspace = MockWorkspace::new();
        workspace
            .expect_remote_branch_exists()
            .returning(|_| Ok(true));
        workspace
            .expect_fetch_branch()
            .with(eq("rc/v1.2.0-main"))
            .times(1)
            .returning(|_| Ok(()));
        workspace
            .expect_local_branch_exists()
            .times(1)
            .returning(|_| Ok(false));
        workspace
            .expect_create_branch()
            .with(eq("rc/v1.2.0-main"), eq("origin/rc/v1.2.0-main"))
            .times(1)
            .returning(|_, _| Ok(()));
        workspace.expect_push_upstream().never();

        let sync = BranchSynchronizer::new(&workspace, "origin");
        sync.ensure("rc/v1.2.0-main", "main").unwrap();
    }

    #[test]
    fn ensure_leaves_existing_local_branch_alone() {
        let mut workspace = MockWorkspace::new();
        workspace
            .expect_remote_branch_exists()
            .returning(|_| Ok(true));
        workspace.expect_fetch_branch().returning(|_| Ok(()));
        workspace
            .expect_local_branch_exists()
            .returning(|_| Ok(true));
        workspace.expect_create_branch().never();
        workspace.expect_push_upstream().never();

        let sync = BranchSynchronizer::new(&workspace, "origin");
        sync.ensure("rc/v1.2.0-main", "main").unwrap();
    }

    #[test]
    fn ensure_fails_when_push_fails() {
        let mut workspace = MockWorkspace::new();
        workspace
            .expect_remote_branch_exists()
            .returning(|_| Ok(false));
        workspace.expect_create_branch().returning(|_, _| Ok(()));
        workspace
            .expect_push_upstream()
            .returning(|_| Err(ReleaseError::forge("remote rejected")));

        let sync = BranchSynchronizer::new(&workspace, "origin");
        assert!(sync.ensure("rc/v1.2.0-main", "main").is_err());
    }

    #[test]
    fn reset_moves_branch_to_sha() {
        let mut seq = Sequence::new();
        let mut workspace = MockWorkspace::new();
        workspace
            .expect_fetch_branch()
            .with(eq("rc/v1.2.0-main"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        workspace
            .expect_create_branch()
            .with(eq("rc/v1.2.0-main"), eq("abc123"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        workspace
            .expect_checkout()
            .with(eq("rc/v1.2.0-main"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        workspace
            .expect_reset_hard()
            .with(eq("abc123"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let sync = BranchSynchronizer::new(&workspace, "origin");
        sync.reset("rc/v1.2.0-main", "abc123").unwrap();
    }
}
