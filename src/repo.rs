//! Git operations on the local CI checkout.
//!
//! Wraps `git2::Repository` with the handful of operations the release flow
//! needs:
//!
//! - Branch creation, checkout and hard reset
//! - Staging explicit paths and committing with a fixed identity
//! - Authenticated (optionally forced) pushes to the remote
//!
//! The working tree and index are process-exclusive state: nothing here
//! locks them.
use git2::{BranchType, Direction, ErrorCode, RemoteCallbacks, ResetType};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use std::{
    env,
    path::{Path, PathBuf},
};

#[cfg(test)]
use mockall::automock;

use crate::{
    error::{ReleaseError, Result},
    forge::config::TOKEN_AUTH_USER,
};

/// Default name of the remote the CI checkout was cloned from.
pub const DEFAULT_REMOTE: &str = "origin";

/// Git operations used by the release flow.
#[cfg_attr(test, automock)]
pub trait Workspace {
    /// Switch HEAD and the working tree to a local branch.
    fn checkout(&self, branch: &str) -> Result<()>;
    fn local_branch_exists(&self, branch: &str) -> Result<bool>;
    /// Query the remote itself rather than local remote-tracking refs.
    fn remote_branch_exists(&self, branch: &str) -> Result<bool>;
    /// Update the remote-tracking ref for `branch`.
    fn fetch_branch(&self, branch: &str) -> Result<()>;
    /// Create (or force-move) a local branch at `start_point`, which may be a
    /// local branch, a remote branch or any revision.
    fn create_branch(&self, branch: &str, start_point: &str) -> Result<()>;
    fn reset_hard(&self, sha: &str) -> Result<()>;
    /// Add the given workdir-relative paths to the index. Missing paths are
    /// skipped.
    fn stage(&self, paths: &[String]) -> Result<()>;
    /// Whether the index differs from HEAD.
    fn has_staged_changes(&self) -> Result<bool>;
    /// Commit the index with `name <email>` as author and committer,
    /// returning the new commit sha.
    fn commit(&self, message: &str, name: &str, email: &str) -> Result<String>;
    fn push(&self, branch: &str, force: bool) -> Result<()>;
    /// Push a new branch and set its upstream.
    fn push_upstream(&self, branch: &str) -> Result<()>;
}

/// Create Git authentication callbacks for username/token authentication.
///
/// Rejected ref updates are turned into errors so a refused push is never
/// mistaken for a successful one.
fn get_auth_callbacks<'r>(user: String, token: String) -> RemoteCallbacks<'r> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, _allowed| {
        git2::Cred::userpass_plaintext(&user, &token)
    });
    callbacks.push_update_reference(|refname, status| match status {
        Some(msg) => Err(git2::Error::from_str(&format!(
            "push of {refname} rejected: {msg}"
        ))),
        None => Ok(()),
    });
    callbacks
}

/// Register `path` as a `safe.directory` in the global git config.
///
/// Runners often check out the workspace as a different user than the one
/// running this process, which libgit2 refuses to open otherwise.
pub fn mark_safe_directory(path: &Path) -> Result<()> {
    let global_path = match git2::Config::find_global() {
        Ok(path) => path,
        Err(_) => {
            let home = env::var("HOME").map_err(|_| {
                ReleaseError::invalid_config(
                    "HOME is not set: cannot locate global git config",
                )
            })?;
            PathBuf::from(home).join(".gitconfig")
        }
    };

    let dir = path.canonicalize()?.display().to_string();
    let mut config = git2::Config::open(&global_path)?;
    let existing = format!("^{}$", regex::escape(&dir));
    config.set_multivar("safe.directory", &existing, &dir)?;

    info!("marked {dir} as a safe git directory");

    Ok(())
}

/// Local repository handle bound to a single remote.
pub struct Repository {
    repo: git2::Repository,
    remote: String,
    token: SecretString,
    dry_run: bool,
}

impl Repository {
    /// Open the checkout at `path`, pushing to `remote` with `token`.
    pub fn open(
        path: &Path,
        remote: &str,
        token: SecretString,
        dry_run: bool,
    ) -> Result<Self> {
        let repo = git2::Repository::open(path)?;

        Ok(Self {
            repo,
            remote: remote.to_string(),
            token,
            dry_run,
        })
    }

    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or_else(|| {
            ReleaseError::invalid_config("repository has no working directory")
        })
    }

    /// Name of the branch HEAD points to, `None` when detached or unborn.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(err) if err.code() == ErrorCode::UnbornBranch => {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        if !head.is_branch() {
            return Ok(None);
        }

        Ok(head.shorthand().map(String::from))
    }

    fn callbacks(&self) -> RemoteCallbacks<'static> {
        get_auth_callbacks(
            TOKEN_AUTH_USER.to_string(),
            self.token.expose_secret().to_string(),
        )
    }

    fn resolve_commit(&self, rev: &str) -> Result<git2::Commit<'_>> {
        let candidates = [
            format!("refs/heads/{rev}"),
            format!("refs/remotes/{}/{rev}", self.remote),
        ];

        for candidate in candidates.iter() {
            if let Ok(reference) = self.repo.find_reference(candidate) {
                return Ok(reference.peel_to_commit()?);
            }
        }

        Ok(self.repo.revparse_single(rev)?.peel_to_commit()?)
    }
}

impl Workspace for Repository {
    fn checkout(&self, branch: &str) -> Result<()> {
        info!("switching to branch: {branch}");
        let ref_name = format!("refs/heads/{}", branch);
        let target_obj = self.repo.revparse_single(&ref_name)?;
        self.repo.checkout_tree(&target_obj, None)?;
        self.repo.set_head(&ref_name)?;
        Ok(())
    }

    fn local_branch_exists(&self, branch: &str) -> Result<bool> {
        match self.repo.find_branch(branch, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn remote_branch_exists(&self, branch: &str) -> Result<bool> {
        let mut remote = self.repo.find_remote(&self.remote)?;
        let connection =
            remote.connect_auth(Direction::Fetch, Some(self.callbacks()), None)?;

        let target = format!("refs/heads/{branch}");
        let exists = connection.list()?.iter().any(|head| head.name() == target);

        debug!("remote branch {branch} exists: {exists}");

        Ok(exists)
    }

    fn fetch_branch(&self, branch: &str) -> Result<()> {
        debug!("fetching branch {branch} from {}", self.remote);
        let mut remote = self.repo.find_remote(&self.remote)?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(self.callbacks());

        let ref_spec =
            format!("+refs/heads/{branch}:refs/remotes/{}/{branch}", self.remote);
        remote.fetch(&[ref_spec], Some(&mut fetch_options), None)?;

        Ok(())
    }

    fn create_branch(&self, branch: &str, start_point: &str) -> Result<()> {
        info!("creating branch {branch} from {start_point}");

        // libgit2 refuses to force-move the branch HEAD is attached to
        if self.current_branch()?.as_deref() == Some(branch) {
            let head = self.repo.head()?.peel_to_commit()?;
            self.repo.set_head_detached(head.id())?;
        }

        let commit = self.resolve_commit(start_point)?;
        self.repo.branch(branch, &commit, true)?;

        Ok(())
    }

    fn reset_hard(&self, sha: &str) -> Result<()> {
        info!("hard resetting working tree to {sha}");
        let target = self.repo.revparse_single(sha)?;
        self.repo.reset(&target, ResetType::Hard, None)?;
        Ok(())
    }

    fn stage(&self, paths: &[String]) -> Result<()> {
        let workdir = self.workdir()?;
        let mut index = self.repo.index()?;

        for path in paths {
            if !workdir.join(path).exists() {
                warn!("skipping missing file: {path}");
                continue;
            }
            debug!("adding {path} to index");
            index.add_path(Path::new(path))?;
        }

        index.write()?;

        Ok(())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        let head_tree = self.repo.head()?.peel_to_tree()?;
        let index = self.repo.index()?;
        let diff =
            self.repo
                .diff_tree_to_index(Some(&head_tree), Some(&index), None)?;
        Ok(diff.deltas().len() > 0)
    }

    fn commit(&self, message: &str, name: &str, email: &str) -> Result<String> {
        debug!("committing changes as {name} <{email}> with msg: {message}");
        let mut index = self.repo.index()?;
        let oid = index.write_tree()?;
        let tree = self.repo.find_tree(oid)?;
        let parent_commit = self.repo.head()?.peel_to_commit()?;
        let signature = git2::Signature::now(name, email)?;
        let commit = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent_commit],
        )?;
        Ok(commit.to_string())
    }

    fn push(&self, branch: &str, force: bool) -> Result<()> {
        if self.dry_run {
            warn!("dry_run: would push branch {branch} (force: {force})");
            return Ok(());
        }

        info!("pushing branch {branch} (force: {force})");

        let mut push_opts = git2::PushOptions::default();
        push_opts.remote_callbacks(self.callbacks());

        let mut remote = self.repo.find_remote(&self.remote)?;

        // + indicates "force" push
        let prefix = if force { "+" } else { "" };
        let ref_spec = format!("{prefix}refs/heads/{branch}:refs/heads/{branch}");
        remote.push(&[ref_spec], Some(&mut push_opts))?;

        Ok(())
    }

    fn push_upstream(&self, branch: &str) -> Result<()> {
        if self.dry_run {
            warn!("dry_run: would push new branch {branch}");
            return Ok(());
        }

        self.push(branch, false)?;

        let mut local = self.repo.find_branch(branch, BranchType::Local)?;
        let upstream = format!("{}/{branch}", self.remote);
        if let Err(err) = local.set_upstream(Some(&upstream)) {
            warn!("failed to set upstream of {branch} to {upstream}: {err}");
        }

        Ok(())
    }
}
