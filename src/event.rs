//! The webhook event that triggered this run.
use log::*;
use serde::Deserialize;
use std::{fmt, fs, path::Path};

use crate::{
    cli::Args,
    error::{ReleaseError, Result},
};

/// Kind of webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Push,
    PullRequest,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "push" => EventKind::Push,
            "pull_request" => EventKind::PullRequest,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Push => write!(f, "push"),
            EventKind::PullRequest => write!(f, "pull_request"),
            EventKind::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Immutable description of the triggering event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEvent {
    pub kind: EventKind,
    /// Activity type, e.g. "closed" for pull requests.
    pub action: Option<String>,
    /// Short name of the ref that triggered the event.
    pub ref_name: String,
    pub head_ref: Option<String>,
    pub base_ref: Option<String>,
    pub commit_sha: String,
    pub actor: String,
    /// Whether a pull_request event refers to a merged pull request.
    pub merged: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RefPayload {
    #[serde(rename = "ref")]
    ref_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PullRequestPayload {
    merged: bool,
    head: RefPayload,
    base: RefPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SenderPayload {
    login: Option<String>,
}

/// Subset of the webhook payload file the release flow reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventPayload {
    action: Option<String>,
    pull_request: Option<PullRequestPayload>,
    sender: Option<SenderPayload>,
}

impl EventPayload {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("reading event payload from {}", path.display());
        let content = fs::read_to_string(path).map_err(|err| {
            ReleaseError::invalid_event(format!(
                "failed to read event payload {}: {err}",
                path.display()
            ))
        })?;
        Self::parse(&content)
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

impl ReleaseEvent {
    /// Build the event from the runner environment and its payload file.
    pub fn from_args(args: &Args) -> Result<Self> {
        let payload = match args.event_path.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => {
                EventPayload::load(path)?
            }
            _ => {
                warn!("no event payload available");
                EventPayload::default()
            }
        };

        Self::build(args, payload)
    }

    /// The payload only fills in what the environment leaves unset.
    pub fn build(args: &Args, payload: EventPayload) -> Result<Self> {
        if args.event_name.is_empty() {
            return Err(ReleaseError::invalid_event("event name is empty"));
        }

        if args.sha.is_empty() {
            return Err(ReleaseError::invalid_event("commit sha is empty"));
        }

        let pull_request = payload.pull_request.unwrap_or_default();

        let head_ref = non_empty(args.head_ref.as_ref())
            .or_else(|| non_empty(pull_request.head.ref_name.as_ref()));

        let base_ref = non_empty(args.base_ref.as_ref())
            .or_else(|| non_empty(pull_request.base.ref_name.as_ref()));

        let actor = non_empty(Some(&args.actor))
            .or_else(|| payload.sender.and_then(|s| s.login))
            .unwrap_or_default();

        let event = Self {
            kind: EventKind::from(args.event_name.as_str()),
            action: payload.action,
            ref_name: args.ref_name.clone(),
            head_ref,
            base_ref,
            commit_sha: args.sha.clone(),
            actor,
            merged: pull_request.merged,
        };

        info!(
            "event: {} ref={} actor={} sha={}",
            event.kind, event.ref_name, event.actor, event.commit_sha
        );

        Ok(event)
    }

    /// Whether this is the `closed` event of a merged pull request.
    pub fn is_closed_merged_pr(&self) -> bool {
        self.kind == EventKind::PullRequest
            && self.action.as_deref() == Some("closed")
            && self.merged
    }
}
