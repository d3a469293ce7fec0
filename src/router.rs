//! Maps an inbound event to exactly one [`Decision`].
//!
//! Rules are evaluated top to bottom and the first match wins. Only
//! [`Rule::RcMergeCommitPush`] talks to the hosting platform, and only with
//! read calls.
use log::*;
use std::fmt;

use crate::{
    config::Config,
    error::Result,
    event::{EventKind, ReleaseEvent},
    forge::{manager::ForgeManager, request::PrState},
    rc_branch::RcBranch,
};

/// Why an event is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Push made by the bump actor itself.
    SelfTriggered { actor: String },
    NonReleaseBranch { ref_name: String },
    /// Push of a merged RC pull request; the merge event handles it.
    RcMergeCommit { pr_number: u64 },
    NotRcBranch { head_ref: String },
    UnhandledEvent { event: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SelfTriggered { actor } => {
                write!(f, "push by bump actor {actor}")
            }
            SkipReason::NonReleaseBranch { ref_name } => {
                write!(f, "{ref_name} is not a release branch")
            }
            SkipReason::RcMergeCommit { pr_number } => {
                write!(f, "commit is the merge of RC pull request #{pr_number}")
            }
            SkipReason::NotRcBranch { head_ref } => {
                write!(f, "{head_ref} is not a release candidate branch")
            }
            SkipReason::UnhandledEvent { event } => {
                write!(f, "unhandled event: {event}")
            }
        }
    }
}

/// The single outcome of routing an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    /// Sync the release candidate for `base_ref`.
    Push { base_ref: String },
    /// Promote a merged release candidate.
    Merge { version: String },
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Skip(reason) => write!(f, "skip ({reason})"),
            Decision::Push { base_ref } => {
                write!(f, "sync release candidate for {base_ref}")
            }
            Decision::Merge { version } => write!(f, "release {version}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    SelfTriggeredPush,
    NonReleaseBranchPush,
    RcMergeCommitPush,
    ReleaseBranchPush,
    MergedRcPullRequest,
    MergedNonRcPullRequest,
    Unhandled,
}

/// Evaluation order.
pub const RULES: [Rule; 7] = [
    Rule::SelfTriggeredPush,
    Rule::NonReleaseBranchPush,
    Rule::RcMergeCommitPush,
    Rule::ReleaseBranchPush,
    Rule::MergedRcPullRequest,
    Rule::MergedNonRcPullRequest,
    Rule::Unhandled,
];

impl Rule {
    /// Whether evaluating this rule for `event` queries the hosting platform.
    pub fn needs_forge(&self, event: &ReleaseEvent) -> bool {
        *self == Rule::RcMergeCommitPush && event.kind == EventKind::Push
    }

    /// `None` when the rule does not apply to the event.
    pub async fn evaluate(
        &self,
        event: &ReleaseEvent,
        config: &Config,
        forge: &ForgeManager,
    ) -> Result<Option<Decision>> {
        if !self.needs_forge(event) {
            return Ok(self.evaluate_local(event, config));
        }

        let prs = forge.get_commit_prs(&event.commit_sha).await?;

        let decision = prs
            .into_iter()
            .find(|pr| {
                pr.state == PrState::Merged
                    && RcBranch::parse(&pr.head_ref).is_some()
            })
            .map(|pr| {
                Decision::Skip(SkipReason::RcMergeCommit {
                    pr_number: pr.number,
                })
            });

        Ok(decision)
    }

    /// Evaluation from the event and config alone. Rules that need the
    /// hosting platform never match here.
    fn evaluate_local(
        &self,
        event: &ReleaseEvent,
        config: &Config,
    ) -> Option<Decision> {
        let is_push = event.kind == EventKind::Push;

        match self {
            Rule::SelfTriggeredPush => (is_push
                && event.actor == config.bump_actor.name)
                .then(|| {
                    Decision::Skip(SkipReason::SelfTriggered {
                        actor: event.actor.clone(),
                    })
                }),
            Rule::NonReleaseBranchPush => (is_push
                && !config.is_release_branch(&event.ref_name))
            .then(|| {
                Decision::Skip(SkipReason::NonReleaseBranch {
                    ref_name: event.ref_name.clone(),
                })
            }),
            Rule::RcMergeCommitPush => None,
            Rule::ReleaseBranchPush => is_push.then(|| Decision::Push {
                base_ref: event.ref_name.clone(),
            }),
            Rule::MergedRcPullRequest => {
                if !event.is_closed_merged_pr() {
                    return None;
                }

                event
                    .head_ref
                    .as_deref()
                    .and_then(RcBranch::parse)
                    .map(|rc| Decision::Merge {
                        version: rc.version,
                    })
            }
            Rule::MergedNonRcPullRequest => {
                event.is_closed_merged_pr().then(|| {
                    Decision::Skip(SkipReason::NotRcBranch {
                        head_ref: event.head_ref.clone().unwrap_or_default(),
                    })
                })
            }
            Rule::Unhandled => {
                let mut name = event.kind.to_string();
                if let Some(action) = &event.action {
                    name = format!("{name}.{action}");
                }
                Some(Decision::Skip(SkipReason::UnhandledEvent { event: name }))
            }
        }
    }
}

/// Routes without the hosting platform. Returns `None` as soon as a rule
/// that needs it is reached, otherwise the same decision as
/// [`EventRouter::route`].
pub fn route_local(event: &ReleaseEvent, config: &Config) -> Option<Decision> {
    for rule in RULES.iter() {
        if rule.needs_forge(event) {
            debug!("rule {rule:?} needs the hosting platform");
            return None;
        }
        if let Some(decision) = rule.evaluate_local(event, config) {
            debug!("matched rule {rule:?} locally: {decision}");
            return Some(decision);
        }
    }
    None
}

pub struct EventRouter<'a> {
    config: &'a Config,
    forge: &'a ForgeManager,
}

impl<'a> EventRouter<'a> {
    /// Router over the resolved config and the run's forge handle.
    pub fn new(config: &'a Config, forge: &'a ForgeManager) -> Self {
        Self { config, forge }
    }

    /// First matching rule's decision for `event`.
    pub async fn route(&self, event: &ReleaseEvent) -> Result<Decision> {
        for rule in RULES.iter() {
            if let Some(decision) =
                rule.evaluate(event, self.config, self.forge).await?
            {
                info!("matched rule {rule:?}: {decision}");
                return Ok(decision);
            }
            debug!("rule {rule:?} did not match");
        }

        // RULES ends with a catch-all
        Ok(Decision::Skip(SkipReason::UnhandledEvent {
            event: event.kind.to_string(),
        }))
    }
}
