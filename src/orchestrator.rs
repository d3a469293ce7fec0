//! One invocation: event → decision → handler → step outputs.
use derive_builder::Builder;
use log::*;
use std::rc::Rc;

use crate::{
    changelog::{git_cliff::GitCliff, traits::Changelog},
    cli::Args,
    config::{Config, FileConfig, resolver::ConfigResolverBuilder},
    error::{ReleaseError, Result},
    event::ReleaseEvent,
    forge::{config::RemoteConfig, github::Github, manager::ForgeManager},
    handler::{MergeHandler, PushHandler},
    manifest::{CommandManifestEditor, ManifestEditor},
    outputs::ActionOutputs,
    repo::{Repository, Workspace, mark_safe_directory},
    router::{Decision, EventRouter, route_local},
};

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct OrchestratorParams {
    pub config: Rc<Config>,
    pub forge: Rc<ForgeManager>,
    pub workspace: Rc<dyn Workspace>,
    pub manifest: Rc<dyn ManifestEditor>,
    pub changelog: Rc<dyn Changelog>,
}

impl OrchestratorParamsBuilder {
    /// Build the orchestrator, failing when a component is missing.
    pub fn build(&self) -> Result<Orchestrator> {
        let params = self._build().map_err(|e| {
            ReleaseError::invalid_config(format!(
                "Failed to build orchestrator: {}",
                e
            ))
        })?;
        Ok(Orchestrator::new(params))
    }
}

pub struct Orchestrator {
    config: Rc<Config>,
    forge: Rc<ForgeManager>,
    workspace: Rc<dyn Workspace>,
    manifest: Rc<dyn ManifestEditor>,
    changelog: Rc<dyn Changelog>,
}

impl Orchestrator {
    /// Start building an orchestrator from its shared components.
    pub fn builder() -> OrchestratorParamsBuilder {
        OrchestratorParamsBuilder::default()
    }

    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            config: params.config,
            forge: params.forge,
            workspace: params.workspace,
            manifest: params.manifest,
            changelog: params.changelog,
        }
    }

    /// Route `event` and carry out the decision.
    pub async fn run(&self, event: &ReleaseEvent) -> Result<ActionOutputs> {
        let router = EventRouter::new(&self.config, &self.forge);

        let outputs = match router.route(event).await? {
            Decision::Skip(reason) => {
                info!("nothing to do: {reason}");
                ActionOutputs::default()
            }
            Decision::Push { base_ref } => {
                let handler = PushHandler::new(
                    &self.config,
                    &self.forge,
                    self.workspace.as_ref(),
                    self.manifest.as_ref(),
                    self.changelog.as_ref(),
                );
                let outcome = handler.handle(&base_ref).await?;

                let verb = if outcome.created { "opened" } else { "updated" };
                info!(
                    "{verb} release candidate pull request (#{}) for {}: {}",
                    outcome.pr.number, outcome.rc_branch, outcome.pr.url
                );

                ActionOutputs::for_push(&outcome.body)
            }
            Decision::Merge { version } => {
                let handler =
                    MergeHandler::new(&self.forge, self.changelog.as_ref());
                let outcome = handler.handle(&version, &event.commit_sha).await?;
                ActionOutputs::for_merge(&outcome.release.notes)
            }
        };

        Ok(outputs)
    }
}

/// Build every component from the runner environment and run once,
/// writing the step outputs on success.
pub async fn execute(args: &Args) -> Result<()> {
    let event = ReleaseEvent::from_args(args)?;

    let file_config = FileConfig::load(&args.workspace, args.config.as_deref())?;
    let config = ConfigResolverBuilder::default()
        .file_config(file_config)
        .overrides(args.overrides.clone())
        .build()
        .map_err(|e| {
            ReleaseError::invalid_config(format!(
                "Failed to build config resolver: {}",
                e
            ))
        })?
        .resolve()?;
    debug!("resolved config: {config:#?}");

    // Skips that need neither the token nor the hosting platform
    if let Some(Decision::Skip(reason)) = route_local(&event, &config) {
        info!("nothing to do: {reason}");
        return ActionOutputs::default().write(args.output.as_deref());
    }

    let remote_config = RemoteConfig::from_repository(
        &args.repository,
        args.token.as_deref(),
        &args.api_url,
        args.dry_run,
    )?;

    if args.safe_directory {
        mark_safe_directory(&args.workspace)?;
    }

    let workspace: Rc<dyn Workspace> = Rc::new(Repository::open(
        &args.workspace,
        &config.remote,
        remote_config.token.clone(),
        args.dry_run,
    )?);

    let github = Github::new(remote_config).await?;
    let forge = ForgeManager::new(Box::new(github));

    let changelog: Rc<dyn Changelog> =
        Rc::new(GitCliff::new(&config.changelog_tool, &args.workspace));
    let manifest: Rc<dyn ManifestEditor> = Rc::new(CommandManifestEditor::new(
        &config.version_command,
        &args.workspace,
    )?);

    let orchestrator = Orchestrator::builder()
        .config(config)
        .forge(forge)
        .workspace(workspace)
        .manifest(manifest)
        .changelog(changelog)
        .build()?;

    let outputs = orchestrator.run(&event).await?;

    outputs.write(args.output.as_deref())
}
