use super::Orchestrator;
use crate::deployment::Deployment;
use crate::error::{Error, Result};
use crate::process::{CommandRunner, ProcessRunner};
use crate::prompt::{Prompt, TerminalPrompt};
use crate::scheduler::{Fleet, FleetOptions};
use crate::template::{UnitRenderer, UnitTemplates};
use std::sync::Arc;

/// Builder for constructing an `Orchestrator` with a fluent API.
///
/// Only the deployment is required. The command runner, renderer and prompt
/// default to real child processes, the built-in templates and the terminal.
///
/// # Example
///
/// ```no_run
/// use maestro::config::Parser;
/// use maestro::naming::NamingContext;
/// use maestro::{Deployment, Orchestrator};
///
/// # fn example() -> Result<(), maestro::Error> {
/// let app = Parser::new().load_config("maestro.json")?;
/// let ctx = NamingContext::new("alice", "maestro.io", "/share/maestro", "/home/alice/.maestro");
/// let orchestrator = Orchestrator::builder()
///     .deployment(Deployment::resolve(&app, &ctx))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct OrchestratorBuilder {
    deployment: Option<Deployment>,
    runner: Option<Arc<dyn CommandRunner>>,
    fleet_options: FleetOptions,
    renderer: Option<Arc<dyn UnitRenderer>>,
    prompt: Option<Arc<dyn Prompt>>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            deployment: None,
            runner: None,
            fleet_options: FleetOptions::default(),
            renderer: None,
            prompt: None,
        }
    }

    /// Set the resolved deployment. Required.
    pub fn deployment(mut self, deployment: Deployment) -> Self {
        self.deployment = Some(deployment);
        self
    }

    /// Replace the runner used to launch `fleetctl`.
    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn fleet_options(mut self, options: FleetOptions) -> Self {
        self.fleet_options = options;
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn UnitRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Replace the confirmation source used by `nuke --all`.
    pub fn prompt(mut self, prompt: Arc<dyn Prompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the deployment is not set.
    pub fn build(self) -> Result<Orchestrator> {
        let deployment = self
            .deployment
            .ok_or_else(|| Error::Config("deployment is required".to_string()))?;

        let runner = self.runner.unwrap_or_else(|| Arc::new(ProcessRunner));
        let renderer = self
            .renderer
            .unwrap_or_else(|| Arc::new(UnitTemplates::default()));
        let prompt = self.prompt.unwrap_or_else(|| Arc::new(TerminalPrompt));

        Ok(Orchestrator {
            deployment,
            fleet: Fleet::new(runner, self.fleet_options),
            renderer,
            prompt,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
