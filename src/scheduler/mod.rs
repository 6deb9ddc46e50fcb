//! Client for the fleet scheduler (`fleetctl`).
//!
//! Every call builds the argument vector the same way: host key checking off,
//! then either `--endpoint` (when endpoints are configured) or `--tunnel`,
//! then the pass-through options, then the subcommand.

use crate::output::UserOutput;
use crate::process::{command_line, CommandRunner, Execution};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

pub const FLEETCTL: &str = "fleetctl";

/// Tunnel address used when no endpoints are configured.
pub const DEFAULT_TUNNEL: &str = "172.17.8.101";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetOptions {
    /// Comma separated endpoint list. `None` selects tunnel mode.
    pub endpoints: Option<String>,
    pub tunnel: String,
    /// Extra options passed before the subcommand.
    pub extra: Vec<String>,
    /// Status exit code meaning the unit is still starting.
    pub starting_code: Option<i32>,
}

impl Default for FleetOptions {
    fn default() -> Self {
        Self {
            endpoints: None,
            tunnel: DEFAULT_TUNNEL.to_string(),
            extra: Vec::new(),
            starting_code: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    Recent,
    Follow,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetCommand {
    Submit,
    Load,
    Start,
    Stop,
    Destroy,
    Status,
    Journal(JournalMode),
    ListMachines,
    ListUnits,
    ListUnitFiles,
}

impl FleetCommand {
    pub fn args(&self) -> Vec<String> {
        let args: &[&str] = match self {
            FleetCommand::Submit => &["submit"],
            FleetCommand::Load => &["load"],
            FleetCommand::Start => &["start"],
            FleetCommand::Stop => &["stop"],
            FleetCommand::Destroy => &["destroy"],
            FleetCommand::Status => &["status"],
            FleetCommand::Journal(JournalMode::Recent) => &["journal"],
            FleetCommand::Journal(JournalMode::Follow) => &["journal", "-f"],
            FleetCommand::Journal(JournalMode::All) => &["journal", "-lines=10000"],
            FleetCommand::ListMachines => &["list-machines"],
            FleetCommand::ListUnits => &["list-units"],
            FleetCommand::ListUnitFiles => &["list-unit-files"],
        };
        args.iter().map(|arg| arg.to_string()).collect()
    }

    /// Status and journal output is prefixed with a unit header.
    pub fn has_header(&self) -> bool {
        matches!(self, FleetCommand::Status | FleetCommand::Journal(_))
    }
}

/// `fleetctl` wrapper.
#[derive(Clone)]
pub struct Fleet {
    runner: Arc<dyn CommandRunner>,
    options: FleetOptions,
}

impl Fleet {
    pub fn new(runner: Arc<dyn CommandRunner>, options: FleetOptions) -> Self {
        Self { runner, options }
    }

    pub fn options(&self) -> &FleetOptions {
        &self.options
    }

    /// Full argument vector for `args`, without the program name.
    pub fn argv(&self, args: &[String]) -> Vec<String> {
        let mut argv = vec!["--strict-host-key-checking=false".to_string()];
        match self.options.endpoints.as_deref().filter(|e| !e.is_empty()) {
            Some(endpoints) => {
                argv.push("--endpoint".to_string());
                argv.push(endpoints.to_string());
            }
            None => {
                argv.push("--tunnel".to_string());
                argv.push(self.options.tunnel.clone());
            }
        }
        argv.extend(self.options.extra.iter().cloned());
        argv.extend(args.iter().cloned());
        argv
    }

    /// Launch `fleetctl` with raw subcommand arguments.
    pub async fn exec(&self, args: &[String]) -> Execution {
        let argv = self.argv(args);
        let line = command_line(FLEETCTL, &argv);
        if args.first().is_some_and(|arg| arg.starts_with("list-")) {
            tracing::info!("running {}", line);
        } else {
            tracing::debug!("running {}", line);
        }
        self.runner.execute(FLEETCTL, &argv).await
    }

    /// Launch `command`, optionally against one unit file.
    pub async fn command(&self, command: FleetCommand, unit: Option<&Path>) -> Execution {
        let mut args = command.args();
        if let Some(unit) = unit {
            args.push(unit.display().to_string());
        }
        self.exec(&args).await
    }

    /// Run raw arguments, streaming output verbatim. Returns the exit code.
    pub async fn stream(&self, args: &[String], out: &dyn UserOutput) -> i32 {
        let execution = self.exec(args).await;
        display(execution, out).await
    }

    /// Run `command`, streaming output verbatim. Returns the exit code.
    pub async fn run(
        &self,
        command: FleetCommand,
        unit: Option<&Path>,
        out: &dyn UserOutput,
    ) -> i32 {
        let execution = self.command(command, unit).await;
        display(execution, out).await
    }

    /// Whether `status` succeeds (or reports the configured starting code) for `unit`.
    pub async fn is_running(&self, unit: &Path) -> bool {
        let code = self
            .command(FleetCommand::Status, Some(unit))
            .await
            .exit_code()
            .await;
        code == 0 || self.is_starting(code)
    }

    pub fn is_starting(&self, code: i32) -> bool {
        self.options.starting_code == Some(code)
    }
}

async fn display(mut execution: Execution, out: &dyn UserOutput) -> i32 {
    while let Some(line) = execution.next_line().await {
        out.status(&line);
    }
    execution.exit_code().await
}
