use crate::deployment::{Deployment, UnitTarget};
use crate::error::{Error, Result};
use crate::naming;
use crate::output::UserOutput;
use crate::prompt::Prompt;
use crate::scheduler::{Fleet, FleetCommand};
use crate::template::UnitRenderer;
use std::path::Path;
use std::sync::Arc;

/// Drives the scheduler for every unit of a resolved deployment.
///
/// Operations walk stages, components and replicas in configuration order
/// and issue one scheduler command at a time. Each operation returns the sum
/// of the exit codes of the commands it issued; only local problems (missing
/// unit files, render failures, unknown targets) are returned as errors.
///
/// # Example
///
/// ```no_run
/// use maestro::output::CliOutput;
/// use maestro::{Deployment, Orchestrator};
///
/// # async fn example(deployment: Deployment) -> Result<(), maestro::Error> {
/// let orchestrator = Orchestrator::builder().deployment(deployment).build()?;
/// let total = orchestrator.run(None, &CliOutput).await?;
/// println!("maestro exit code: {}", total);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    pub(super) deployment: Deployment,
    pub(super) fleet: Fleet,
    pub(super) renderer: Arc<dyn UnitRenderer>,
    pub(super) prompt: Arc<dyn Prompt>,
}

impl Orchestrator {
    pub fn builder() -> crate::orchestrator::OrchestratorBuilder {
        crate::orchestrator::OrchestratorBuilder::new()
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Run `command` against each target in order and sum the exit codes.
    ///
    /// All unit files are checked before the first command is issued.
    pub(super) async fn exec_on_units(
        &self,
        command: FleetCommand,
        targets: &[UnitTarget],
        out: &dyn UserOutput,
    ) -> Result<i32> {
        for target in targets {
            check_unit_path(&target.path)?;
        }

        let mut total = 0;
        for target in targets {
            if command.has_header() {
                out.status(&format!("maestro unit: {}", target.name));
            }
            let code = self.fleet.run(command, Some(&target.path), out).await;
            total += self.normalize(command, target, code, out);
        }
        Ok(total)
    }

    /// A status query reporting the configured starting code counts as success.
    fn normalize(
        &self,
        command: FleetCommand,
        target: &UnitTarget,
        code: i32,
        out: &dyn UserOutput,
    ) -> i32 {
        if command == FleetCommand::Status && code != 0 && self.fleet.is_starting(code) {
            out.status(&format!("unit {} is still starting", target.name));
            0
        } else {
            code
        }
    }
}

/// Fail unless the unit file behind `path` exists locally.
///
/// Replica paths are checked against their run-unit template file.
pub fn check_unit_path(path: &Path) -> Result<()> {
    let template = naming::template_unit_path(path);
    if template.is_file() {
        Ok(())
    } else {
        Err(Error::UnitFileMissing(template))
    }
}

/// Process exit status for an aggregated total: 0 stays 0, anything else stays non-zero.
pub fn exit_status(total: i32) -> i32 {
    match total {
        0 => 0,
        1..=255 => total,
        t if t > 255 => 255,
        _ => 1,
    }
}
