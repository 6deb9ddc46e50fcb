//! Cluster-wide operations that do not depend on the app configuration.

use super::Orchestrator;
use crate::error::Result;
use crate::output::UserOutput;
use crate::scheduler::FleetCommand;
use regex::Regex;
use std::sync::OnceLock;

const CORE_LISTINGS: [FleetCommand; 3] = [
    FleetCommand::ListMachines,
    FleetCommand::ListUnits,
    FleetCommand::ListUnitFiles,
];

static SERVICE_UNIT_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_service_unit_regex() -> &'static Regex {
    SERVICE_UNIT_REGEX
        .get_or_init(|| Regex::new(r"^(\S+\.service)(\s|$)").expect("static regex pattern is valid"))
}

/// The unit name at the start of a `list-units` / `list-unit-files` line.
pub fn service_unit(line: &str) -> Option<&str> {
    get_service_unit_regex()
        .captures(line.trim_start())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

impl Orchestrator {
    /// `list-machines`, `list-units` and `list-unit-files`, streamed.
    pub async fn core_status(&self, out: &dyn UserOutput) -> i32 {
        out.status("executing global status for coreos cluster");
        let mut total = 0;
        for (i, listing) in CORE_LISTINGS.iter().enumerate() {
            if i > 0 {
                out.blank();
            }
            total += self.fleet.run(*listing, None, out).await;
        }
        total
    }

    /// Destroy every service unit the scheduler knows about, after confirmation.
    ///
    /// Both listings are gathered before asking. A failed listing aborts with
    /// its exit code; a declined confirmation destroys nothing and returns 0.
    pub async fn nuke_all(&self, out: &dyn UserOutput) -> Result<i32> {
        let mut units: Vec<String> = Vec::new();
        for listing in [FleetCommand::ListUnits, FleetCommand::ListUnitFiles] {
            let (lines, code) = self.fleet.command(listing, None).await.collect().await;
            if code != 0 {
                for line in &lines {
                    out.status(line);
                }
                out.error("could not list cluster units, nothing destroyed");
                return Ok(code);
            }
            for unit in lines.iter().filter_map(|line| service_unit(line)) {
                if !units.iter().any(|known| known == unit) {
                    units.push(unit.to_string());
                }
            }
        }

        if units.is_empty() {
            out.status("no units found on the cluster");
            return Ok(0);
        }

        let question = format!(
            "are you sure you want to nuke ALL {} units on this cluster? [y/N] ",
            units.len()
        );
        if !self.prompt.confirm(&question)? {
            out.status("nuke aborted");
            return Ok(0);
        }

        let mut total = 0;
        for unit in &units {
            let args = vec!["destroy".to_string(), unit.clone()];
            total += self.fleet.stream(&args, out).await;
        }
        Ok(total)
    }

    /// Pass `args` straight to `fleetctl`.
    pub async fn exec(&self, args: &[String], out: &dyn UserOutput) -> i32 {
        self.fleet.stream(args, out).await
    }
}
