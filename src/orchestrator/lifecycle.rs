use super::core::check_unit_path;
use super::Orchestrator;
use crate::error::Result;
use crate::output::UserOutput;
use crate::scheduler::{FleetCommand, JournalMode};

const RUN_SEQUENCE: [FleetCommand; 3] = [
    FleetCommand::Submit,
    FleetCommand::Load,
    FleetCommand::Start,
];

impl Orchestrator {
    /// Build, then submit, load and start every replica that is not already running.
    ///
    /// `target` narrows the operation to one replica or one component.
    pub async fn run(&self, target: Option<&str>, out: &dyn UserOutput) -> Result<i32> {
        let targets = self.deployment.run_targets(target)?;
        self.build_local_units(out)?;
        for unit in &targets {
            check_unit_path(&unit.path)?;
        }

        let mut total = 0;
        for unit in &targets {
            if self.fleet.is_running(&unit.path).await {
                out.warning(&format!("unit {} already running", unit.name));
                continue;
            }
            for command in RUN_SEQUENCE {
                total += self.fleet.run(command, Some(&unit.path), out).await;
            }
        }
        out.status("check results with maestro status | maestro journal <unit name>");
        Ok(total)
    }

    pub async fn stop(&self, target: Option<&str>, out: &dyn UserOutput) -> Result<i32> {
        let targets = self.deployment.run_targets(target)?;
        self.exec_on_units(FleetCommand::Stop, &targets, out).await
    }

    /// Destroy replicas on the cluster.
    pub async fn nuke(&self, target: Option<&str>, out: &dyn UserOutput) -> Result<i32> {
        let targets = self.deployment.run_targets(target)?;
        self.exec_on_units(FleetCommand::Destroy, &targets, out).await
    }

    pub async fn status(&self, target: Option<&str>, out: &dyn UserOutput) -> Result<i32> {
        let targets = self.deployment.run_targets(target)?;
        self.exec_on_units(FleetCommand::Status, &targets, out).await
    }

    pub async fn journal(
        &self,
        target: Option<&str>,
        mode: JournalMode,
        out: &dyn UserOutput,
    ) -> Result<i32> {
        let targets = self.deployment.run_targets(target)?;
        self.exec_on_units(FleetCommand::Journal(mode), &targets, out)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::orchestrator::testing::Fixture;
    use crate::scheduler::{FleetOptions, JournalMode};

    #[tokio::test]
    async fn run_skips_running_replicas() {
        let f = Fixture::new(false);
        f.runner.reply("status alice_prod_app1_db@1.service", &[], 0);
        f.runner.reply("status alice_prod_app1_web@1.service", &[], 0);
        f.runner.reply("status alice_prod_app1_web@2.service", &["inactive"], 1);
        f.runner.reply("start alice_prod_app1_web@2.service", &["failed"], 2);

        let total = f.orchestrator.run(None, &f.out).await.unwrap();

        assert_eq!(total, 2);
        assert_eq!(
            f.runner.short_calls(),
            vec![
                "status alice_prod_app1_db@1.service",
                "status alice_prod_app1_web@1.service",
                "status alice_prod_app1_web@2.service",
                "submit alice_prod_app1_web@2.service",
                "load alice_prod_app1_web@2.service",
                "start alice_prod_app1_web@2.service",
            ]
        );
        assert!(f
            .out
            .lines()
            .contains(&"unit alice_prod_app1_web@1 already running".to_string()));
    }

    #[tokio::test]
    async fn rerun_issues_no_submit() {
        let f = Fixture::new(false);
        let total = f.orchestrator.run(None, &f.out).await.unwrap();
        assert_eq!(total, 0);
        assert!(f.runner.short_calls().iter().all(|c| c.starts_with("status")));
    }

    #[tokio::test]
    async fn run_single_replica() {
        let f = Fixture::new(false);
        f.runner.reply("status alice_prod_app1_web@2.service", &[], 1);

        let total = f
            .orchestrator
            .run(Some("alice_prod_app1_web@2"), &f.out)
            .await
            .unwrap();

        assert_eq!(total, 0);
        assert_eq!(f.runner.calls().len(), 4);
    }

    #[tokio::test]
    async fn stop_sums_exit_codes_and_continues() {
        let f = Fixture::new(false);
        f.orchestrator.build_local_units(&f.out).unwrap();
        f.runner.reply("stop alice_prod_app1_db@1.service", &[], 1);
        f.runner.reply("stop alice_prod_app1_web@1.service", &[], 2);

        let total = f.orchestrator.stop(None, &f.out).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(f.runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn nuke_without_build_is_fatal() {
        let f = Fixture::new(false);
        let result = f.orchestrator.nuke(None, &f.out).await;
        assert!(matches!(result, Err(Error::UnitFileMissing(_))));
        assert!(f.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn nuke_component_destroys_its_replicas() {
        let f = Fixture::new(false);
        f.orchestrator.build_local_units(&f.out).unwrap();
        f.orchestrator.nuke(Some("web"), &f.out).await.unwrap();
        assert_eq!(
            f.runner.short_calls(),
            vec![
                "destroy alice_prod_app1_web@1.service",
                "destroy alice_prod_app1_web@2.service"
            ]
        );
    }

    #[tokio::test]
    async fn status_prints_unit_headers() {
        let f = Fixture::new(false);
        f.orchestrator.build_local_units(&f.out).unwrap();
        f.runner.reply("status alice_prod_app1_db@1.service", &["db active"], 0);

        f.orchestrator.status(Some("db"), &f.out).await.unwrap();

        let lines = f.out.lines();
        let tail = &lines[lines.len() - 2..];
        assert_eq!(tail, ["maestro unit: alice_prod_app1_db@1", "db active"]);
    }

    #[tokio::test]
    async fn starting_status_counts_as_success() {
        let f = Fixture::with_options(
            false,
            FleetOptions {
                starting_code: Some(4),
                ..Default::default()
            },
        );
        f.orchestrator.build_local_units(&f.out).unwrap();
        f.runner.reply("status alice_prod_app1_web@1.service", &[], 4);
        f.runner.reply("status alice_prod_app1_web@2.service", &[], 3);

        let total = f.orchestrator.status(Some("web"), &f.out).await.unwrap();

        assert_eq!(total, 3);
        assert!(f
            .out
            .lines()
            .contains(&"unit alice_prod_app1_web@1 is still starting".to_string()));
    }

    #[tokio::test]
    async fn journal_follow() {
        let f = Fixture::new(false);
        f.orchestrator.build_local_units(&f.out).unwrap();
        f.orchestrator
            .journal(Some("db"), JournalMode::Follow, &f.out)
            .await
            .unwrap();
        assert_eq!(
            f.runner.short_calls(),
            vec!["journal -f alice_prod_app1_db@1.service"]
        );
    }

    #[tokio::test]
    async fn unknown_target_is_fatal() {
        let f = Fixture::new(false);
        let result = f.orchestrator.stop(Some("cache"), &f.out).await;
        assert!(matches!(result, Err(Error::UnitNotFound(_))));
    }
}
