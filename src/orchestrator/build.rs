use super::core::check_unit_path;
use super::Orchestrator;
use crate::error::Result;
use crate::output::UserOutput;
use crate::scheduler::FleetCommand;
use crate::template::TemplateId;

/// Commands that rebuild and publish an image through a build unit.
const BUILD_SEQUENCE: [FleetCommand; 4] = [
    FleetCommand::Destroy,
    FleetCommand::Submit,
    FleetCommand::Load,
    FleetCommand::Start,
];

impl Orchestrator {
    /// Render every run unit, plus a build unit for components with a git source.
    ///
    /// No scheduler interaction. Re-rendering produces identical files.
    pub fn build_local_units(&self, out: &dyn UserOutput) -> Result<()> {
        self.deployment.prepare_dirs()?;

        for component in self.deployment.components() {
            let label = format!(
                "{}/{}/{}/{}",
                component.username, component.stage, component.app, component.name
            );
            out.status(&format!("building run unit for {}", label));
            self.renderer
                .render(component, &component.unit_path, TemplateId::RunUnit)?;

            if let Some(ref path) = component.build_unit_path {
                out.status(&format!("building build unit for {}", label));
                self.renderer.render(component, path, TemplateId::BuildUnit)?;
            }
        }
        Ok(())
    }

    /// Build, then destroy, submit, load and start each build unit.
    pub async fn build_images(&self, target: Option<&str>, out: &dyn UserOutput) -> Result<i32> {
        let targets = self.deployment.build_targets(target)?;
        self.build_local_units(out)?;
        for unit in &targets {
            check_unit_path(&unit.path)?;
        }

        let mut total = 0;
        for unit in &targets {
            tracing::debug!("building image with {}", unit.name);
            for command in BUILD_SEQUENCE {
                total += self.fleet.run(command, Some(&unit.path), out).await;
            }
        }
        out.status("check results with maestro buildstatus <unit name>");
        Ok(total)
    }

    pub async fn build_status(&self, target: Option<&str>, out: &dyn UserOutput) -> Result<i32> {
        let targets = self.deployment.build_targets(target)?;
        self.exec_on_units(FleetCommand::Status, &targets, out).await
    }

    /// Destroy build units.
    pub async fn build_nuke(&self, target: Option<&str>, out: &dyn UserOutput) -> Result<i32> {
        let targets = self.deployment.build_targets(target)?;
        self.exec_on_units(FleetCommand::Destroy, &targets, out).await
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::orchestrator::testing::Fixture;
    use crate::output::QuietOutput;
    use std::fs;

    #[test]
    fn build_renders_run_and_build_units() {
        let f = Fixture::new(false);
        f.orchestrator.build_local_units(&f.out).unwrap();

        let dir = f.app_dir();
        assert!(dir.join("alice_prod_app1_db@.service").is_file());
        assert!(dir.join("alice_prod_app1_web@.service").is_file());
        assert!(dir.join("alice_prod_app1_web-build.service").is_file());
        assert!(!dir.join("alice_prod_app1_db-build.service").exists());
        assert!(f.runner.calls().is_empty());
    }

    #[test]
    fn rebuild_is_identical() {
        let f = Fixture::new(false);
        f.orchestrator.build_local_units(&QuietOutput).unwrap();
        let first = fs::read_to_string(f.app_dir().join("alice_prod_app1_web@.service")).unwrap();
        f.orchestrator.build_local_units(&QuietOutput).unwrap();
        let second = fs::read_to_string(f.app_dir().join("alice_prod_app1_web@.service")).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn build_images_runs_full_sequence() {
        let f = Fixture::new(false);
        f.runner.reply("load alice_prod_app1_web-build.service", &[], 1);

        let total = f.orchestrator.build_images(None, &f.out).await.unwrap();

        assert_eq!(total, 1);
        assert_eq!(
            f.runner.short_calls(),
            vec![
                "destroy alice_prod_app1_web-build.service",
                "submit alice_prod_app1_web-build.service",
                "load alice_prod_app1_web-build.service",
                "start alice_prod_app1_web-build.service",
            ]
        );
    }

    #[tokio::test]
    async fn build_status_prints_headers() {
        let f = Fixture::new(false);
        f.orchestrator.build_local_units(&f.out).unwrap();
        f.runner.reply("status", &["active"], 0);

        let total = f.orchestrator.build_status(None, &f.out).await.unwrap();

        assert_eq!(total, 0);
        let lines = f.out.lines();
        let header = lines
            .iter()
            .position(|l| l == "maestro unit: alice_prod_app1_web-build")
            .unwrap();
        assert_eq!(lines[header + 1], "active");
    }

    #[tokio::test]
    async fn build_nuke_unknown_target() {
        let f = Fixture::new(false);
        let result = f.orchestrator.build_nuke(Some("db"), &f.out).await;
        assert!(matches!(result, Err(Error::UnitNotFound(_))));
        assert!(f.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn build_nuke_requires_built_units() {
        let f = Fixture::new(false);
        let result = f.orchestrator.build_nuke(None, &f.out).await;
        assert!(matches!(result, Err(Error::UnitFileMissing(_))));
        assert!(f.runner.calls().is_empty());
    }
}
