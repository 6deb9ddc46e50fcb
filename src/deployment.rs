//! The resolved deployment: configuration plus every derived name.
//!
//! [`Deployment::resolve`] runs once per invocation. Its output is immutable
//! and is what the renderer and the orchestrator read from.

use crate::config::{Application, Component};
use crate::error::{Error, Result};
use crate::naming::{self, NamingContext, Scope, UnitKind, UNIT_SUFFIX};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Deployment {
    pub operator: String,
    pub app: String,
    pub domain: String,
    pub stages: Vec<DeployedStage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployedStage {
    pub name: String,
    /// Local directory the stage's unit files are rendered into.
    pub app_path: PathBuf,
    pub components: Vec<DeployedComponent>,
}

/// A component with its namespace and all derived fields filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployedComponent {
    pub name: String,
    pub app: String,
    pub stage: String,
    pub username: String,

    pub scale: u32,
    pub global: bool,
    pub single: bool,
    pub frontend: bool,
    pub dns: String,
    pub src: String,
    pub gitsrc: Option<String>,
    pub cmd: String,
    pub env: Vec<String>,
    pub ports: Vec<u16>,
    pub keep_on_exit: bool,

    /// Templated unit name, `{base}@{token}`.
    pub unit_name: String,
    pub unit_path: PathBuf,
    pub build_unit_name: Option<String>,
    pub build_unit_path: Option<PathBuf>,
    pub container_name: String,
    pub internal_dns: String,
    pub volumes_dir: String,
    /// Bind strings, `hostPath:containerPath`.
    pub volumes: Vec<String>,
    /// Unit this one starts after, `{other}@{token}.service`.
    pub after: Option<String>,
    pub registry_key: String,
}

/// One addressable unit: a run-unit replica or a build unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTarget {
    /// Name shown to the operator.
    pub name: String,
    /// Local unit file handed to the scheduler.
    pub path: PathBuf,
}

impl DeployedComponent {
    fn resolve(scope: Scope<'_>, component: &Component, siblings: &[Component]) -> Self {
        let has_build = component.build_source().is_some();
        let after = component
            .after
            .as_deref()
            .and_then(|name| siblings.iter().find(|c| c.name == name))
            .map(|other| format!("{}{}", scope.unit_name(other, UnitKind::Template), UNIT_SUFFIX));

        Self {
            name: component.name.clone(),
            app: scope.app().to_string(),
            stage: scope.stage().to_string(),
            username: String::new(),

            scale: component.effective_scale(),
            global: component.global,
            single: component.single,
            frontend: component.frontend,
            dns: scope.dns(component),
            src: component.src.clone(),
            gitsrc: component.build_source().map(str::to_string),
            cmd: component.cmd.clone(),
            env: component.env.clone(),
            ports: component.ports.clone(),
            keep_on_exit: component.keep_on_exit,

            unit_name: scope.unit_name(component, UnitKind::Template),
            unit_path: scope.unit_path(component, UnitKind::Run),
            build_unit_name: has_build.then(|| scope.unit_name(component, UnitKind::Build)),
            build_unit_path: has_build.then(|| scope.unit_path(component, UnitKind::Build)),
            container_name: scope.container_name(component),
            internal_dns: scope.internal_dns(component),
            volumes_dir: scope.volumes_dir(),
            volumes: component
                .volumes
                .iter()
                .map(|volume| scope.volume_path(volume))
                .collect(),
            after,
            registry_key: scope.registry_key(component),
        }
    }

    /// One target per replica, numbered `1..=scale`.
    pub fn instances(&self) -> Vec<UnitTarget> {
        (1..=self.scale).map(|n| self.instance(n)).collect()
    }

    /// Replica `n` of the run unit.
    pub fn instance(&self, n: u32) -> UnitTarget {
        let path = naming::numbered_unit_path(&self.unit_path, n);
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.trim_end_matches(UNIT_SUFFIX).to_string())
            .unwrap_or_default();
        UnitTarget { name, path }
    }

    pub fn build_target(&self) -> Option<UnitTarget> {
        match (&self.build_unit_name, &self.build_unit_path) {
            (Some(name), Some(path)) => Some(UnitTarget {
                name: name.trim_end_matches(UNIT_SUFFIX).to_string(),
                path: path.clone(),
            }),
            _ => None,
        }
    }

    fn run_file_name(&self) -> Option<&str> {
        self.unit_path.file_name().and_then(|name| name.to_str())
    }
}

impl Deployment {
    /// Derive every name of `app` under `ctx`. Pure and idempotent.
    pub fn resolve(app: &Application, ctx: &NamingContext) -> Self {
        let stages = app
            .stages
            .iter()
            .map(|stage| {
                let scope = ctx.scope(&app.name, &stage.name);
                tracing::debug!("resolving stage {}", stage.name);
                DeployedStage {
                    name: stage.name.clone(),
                    app_path: scope.app_path(),
                    components: stage
                        .components
                        .iter()
                        .map(|component| {
                            let mut resolved =
                                DeployedComponent::resolve(scope, component, &stage.components);
                            resolved.username = ctx.operator.clone();
                            resolved
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            operator: ctx.operator.clone(),
            app: app.name.clone(),
            domain: ctx.domain.clone(),
            stages,
        }
    }

    /// Every component in stage order.
    pub fn components(&self) -> impl Iterator<Item = &DeployedComponent> {
        self.stages.iter().flat_map(|stage| stage.components.iter())
    }

    /// Create `{maestro_dir}/{op}/{stage}/{app}` for every stage.
    pub fn prepare_dirs(&self) -> Result<()> {
        tracing::debug!("creating build dirs for app and components");
        for stage in &self.stages {
            fs::create_dir_all(&stage.app_path).map_err(|e| {
                Error::Filesystem(format!(
                    "Failed to create {}: {}",
                    stage.app_path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Run-unit replicas selected by `target`, or all of them.
    ///
    /// A target is a replica name (`…_web@2`, with or without `.service`),
    /// a run-unit file name (`…_web@.service`) or a bare component name.
    pub fn run_targets(&self, target: Option<&str>) -> Result<Vec<UnitTarget>> {
        let Some(target) = target else {
            return Ok(self.components().flat_map(|c| c.instances()).collect());
        };

        let template = naming::template_unit_path(&PathBuf::from(with_unit_suffix(target)));
        let template = template.to_string_lossy();

        let mut targets = Vec::new();
        for component in self.components() {
            if let Some(n) = naming::instance_number(target) {
                if component.run_file_name() == Some(template.as_ref())
                    && (1..=component.scale).contains(&n)
                {
                    targets.push(component.instance(n));
                }
            } else if component.run_file_name() == Some(target) || component.name == target {
                targets.extend(component.instances());
            }
        }

        if targets.is_empty() {
            return Err(Error::UnitNotFound(target.to_string()));
        }
        Ok(targets)
    }

    /// Build units selected by `target`, or all of them.
    ///
    /// A target is a build unit name (with or without `.service`) or the name
    /// of a component that declares a git source.
    pub fn build_targets(&self, target: Option<&str>) -> Result<Vec<UnitTarget>> {
        let targets: Vec<UnitTarget> = self
            .components()
            .filter(|component| match target {
                None => true,
                Some(target) => {
                    component.name == target
                        || component.build_unit_name.as_deref() == Some(target)
                        || component.build_unit_name.as_deref()
                            == Some(with_unit_suffix(target).as_str())
                }
            })
            .filter_map(DeployedComponent::build_target)
            .collect();

        match target {
            Some(target) if targets.is_empty() => Err(Error::UnitNotFound(target.to_string())),
            _ => Ok(targets),
        }
    }
}

fn with_unit_suffix(name: &str) -> String {
    if name.ends_with(UNIT_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, UNIT_SUFFIX)
    }
}
