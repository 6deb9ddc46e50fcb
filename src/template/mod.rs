//! Unit file rendering.
//!
//! Templates use `{{variable}}` placeholders filled from a resolved
//! component. A line holding nothing but a placeholder that renders empty is
//! dropped, so optional directives disappear instead of leaving blank lines.

use crate::deployment::DeployedComponent;
use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const RUN_UNIT_TEMPLATE: &str = include_str!("run-unit.tmpl");
const BUILD_UNIT_TEMPLATE: &str = include_str!("build-unit.tmpl");

static TEMPLATE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_template_regex() -> &'static Regex {
    TEMPLATE_REGEX.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("static regex pattern is valid")
    })
}

/// Built-in templates, overridable by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateId {
    RunUnit,
    BuildUnit,
}

impl TemplateId {
    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateId::RunUnit => "run-unit.tmpl",
            TemplateId::BuildUnit => "build-unit.tmpl",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            TemplateId::RunUnit => RUN_UNIT_TEMPLATE,
            TemplateId::BuildUnit => BUILD_UNIT_TEMPLATE,
        }
    }
}

/// Writes unit files for resolved components.
pub trait UnitRenderer: Send + Sync {
    fn render(&self, component: &DeployedComponent, path: &Path, template: TemplateId)
        -> Result<()>;
}

/// Renderer backed by the built-in templates and an optional override directory.
#[derive(Debug, Clone, Default)]
pub struct UnitTemplates {
    override_dir: Option<PathBuf>,
}

impl UnitTemplates {
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        Self { override_dir }
    }

    /// Template source: `{override_dir}/{file_name}` when it exists, else the built-in.
    pub fn source(&self, template: TemplateId) -> Result<String> {
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(template.file_name());
            if path.is_file() {
                tracing::debug!("getting template {} from {}", template.file_name(), dir.display());
                return fs::read_to_string(&path).map_err(|e| {
                    Error::Template(format!("Failed to read {}: {}", path.display(), e))
                });
            }
        }
        tracing::debug!("getting built-in template {}", template.file_name());
        Ok(template.builtin().to_string())
    }

    /// Render `template` for `component` without writing it.
    pub fn render_to_string(
        &self,
        component: &DeployedComponent,
        template: TemplateId,
    ) -> Result<String> {
        let source = self.source(template)?;
        substitute(template.file_name(), &source, &unit_parameters(component))
    }
}

impl UnitRenderer for UnitTemplates {
    fn render(
        &self,
        component: &DeployedComponent,
        path: &Path,
        template: TemplateId,
    ) -> Result<()> {
        let text = self.render_to_string(component, template)?;
        tracing::debug!("processing template into {}", path.display());
        fs::write(path, text).map_err(|e| {
            Error::Template(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

/// Replace every `{{name}}` in `source`; unknown names are an error.
pub fn substitute(
    template_name: &str,
    source: &str,
    params: &HashMap<&'static str, String>,
) -> Result<String> {
    let re = get_template_regex();
    let mut rendered = String::with_capacity(source.len());

    for line in source.lines() {
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        let mut only_placeholders = true;

        for caps in re.captures_iter(line) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = params.get(name.as_str()).ok_or_else(|| Error::TemplateVariable {
                template: template_name.to_string(),
                variable: name.as_str().to_string(),
            })?;
            if !line[last..whole.start()].trim().is_empty() {
                only_placeholders = false;
            }
            out.push_str(&line[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }
        if !line[last..].trim().is_empty() {
            only_placeholders = false;
        }
        out.push_str(&line[last..]);

        let had_placeholder = last > 0;
        if had_placeholder && only_placeholders && out.trim().is_empty() {
            continue;
        }
        rendered.push_str(&out);
        rendered.push('\n');
    }

    Ok(rendered)
}

/// Variables available to unit templates.
pub fn unit_parameters(component: &DeployedComponent) -> HashMap<&'static str, String> {
    let base = component
        .unit_name
        .split_once('@')
        .map(|(base, _)| base)
        .unwrap_or(&component.unit_name);

    let mut params = HashMap::new();
    params.insert("name", component.name.clone());
    params.insert("app", component.app.clone());
    params.insert("stage", component.stage.clone());
    params.insert("username", component.username.clone());
    params.insert("unit_name", component.unit_name.clone());
    params.insert("container_name", component.container_name.clone());
    params.insert("internal_dns", component.internal_dns.clone());
    params.insert("dns", component.dns.clone());
    params.insert("src", component.src.clone());
    params.insert("gitsrc", component.gitsrc.clone().unwrap_or_default());
    params.insert("cmd", component.cmd.clone());
    params.insert("volumes_dir", component.volumes_dir.clone());
    params.insert("registry_key", component.registry_key.clone());
    params.insert("docker_args", docker_args(component));
    params.insert(
        "after",
        component
            .after
            .as_ref()
            .map(|unit| format!("After={}\nWants={}", unit, unit))
            .unwrap_or_default(),
    );
    params.insert(
        "exec_stop_post",
        if component.keep_on_exit {
            String::new()
        } else {
            format!("ExecStopPost=-/usr/bin/docker rm {}", component.container_name)
        },
    );
    params.insert("x_fleet", x_fleet(component, base));
    params.insert("build_dir", format!("/tmp/{}-build", base));
    params
}

fn docker_args(component: &DeployedComponent) -> String {
    let mut args = Vec::new();
    for env in &component.env {
        args.push(format!("-e {}", quote(env)));
    }
    for port in &component.ports {
        args.push(format!("-p {}:{}", port, port));
    }
    for volume in &component.volumes {
        args.push(format!("-v {}", quote(volume)));
    }
    args.join(" ")
}

fn x_fleet(component: &DeployedComponent, base: &str) -> String {
    let mut lines = Vec::new();
    if component.global {
        lines.push("Global=true".to_string());
    } else if component.single {
        lines.push(format!("Conflicts={}@*.service", base));
    }
    if component.frontend {
        lines.push("MachineMetadata=frontend=true".to_string());
    }
    lines.join("\n")
}

/// Double-quote a value for a systemd command line when it contains whitespace or quotes.
fn quote(value: &str) -> String {
    if value.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
