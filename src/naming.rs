//! Deterministic names for everything a component materializes as.
//!
//! All functions here are pure: the same operator, app, stage and component
//! always produce the same unit names, DNS names, paths and bind strings. This
//! is what lets a later `stop` find exactly the units an earlier `run` created.
//!
//! ```text
//! base            {op}_{stage}_{app}_{name}
//! run unit        {base}@.service
//! build unit      {base}-build.service
//! instance        {base}@{n}
//! template        {base}@{token}          token = %i | %H | 1
//! internal dns    {token}.{name}.{app}.{stage}.{op}.{domain}
//! ```

use crate::config::Component;
use std::path::{Path, PathBuf};

/// Per-replica placeholder, expanded by the scheduler to the instance number.
pub const SCALED_TOKEN: &str = "%i";

/// Host placeholder used by global components, expanded to the node identity.
pub const GLOBAL_TOKEN: &str = "%H";

/// Token of a component that is neither scaled nor global.
pub const DEFAULT_TOKEN: &str = "1";

/// Extension of every unit file.
pub const UNIT_SUFFIX: &str = ".service";

const BUILD_SUFFIX: &str = "-build.service";

/// Which name of a component to derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// The run unit file, `{base}@.service`.
    Run,
    /// The companion build unit file, `{base}-build.service`.
    Build,
    /// One concrete replica, `{base}@{n}`.
    Instance(u32),
    /// The placeholder form, `{base}@{token}`.
    Template,
}

/// Inputs shared by every derived name of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    pub operator: String,
    pub domain: String,
    /// Root of the shared volumes on the cluster nodes.
    pub volumes_root: String,
    /// Local directory holding the operator build trees.
    pub build_root: PathBuf,
}

impl NamingContext {
    pub fn new(
        operator: impl Into<String>,
        domain: impl Into<String>,
        volumes_root: impl Into<String>,
        build_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            operator: operator.into(),
            domain: domain.into(),
            volumes_root: volumes_root.into(),
            build_root: build_root.into(),
        }
    }

    /// Narrow the context to one stage of one app.
    pub fn scope<'a>(&'a self, app: &'a str, stage: &'a str) -> Scope<'a> {
        Scope {
            ctx: self,
            app,
            stage,
        }
    }

    /// `{build_root}/{op}`, removed when the operator identity is reset.
    pub fn operator_dir(&self) -> PathBuf {
        self.build_root.join(&self.operator)
    }
}

/// Naming context narrowed to one app and stage.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    ctx: &'a NamingContext,
    app: &'a str,
    stage: &'a str,
}

impl<'a> Scope<'a> {
    pub fn app(&self) -> &str {
        self.app
    }

    pub fn stage(&self) -> &str {
        self.stage
    }

    /// `{op}_{stage}_{app}_{name}`
    pub fn base_name(&self, component: &Component) -> String {
        format!(
            "{}_{}_{}_{}",
            self.ctx.operator, self.stage, self.app, component.name
        )
    }

    pub fn unit_name(&self, component: &Component, kind: UnitKind) -> String {
        let base = self.base_name(component);
        match kind {
            UnitKind::Run => format!("{}@{}", base, UNIT_SUFFIX),
            UnitKind::Build => format!("{}{}", base, BUILD_SUFFIX),
            UnitKind::Instance(n) => format!("{}@{}", base, n),
            UnitKind::Template => format!("{}@{}", base, instance_token(component)),
        }
    }

    /// Name of the unit file for `kind`; instance and template names gain `.service`.
    pub fn unit_file_name(&self, component: &Component, kind: UnitKind) -> String {
        let name = self.unit_name(component, kind);
        if name.ends_with(UNIT_SUFFIX) {
            name
        } else {
            name + UNIT_SUFFIX
        }
    }

    pub fn internal_dns(&self, component: &Component) -> String {
        format!(
            "{}.{}.{}.{}.{}.{}",
            instance_token(component),
            component.name,
            self.app,
            self.stage,
            self.ctx.operator,
            self.ctx.domain
        )
    }

    /// Externally reachable name synthesized for frontends without an explicit `dns`.
    pub fn public_dns(&self, component: &Component) -> String {
        format!(
            "{}-{}-{}-{}.{}",
            self.ctx.operator, self.stage, self.app, component.name, self.ctx.domain
        )
    }

    /// The configured `dns`, or the synthesized public name for a frontend.
    pub fn dns(&self, component: &Component) -> String {
        if component.dns.is_empty() && component.frontend {
            self.public_dns(component)
        } else {
            component.dns.clone()
        }
    }

    /// Container name mirrors the templated unit name.
    pub fn container_name(&self, component: &Component) -> String {
        self.unit_name(component, UnitKind::Template)
    }

    /// `{build_root}/{op}/{stage}/{app}`
    pub fn app_path(&self) -> PathBuf {
        self.ctx
            .operator_dir()
            .join(self.stage)
            .join(self.app)
    }

    pub fn unit_path(&self, component: &Component, kind: UnitKind) -> PathBuf {
        self.app_path().join(self.unit_file_name(component, kind))
    }

    /// `{volumes_root}/{op}/{stage}/{app}`
    pub fn volumes_dir(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.ctx.volumes_root.trim_end_matches('/'),
            self.ctx.operator,
            self.stage,
            self.app
        )
    }

    /// Host bind string `{volumes_dir}/{volume}:{volume}`.
    ///
    /// The bare name is always placed under the volumes dir, even when it
    /// starts with `/`.
    pub fn volume_path(&self, volume: &str) -> String {
        format!(
            "{}/{}:{}",
            self.volumes_dir(),
            volume.trim_start_matches('/'),
            volume
        )
    }

    /// Registry key the running unit publishes itself under.
    pub fn registry_key(&self, component: &Component) -> String {
        format!(
            "/{}/{}/{}/{}/{}/{}",
            self.ctx.domain,
            self.ctx.operator,
            self.stage,
            self.app,
            component.name,
            instance_token(component)
        )
    }
}

/// `%i` for scaled components, `%H` for global ones, `1` otherwise.
pub fn instance_token(component: &Component) -> &'static str {
    if component.global {
        GLOBAL_TOKEN
    } else if component.is_scaled() {
        SCALED_TOKEN
    } else {
        DEFAULT_TOKEN
    }
}

/// Turn a templated unit path into the path of replica `n`.
///
/// Only the first `@` of the file name is expanded; directories are never touched.
pub fn numbered_unit_path(path: &Path, n: u32) -> PathBuf {
    map_file_name(path, |name| name.replacen('@', &format!("@{}", n), 1))
}

/// Strip a replica number back out of a numbered unit path.
///
/// Paths without a numbered `@` segment are returned unchanged.
pub fn template_unit_path(path: &Path) -> PathBuf {
    map_file_name(path, |name| match name.split_once('@') {
        Some((base, rest)) => {
            let digits = rest.chars().take_while(char::is_ascii_digit).count();
            format!("{}@{}", base, &rest[digits..])
        }
        None => name.to_string(),
    })
}

/// The replica number carried by a unit name or path, if any.
pub fn instance_number(unit: &str) -> Option<u32> {
    let file = unit.rsplit('/').next().unwrap_or(unit);
    let (_, rest) = file.split_once('@')?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let tail = &rest[digits.len()..];
    if digits.is_empty() || !(tail.is_empty() || tail == UNIT_SUFFIX) {
        return None;
    }
    digits.parse().ok()
}

fn map_file_name(path: &Path, f: impl FnOnce(&str) -> String) -> PathBuf {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => path.with_file_name(f(name)),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> NamingContext {
        NamingContext::new("alice", "maestro.io", "/share/maestro", "/home/alice/.maestro")
    }

    fn pinger(scale: u32, global: bool) -> Component {
        Component {
            name: "pinger".to_string(),
            scale,
            global,
            ..Default::default()
        }
    }

    #[test]
    fn single_replica_names() {
        let ctx = ctx();
        let scope = ctx.scope("app1", "prod");
        let c = pinger(1, false);

        assert_eq!(
            scope.unit_name(&c, UnitKind::Run),
            "alice_prod_app1_pinger@.service"
        );
        assert_eq!(
            scope.unit_name(&c, UnitKind::Build),
            "alice_prod_app1_pinger-build.service"
        );
        assert_eq!(scope.unit_name(&c, UnitKind::Instance(4)), "alice_prod_app1_pinger@4");
        assert_eq!(scope.unit_name(&c, UnitKind::Template), "alice_prod_app1_pinger@1");
        assert_eq!(
            scope.internal_dns(&c),
            "1.pinger.app1.prod.alice.maestro.io"
        );
    }

    #[test]
    fn unset_scale_uses_default_token() {
        let ctx = ctx();
        let scope = ctx.scope("app1", "prod");
        assert_eq!(scope.container_name(&pinger(0, false)), "alice_prod_app1_pinger@1");
    }

    #[test]
    fn scaled_names_carry_placeholder() {
        let ctx = ctx();
        let scope = ctx.scope("app1", "prod");
        let c = pinger(3, false);

        assert_eq!(scope.unit_name(&c, UnitKind::Template), "alice_prod_app1_pinger@%i");
        assert_eq!(scope.container_name(&c), "alice_prod_app1_pinger@%i");
        assert!(scope.internal_dns(&c).starts_with("%i.pinger."));

        let path = scope.unit_path(&c, UnitKind::Run);
        assert_eq!(
            numbered_unit_path(&path, 2),
            PathBuf::from("/home/alice/.maestro/alice/prod/app1/alice_prod_app1_pinger@2.service")
        );
    }

    #[test]
    fn global_uses_host_placeholder() {
        let ctx = ctx();
        let scope = ctx.scope("app1", "prod");
        let c = pinger(7, true);

        assert_eq!(
            scope.internal_dns(&c),
            "%H.pinger.app1.prod.alice.maestro.io"
        );
        assert_eq!(scope.unit_name(&c, UnitKind::Template), "alice_prod_app1_pinger@%H");
        assert_eq!(scope.registry_key(&c), "/maestro.io/alice/prod/app1/pinger/%H");
    }

    #[test]
    fn paths_are_operator_scoped() {
        let ctx = ctx();
        let scope = ctx.scope("app1", "prod");
        let c = pinger(1, false);

        assert_eq!(
            scope.app_path(),
            PathBuf::from("/home/alice/.maestro/alice/prod/app1")
        );
        assert_eq!(
            scope.unit_path(&c, UnitKind::Build),
            PathBuf::from("/home/alice/.maestro/alice/prod/app1/alice_prod_app1_pinger-build.service")
        );
        assert_eq!(
            scope.unit_path(&c, UnitKind::Instance(2)),
            numbered_unit_path(&scope.unit_path(&c, UnitKind::Run), 2)
        );
    }

    #[test]
    fn volume_bind_strings() {
        let ctx = ctx();
        let scope = ctx.scope("app1", "prod");
        assert_eq!(scope.volumes_dir(), "/share/maestro/alice/prod/app1");
        assert_eq!(
            scope.volume_path("data"),
            "/share/maestro/alice/prod/app1/data:data"
        );
        assert_eq!(
            scope.volume_path("/var/lib/db"),
            "/share/maestro/alice/prod/app1/var/lib/db:/var/lib/db"
        );
    }

    #[test]
    fn public_dns_only_synthesized_for_frontends() {
        let ctx = ctx();
        let scope = ctx.scope("app1", "prod");
        let mut c = pinger(1, false);
        assert_eq!(scope.dns(&c), "");

        c.frontend = true;
        assert_eq!(scope.dns(&c), "alice-prod-app1-pinger.maestro.io");

        c.dns = "www.example.com".to_string();
        assert_eq!(scope.dns(&c), "www.example.com");
    }

    #[test]
    fn numbered_path_round_trip() {
        let path = PathBuf::from("/m/alice/prod/app1/alice_prod_app1_pinger@.service");
        for n in [1, 2, 10, 123] {
            let numbered = numbered_unit_path(&path, n);
            assert_ne!(numbered, path);
            assert_eq!(template_unit_path(&numbered), path);
        }
    }

    #[test]
    fn numbered_path_ignores_at_in_directories() {
        let path = PathBuf::from("/tmp/we@ird/alice_prod_app1_pinger@.service");
        assert_eq!(
            numbered_unit_path(&path, 3),
            PathBuf::from("/tmp/we@ird/alice_prod_app1_pinger@3.service")
        );
    }

    #[test]
    fn build_path_has_no_instance() {
        let path = PathBuf::from("/m/alice_prod_app1_pinger-build.service");
        assert_eq!(template_unit_path(&path), path);
    }

    #[test]
    fn instance_numbers() {
        assert_eq!(instance_number("alice_prod_app1_pinger@2"), Some(2));
        assert_eq!(instance_number("/m/alice_prod_app1_pinger@12.service"), Some(12));
        assert_eq!(instance_number("alice_prod_app1_pinger@.service"), None);
        assert_eq!(instance_number("alice_prod_app1_pinger@%i"), None);
        assert_eq!(instance_number("alice_prod_app1_pinger-build.service"), None);
    }
}
