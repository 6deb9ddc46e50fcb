use maestro::config::{Application, Parser as ConfigParser, Settings};
use maestro::identity::{Identity, IdentityStore};
use maestro::naming::NamingContext;
use maestro::prompt::TerminalPrompt;
use maestro::template::UnitTemplates;
use maestro::{Deployment, Orchestrator};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A loaded, validated and resolved app configuration.
pub struct LoadedApp {
    pub config_path: PathBuf,
    pub application: Application,
    pub identity: Identity,
    pub deployment: Deployment,
}

pub fn load_app(settings: &Settings, config: Option<&Path>) -> anyhow::Result<LoadedApp> {
    let parser = ConfigParser::new();
    let config_path = parser.locate(config)?;
    tracing::debug!("maestro json config file is {}", config_path.display());

    let application = parser.load_config(&config_path)?;
    application.validate()?;

    let identity = resolve_identity(settings, &application)?;
    let ctx = naming_context(settings, &identity.name);
    let deployment = Deployment::resolve(&application, &ctx);

    Ok(LoadedApp {
        config_path,
        application,
        identity,
        deployment,
    })
}

/// The config `username` wins over the cached identity.
fn resolve_identity(settings: &Settings, application: &Application) -> anyhow::Result<Identity> {
    if let Some(ref name) = application.username {
        tracing::debug!("username {} taken from config", name);
        return Ok(Identity::new(name.clone()));
    }

    let store = IdentityStore::new(&settings.maestro_dir);
    tracing::debug!(
        "username missing in config, using default from {}",
        store.path().display()
    );
    Ok(store.load_or_create(&TerminalPrompt)?)
}

fn naming_context(settings: &Settings, operator: &str) -> NamingContext {
    NamingContext::new(
        operator,
        settings.domain.clone(),
        settings.volumes_dir.clone(),
        settings.maestro_dir.clone(),
    )
}

pub fn build_orchestrator(settings: &Settings, deployment: Deployment) -> anyhow::Result<Orchestrator> {
    let orchestrator = Orchestrator::builder()
        .deployment(deployment)
        .fleet_options(settings.fleet.clone())
        .renderer(Arc::new(UnitTemplates::new(settings.templates_dir.clone())))
        .prompt(Arc::new(TerminalPrompt))
        .build()?;
    Ok(orchestrator)
}
