use super::LoadedApp;
use maestro::config::Settings;
use maestro::identity::IdentityStore;
use maestro::output::UserOutput;
use maestro::prompt::TerminalPrompt;

pub fn run_user(settings: &Settings, change: bool, out: &dyn UserOutput) -> anyhow::Result<()> {
    let store = IdentityStore::new(&settings.maestro_dir);

    let identity = if change {
        out.status("maestro setup wizard");
        let identity = store.reset(&TerminalPrompt)?;
        out.success(&format!("user changed to {}", identity.name));
        identity
    } else {
        store.load_or_create(&TerminalPrompt)?
    };

    out.status(&identity.name);
    if let Some(ref email) = identity.email {
        out.status(email);
    }
    Ok(())
}

/// Print settings, the user and the resolved deployment.
pub fn run_config(settings: &Settings, app: &LoadedApp, out: &dyn UserOutput) -> anyhow::Result<()> {
    match settings.fleet.endpoints {
        Some(ref endpoints) => out.status(&format!("fleet endpoints: {}", endpoints)),
        None => out.status(&format!("fleet tunnel: {}", settings.fleet.tunnel)),
    }
    out.status(&format!(
        "config and build dir: {}",
        settings.maestro_dir.display()
    ));
    out.status(&serde_json::to_string_pretty(settings)?);

    out.blank();
    out.status(&format!("user config path: {}", settings.user_file().display()));
    out.status(&serde_json::to_string_pretty(&app.identity)?);

    out.blank();
    out.status(&format!("app config path: {}", app.config_path.display()));
    out.status(&serde_json::to_string_pretty(&app.deployment)?);
    tracing::debug!(
        "{} stages declared in {}",
        app.application.stages.len(),
        app.config_path.display()
    );
    Ok(())
}
