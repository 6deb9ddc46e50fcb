mod cli;
mod commands;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use maestro::output::{CliOutput, UserOutput};
use maestro::Error as MaestroError;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(Some(total)) => {
            CliOutput.status(&format!("maestro exit code: {}", verdict(total)));
            std::process::exit(maestro::exit_status(total));
        }
        Ok(None) => {}
        Err(e) => {
            if let Some(maestro_error) = e.downcast_ref::<MaestroError>() {
                eprintln!("Error: {}", maestro_error);
                if let Some(suggestion) = maestro_error.suggestion() {
                    eprintln!("\nHint: {}", suggestion);
                }
            } else {
                eprintln!("Error: {:#}", e);
            }
            std::process::exit(1);
        }
    }
}

/// Dispatch the command. `Some(total)` for operations that report an exit code.
async fn run() -> anyhow::Result<Option<i32>> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let settings = cli.settings();
    let out = &CliOutput;

    // ── Tier 1: Commands that need NO config ──────────────────────────
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            return Ok(None);
        }
        Commands::Doctor => {
            return commands::run_doctor(out).await.map(Some);
        }
        Commands::User { change } => {
            commands::run_user(&settings, *change, out)?;
            return Ok(None);
        }
        Commands::Etcd { key, skydns, all } => {
            return commands::run_etcd(&settings, key.clone(), *skydns, *all, out)
                .await
                .map(Some);
        }
        Commands::CoreStatus => {
            return commands::run_core_status(&settings, out).await.map(Some);
        }
        Commands::Exec { args } => {
            return commands::run_exec(&settings, args, out).await.map(Some);
        }
        Commands::Nuke { all: true, .. } => {
            return commands::run_nuke_all(&settings, out).await.map(Some);
        }
        _ => {} // fall through to config-loading path
    }

    // ── Tier 2: Commands that need config and user ───────────────────
    let app = commands::load_app(&settings, cli.config.as_deref())?;

    if let Commands::Config = cli.command {
        commands::run_config(&settings, &app, out)?;
        return Ok(None);
    }

    let orchestrator = commands::build_orchestrator(&settings, app.deployment)?;

    let total = match cli.command {
        Commands::Build => {
            orchestrator.build_local_units(out)?;
            0
        }
        Commands::BuildImages { unit } => orchestrator.build_images(unit.as_deref(), out).await?,
        Commands::BuildStatus { unit } => orchestrator.build_status(unit.as_deref(), out).await?,
        Commands::BuildNuke { unit } => orchestrator.build_nuke(unit.as_deref(), out).await?,
        Commands::Run { unit } => orchestrator.run(unit.as_deref(), out).await?,
        Commands::Stop { unit } => orchestrator.stop(unit.as_deref(), out).await?,
        Commands::Nuke { unit, .. } => orchestrator.nuke(unit.as_deref(), out).await?,
        Commands::Status { unit } => orchestrator.status(unit.as_deref(), out).await?,
        Commands::Journal { unit, follow, all } => {
            orchestrator
                .journal(unit.as_deref(), Commands::journal_mode(follow, all), out)
                .await?
        }
        Commands::Completions { .. }
        | Commands::Doctor
        | Commands::User { .. }
        | Commands::Etcd { .. }
        | Commands::CoreStatus
        | Commands::Exec { .. }
        | Commands::Config => unreachable!("handled above"),
    };

    Ok(Some(total))
}

/// The aggregated exit code, green or red when stdout is a terminal.
fn verdict(total: i32) -> String {
    use std::io::IsTerminal;
    if !std::io::stdout().is_terminal() {
        return total.to_string();
    }
    let color = if total == 0 { 32 } else { 31 };
    format!("\x1b[{}m{}\x1b[0m", color, total)
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    Ok(())
}
