use super::build_orchestrator;
use maestro::config::Settings;
use maestro::output::UserOutput;
use maestro::process::ProcessRunner;
use maestro::registry::{Etcd, KeyQuery};
use maestro::{Deployment, Orchestrator};
use std::sync::Arc;

/// Cluster-wide commands do not read the app configuration.
fn cluster_orchestrator(settings: &Settings) -> anyhow::Result<Orchestrator> {
    build_orchestrator(settings, Deployment::default())
}

pub async fn run_core_status(settings: &Settings, out: &dyn UserOutput) -> anyhow::Result<i32> {
    Ok(cluster_orchestrator(settings)?.core_status(out).await)
}

pub async fn run_exec(
    settings: &Settings,
    args: &[String],
    out: &dyn UserOutput,
) -> anyhow::Result<i32> {
    Ok(cluster_orchestrator(settings)?.exec(args, out).await)
}

pub async fn run_nuke_all(settings: &Settings, out: &dyn UserOutput) -> anyhow::Result<i32> {
    Ok(cluster_orchestrator(settings)?.nuke_all(out).await?)
}

pub async fn run_etcd(
    settings: &Settings,
    key: Option<String>,
    skydns: bool,
    all: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<i32> {
    let etcd = Etcd::new(Arc::new(ProcessRunner), settings.etcd.clone());
    let query = KeyQuery {
        key,
        discovery: skydns,
        all,
    };
    let listing = etcd.pull_keys(&query).await;
    for line in &listing.lines {
        out.status(line);
    }
    Ok(listing.exit_code)
}
