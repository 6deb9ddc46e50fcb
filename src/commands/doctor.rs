use maestro::output::UserOutput;
use maestro::registry::ETCDCTL;
use maestro::scheduler::FLEETCTL;

/// Check that the cluster client binaries are installed.
///
/// A missing `fleetctl` fails the check; `etcdctl` is only needed by `maestro etcd`.
pub async fn run_doctor(out: &dyn UserOutput) -> anyhow::Result<i32> {
    out.status("Checking system requirements...\n");

    let mut all_ok = true;

    out.progress("fleetctl: ");
    match tool_version(FLEETCTL).await {
        Some(version) => out.finish_progress(&version),
        None => {
            out.finish_progress("Not found");
            all_ok = false;
        }
    }

    out.progress("etcdctl: ");
    match tool_version(ETCDCTL).await {
        Some(version) => out.finish_progress(&version),
        None => {
            out.finish_progress("Not found");
            out.warning("etcdctl is missing. This is not fatal, fleetctl can still be used via ssh");
        }
    }

    out.blank();
    if all_ok {
        out.success("All required dependencies are installed");
        Ok(0)
    } else {
        out.status("Some required dependencies are missing");
        out.error("\nInstallation guide:");
        out.error("  fleet: https://github.com/coreos/fleet/releases");
        Ok(1)
    }
}

async fn tool_version(program: &str) -> Option<String> {
    match tokio::process::Command::new(program)
        .arg("--version")
        .output()
        .await
    {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            Some(
                stdout
                    .lines()
                    .next()
                    .map(|line| line.trim().to_string())
                    .unwrap_or_else(|| "Installed".to_string()),
            )
        }
        Ok(output) => {
            tracing::debug!("{} --version exited with {}", program, output.status);
            None
        }
        Err(e) => {
            tracing::debug!("{} not available: {}", program, e);
            None
        }
    }
}
