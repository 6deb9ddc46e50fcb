//! Invocation-wide settings shared by the resolver and the cluster clients.

use crate::registry::EtcdOptions;
use crate::scheduler::FleetOptions;
use serde::Serialize;
use std::path::PathBuf;

/// Default domain for internal and public DNS names.
pub const DEFAULT_DOMAIN: &str = "maestro.io";

/// Default directory on the cluster nodes holding shared volumes.
pub const DEFAULT_VOLUMES_DIR: &str = "/share/maestro";

/// Name of the local directory holding the identity file and the build tree.
pub const MAESTRO_DIR_NAME: &str = ".maestro";

/// Settings built once per invocation from flags and environment.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Local directory holding `user.json` and the unit build tree.
    pub maestro_dir: PathBuf,
    pub domain: String,
    /// Root of the shared volumes on the cluster nodes.
    pub volumes_dir: String,
    /// Directory whose `run-unit.tmpl` / `build-unit.tmpl` override the built-in templates.
    pub templates_dir: Option<PathBuf>,
    pub fleet: FleetOptions,
    pub etcd: EtcdOptions,
}

impl Settings {
    /// Resolve the maestro directory: the given one, or `$HOME/.maestro`.
    pub fn default_maestro_dir(dir: Option<PathBuf>) -> PathBuf {
        match dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(MAESTRO_DIR_NAME),
        }
    }

    /// Path of the operator identity file.
    pub fn user_file(&self) -> PathBuf {
        self.maestro_dir.join(crate::identity::USER_FILE_NAME)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            maestro_dir: Self::default_maestro_dir(None),
            domain: DEFAULT_DOMAIN.to_string(),
            volumes_dir: DEFAULT_VOLUMES_DIR.to_string(),
            templates_dir: None,
            fleet: FleetOptions::default(),
            etcd: EtcdOptions::default(),
        }
    }
}
