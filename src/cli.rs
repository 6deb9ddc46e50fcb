use clap::{Parser, Subcommand};
use maestro::config::{Settings, DEFAULT_DOMAIN, DEFAULT_VOLUMES_DIR};
use maestro::registry::{EtcdOptions, DEFAULT_ENDPOINTS};
use maestro::scheduler::{FleetOptions, JournalMode, DEFAULT_TUNNEL};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "maestro")]
#[command(about = "Maestro - Build and deploy multi-component apps on a CoreOS cluster", version)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Print version
    #[arg(long, action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Enable debug logging
    #[arg(short = 'D', long, global = true, env = "MAESTRO_DEBUG")]
    pub debug: bool,

    /// Config file path (defaults to maestro.json, searched upward)
    #[arg(short, long, global = true, env = "MAESTRO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Shared volumes directory on the cluster nodes
    #[arg(short = 'V', long, global = true, env = "MAESTRO_VOLUMESDIR", default_value = DEFAULT_VOLUMES_DIR)]
    pub volumesdir: String,

    /// Directory holding user.json and the unit build tree (defaults to ~/.maestro)
    #[arg(short = 'm', long, global = true, env = "MAESTRO_DIR")]
    pub maestrodir: Option<PathBuf>,

    /// Domain for internal and public DNS names
    #[arg(long, global = true, env = "MAESTRO_DOMAIN", default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// Fleet endpoints; when empty fleetctl connects through --fleetaddr
    #[arg(short, long, global = true, env = "MAESTRO_ETCD")]
    pub etcd: Option<String>,

    /// Tunnel address used when no fleet endpoints are given
    #[arg(short = 'A', long, global = true, env = "MAESTRO_FLEETADDR", default_value = DEFAULT_TUNNEL)]
    pub fleetaddr: String,

    /// Extra fleetctl option (can be repeated, or space separated in the env var)
    #[arg(
        short = 'F',
        long = "fleetopts",
        global = true,
        env = "MAESTRO_FLEETOPTS",
        value_delimiter = ' ',
        allow_hyphen_values = true
    )]
    pub fleetopts: Vec<String>,

    /// Registry endpoints for the etcd command
    #[arg(long, global = true, env = "MAESTRO_REGISTRY", default_value = DEFAULT_ENDPOINTS)]
    pub registry: String,

    /// Directory with run-unit.tmpl / build-unit.tmpl overriding the built-in templates
    #[arg(long, global = true, env = "MAESTRO_TEMPLATES")]
    pub templates: Option<PathBuf>,

    /// fleetctl status exit code meaning a unit is still starting
    #[arg(long, global = true, env = "MAESTRO_STARTING_CODE", allow_hyphen_values = true)]
    pub starting_code: Option<i32>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Collapse the global flags into invocation settings.
    pub fn settings(&self) -> Settings {
        Settings {
            maestro_dir: Settings::default_maestro_dir(self.maestrodir.clone()),
            domain: self.domain.clone(),
            volumes_dir: self.volumesdir.clone(),
            templates_dir: self.templates.clone(),
            fleet: FleetOptions {
                endpoints: self.etcd.clone().filter(|endpoints| !endpoints.is_empty()),
                tunnel: self.fleetaddr.clone(),
                extra: self.fleetopts.clone(),
                starting_code: self.starting_code,
            },
            etcd: EtcdOptions {
                endpoints: self.registry.clone(),
                ..EtcdOptions::for_domain(&self.domain)
            },
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render unit files for every component
    Build,
    /// Build and push docker images through build units
    #[command(name = "buildimages")]
    BuildImages {
        /// Build unit or component name (defaults to all)
        unit: Option<String>,
    },
    /// Show build unit status
    #[command(name = "buildstatus")]
    BuildStatus {
        /// Build unit or component name (defaults to all)
        unit: Option<String>,
    },
    /// Destroy build units
    #[command(name = "buildnuke")]
    BuildNuke {
        /// Build unit or component name (defaults to all)
        unit: Option<String>,
    },
    /// Submit, load and start units that are not running
    Run {
        /// Unit, unit file or component name (defaults to all)
        unit: Option<String>,
    },
    /// Stop units
    Stop {
        /// Unit, unit file or component name (defaults to all)
        unit: Option<String>,
    },
    /// Destroy units
    Nuke {
        /// Unit, unit file or component name (defaults to all app units)
        unit: Option<String>,

        /// Destroy every service unit on the cluster, after confirmation
        #[arg(long, conflicts_with = "unit")]
        all: bool,
    },
    /// Show unit status
    Status {
        /// Unit, unit file or component name (defaults to all)
        unit: Option<String>,
    },
    /// Show unit journal
    Journal {
        /// Unit, unit file or component name (defaults to all)
        unit: Option<String>,

        /// Follow the journal
        #[arg(short, long)]
        follow: bool,

        /// Show the last 10000 lines
        #[arg(short, long, conflicts_with = "follow")]
        all: bool,
    },
    /// List cluster machines, units and unit files
    #[command(name = "corestatus")]
    CoreStatus,
    /// Run fleetctl with the given arguments
    Exec {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show maestro keys stored in etcd
    Etcd {
        /// Read a single key
        key: Option<String>,

        /// Include skydns keys
        #[arg(long)]
        skydns: bool,

        /// Show every key
        #[arg(long)]
        all: bool,
    },
    /// Show or change the maestro user
    User {
        /// Forget the current user and its build tree, then ask again
        #[arg(long)]
        change: bool,
    },
    /// Print settings, user and the resolved app configuration
    Config,
    /// Check that fleetctl and etcdctl are installed
    Doctor,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    pub fn journal_mode(follow: bool, all: bool) -> JournalMode {
        if follow {
            JournalMode::Follow
        } else if all {
            JournalMode::All
        } else {
            JournalMode::Recent
        }
    }
}
