//! # Maestro
//!
//! A deployment front-end for multi-component apps on a CoreOS cluster.
//! Scheduling is delegated to fleet and service discovery to etcd; maestro
//! derives the names every unit must carry, renders the unit files and
//! drives `fleetctl` through the steps of each operation.
//!
//! ## Features
//!
//! - **Deterministic naming**: unit names, DNS names, container names, paths and
//!   volume binds are pure functions of operator, app, stage and component
//! - **Unit rendering**: built-in run and build unit templates with `{{variable}}` placeholders
//! - **Idempotent run**: replicas that are already active are never resubmitted
//! - **Aggregated exit codes**: every scheduler command's exit code is summed into one verdict
//!
//! ## Quick Start
//!
//! ```no_run
//! use maestro::config::Parser;
//! use maestro::naming::NamingContext;
//! use maestro::output::CliOutput;
//! use maestro::{Deployment, Orchestrator};
//!
//! # async fn example() -> Result<(), maestro::Error> {
//! let app = Parser::new().load_config("maestro.json")?;
//! app.validate()?;
//!
//! let ctx = NamingContext::new("alice", "maestro.io", "/share/maestro", "/home/alice/.maestro");
//! let orchestrator = Orchestrator::builder()
//!     .deployment(Deployment::resolve(&app, &ctx))
//!     .build()?;
//!
//! let total = orchestrator.run(None, &CliOutput).await?;
//! println!("maestro exit code: {}", total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! Each child process has its stdout and stderr drained concurrently, but
//! scheduler commands are issued strictly one after another so output from
//! different units never interleaves.

pub mod config;
pub mod deployment;
pub mod error;
pub mod identity;
pub mod naming;
pub mod orchestrator;
pub mod output;
pub mod process;
pub mod prompt;
pub mod registry;
pub mod scheduler;
pub mod template;

// Re-export commonly used types
pub use config::{Application, Component, Parser, Settings, Stage};
pub use deployment::{DeployedComponent, Deployment, UnitTarget};
pub use error::{Error, Result};
pub use naming::{NamingContext, UnitKind};
pub use orchestrator::{exit_status, Orchestrator};
