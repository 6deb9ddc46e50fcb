mod app;
mod cluster;
mod doctor;
mod info;

pub use app::{build_orchestrator, load_app, LoadedApp};
pub use cluster::{run_core_status, run_etcd, run_exec, run_nuke_all};
pub use doctor::run_doctor;
pub use info::{run_config, run_user};
