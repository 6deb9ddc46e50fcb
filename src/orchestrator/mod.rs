mod build;
mod builder;
mod cluster;
mod core;
mod lifecycle;

pub use builder::OrchestratorBuilder;
pub use cluster::service_unit;
pub use self::core::*;
