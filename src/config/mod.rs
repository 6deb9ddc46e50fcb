//! Configuration parsing and types.
//!
//! - `types` - Application model (`Application`, `Stage`, `Component`)
//! - `parser` - JSON config discovery and parsing
//! - `validation` - Config validation
//! - `settings` - Invocation-wide settings built from CLI flags

mod parser;
mod settings;
mod types;
mod validation;

pub use parser::*;
pub use settings::*;
pub use types::*;
pub use validation::*;
