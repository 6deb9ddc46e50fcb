// thiserror expands struct variant fields into assignments rustc reports as unused.
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(maestro::config::validation),
        help("Check the app, stages and components fields of your maestro.json")
    )]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Filesystem error: {0}")]
    #[diagnostic(code(maestro::filesystem::error))]
    Filesystem(String),

    #[error("Identity error: {0}")]
    #[diagnostic(
        code(maestro::identity::corrupt),
        help("Run `maestro user --change` to recreate your identity")
    )]
    Identity(String),

    #[error("No operator identity found in {}", .0.display())]
    #[diagnostic(
        code(maestro::identity::missing),
        help("Run maestro from an interactive terminal once to create it")
    )]
    IdentityMissing(PathBuf),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Template '{template}' references unknown variable '{variable}'")]
    #[diagnostic(code(maestro::template::variable))]
    TemplateVariable { template: String, variable: String },

    #[error("Unit file {} not found", .0.display())]
    #[diagnostic(
        code(maestro::unit::missing),
        help("Build the unit files first with `maestro build`")
    )]
    UnitFileMissing(PathBuf),

    #[error("Unit '{0}' is not part of this app")]
    #[diagnostic(
        code(maestro::unit::not_found),
        help("List the app units with `maestro status`")
    )]
    UnitNotFound(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::Config(msg) if msg.contains("Could not find") => Some(
                "Pass the config path with --config or run maestro next to maestro.json".to_string(),
            ),
            Error::Parse(_) | Error::Json(_) => {
                Some("Check that maestro.json is valid JSON".to_string())
            }
            Error::Validation(_) => Some(
                "Names must be non-empty and must not contain '/', '_' or '@'".to_string(),
            ),
            Error::Identity(_) => {
                Some("Recreate your identity with: maestro user --change".to_string())
            }
            Error::IdentityMissing(path) => Some(format!(
                "Create {} with {{\"name\": \"<username>\"}} or run maestro interactively",
                path.display()
            )),
            Error::UnitFileMissing(_) => Some(
                "Invalid unit or maybe you forgot to run `maestro build`".to_string(),
            ),
            Error::UnitNotFound(name) => Some(format!(
                "'{}' matches no component or unit name; check `maestro config` for the derived names",
                name
            )),
            Error::Template(_) | Error::TemplateVariable { .. } => Some(
                "Check the templates directory passed with --templates".to_string(),
            ),
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_file_missing_suggests_build() {
        let err = Error::UnitFileMissing(PathBuf::from("/tmp/x@.service"));
        let text = err.with_suggestion();
        assert!(text.contains("/tmp/x@.service"));
        assert!(text.contains("maestro build"));
    }

    #[test]
    fn io_error_has_no_suggestion() {
        let err = Error::from(io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(err.suggestion().is_none());
        assert_eq!(err.with_suggestion(), "IO error: boom");
    }
}
