use super::Application;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default application config file name.
pub const CONFIG_FILE_NAME: &str = "maestro.json";

pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Find config file starting from current directory
    pub fn find_config_file(&self) -> Result<PathBuf> {
        let current_dir = std::env::current_dir()?;
        Self::find_config_in_dir(&current_dir)
    }

    pub fn find_config_in_dir(dir: &Path) -> Result<PathBuf> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if let Some(parent) = dir.parent() {
            return Self::find_config_in_dir(parent);
        }

        Err(Error::Config(format!(
            "Could not find {} in current directory or any parent",
            CONFIG_FILE_NAME
        )))
    }

    /// Resolve an explicit config path, or search for the default one.
    ///
    /// An explicit path that does not exist falls back to the upward search only
    /// when it is the bare default file name.
    pub fn locate(&self, path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) if path.exists() => Ok(path.to_path_buf()),
            Some(path) if path != Path::new(CONFIG_FILE_NAME) => Err(Error::Config(format!(
                "Config file '{}' does not exist",
                path.display()
            ))),
            _ => self.find_config_file(),
        }
    }

    /// Load config from file path
    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<Application> {
        tracing::debug!("maestro json config file is {}", path.as_ref().display());
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.parse_config(&content)
    }

    /// Parse config from a JSON string
    pub fn parse_config(&self, content: &str) -> Result<Application> {
        let config: Application = serde_json::from_str(content)
            .map_err(|e| Error::Parse(format!("Failed to parse JSON config: {}", e)))?;

        Ok(config)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
