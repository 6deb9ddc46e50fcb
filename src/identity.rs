//! Operator identity, cached in `{maestro_dir}/user.json`.
//!
//! Every derived unit name, DNS name and path is namespaced by the operator
//! name, so it is loaded once per invocation and never changes afterwards.

use crate::config::validate_name;
use crate::error::{Error, Result};
use crate::prompt::Prompt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const USER_FILE_NAME: &str = "user.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }
}

/// Loads, creates and resets the identity file of one maestro directory.
pub struct IdentityStore {
    maestro_dir: PathBuf,
}

impl IdentityStore {
    pub fn new(maestro_dir: impl Into<PathBuf>) -> Self {
        Self {
            maestro_dir: maestro_dir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.maestro_dir.join(USER_FILE_NAME)
    }

    /// Read the identity file. `Ok(None)` when it does not exist.
    pub fn load(&self) -> Result<Option<Identity>> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("user json config file {} not found", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::Identity(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let identity: Identity = serde_json::from_str(&content)
            .map_err(|e| Error::Identity(format!("{} is corrupt: {}", path.display(), e)))?;
        validate_name("User", &identity.name)
            .map_err(|e| Error::Identity(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("username {}", identity.name);
        Ok(Some(identity))
    }

    /// Write the identity file, creating the maestro directory if needed.
    pub fn save(&self, identity: &Identity) -> Result<()> {
        fs::create_dir_all(&self.maestro_dir).map_err(|e| {
            Error::Filesystem(format!(
                "Failed to create {}: {}",
                self.maestro_dir.display(),
                e
            ))
        })?;
        let data = serde_json::to_string(identity)?;
        fs::write(self.path(), data).map_err(|e| {
            Error::Filesystem(format!("Failed to write {}: {}", self.path().display(), e))
        })?;
        tracing::debug!("username details saved into {}", self.path().display());
        Ok(())
    }

    /// Load the identity, running the setup wizard when it is missing.
    pub fn load_or_create(&self, prompt: &dyn Prompt) -> Result<Identity> {
        if let Some(identity) = self.load()? {
            return Ok(identity);
        }

        tracing::debug!("user json config file not found, starting wizard");
        let identity = self.wizard(prompt)?;
        self.save(&identity)?;
        Ok(identity)
    }

    /// Remove the identity and the operator's build tree, then run the wizard again.
    pub fn reset(&self, prompt: &dyn Prompt) -> Result<Identity> {
        if let Some(old) = self.load().ok().flatten() {
            let build_dir = self.maestro_dir.join(&old.name);
            tracing::debug!("removing build directory {}", build_dir.display());
            remove_if_exists(&build_dir, |path| fs::remove_dir_all(path))?;
        }
        remove_if_exists(&self.path(), |path| fs::remove_file(path))?;

        let identity = self.wizard(prompt)?;
        self.save(&identity)?;
        Ok(identity)
    }

    fn wizard(&self, prompt: &dyn Prompt) -> Result<Identity> {
        let name = prompt.ask("username: ").map_err(|e| match e {
            Error::Prompt(_) => Error::IdentityMissing(self.path()),
            other => other,
        })?;
        validate_name("User", &name)?;

        let email = prompt
            .ask("email: ")
            .ok()
            .filter(|email| !email.is_empty());

        Ok(Identity { name, email })
    }
}

fn remove_if_exists(path: &Path, remove: impl Fn(&Path) -> std::io::Result<()>) -> Result<()> {
    match remove(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Filesystem(format!(
            "Failed to remove {}: {}",
            path.display(),
            e
        ))),
    }
}
