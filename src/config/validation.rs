use super::Application;
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Characters that carry structure in derived unit names, DNS names and paths.
const RESERVED_NAME_CHARS: [char; 3] = ['/', '_', '@'];

/// Check a name used as a namespacing segment of derived identifiers.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation(format!("{} name cannot be empty", kind)));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(Error::Validation(format!(
            "{} name '{}' cannot contain whitespace",
            kind, name
        )));
    }
    if let Some(c) = name.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        return Err(Error::Validation(format!(
            "{} name '{}' cannot contain '{}'",
            kind, name, c
        )));
    }
    Ok(())
}

impl Application {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_name("App", &self.name)?;

        if let Some(ref username) = self.username {
            validate_name("User", username)?;
        }

        let mut stage_names = HashSet::new();
        for stage in &self.stages {
            validate_name("Stage", &stage.name)?;
            if !stage_names.insert(stage.name.as_str()) {
                return Err(Error::Validation(format!(
                    "Stage '{}' is declared more than once",
                    stage.name
                )));
            }

            let mut component_names = HashSet::new();
            for component in &stage.components {
                validate_name("Component", &component.name)?;
                if !component_names.insert(component.name.as_str()) {
                    return Err(Error::Validation(format!(
                        "Component '{}' is declared more than once in stage '{}'",
                        component.name, stage.name
                    )));
                }
            }

            // Ordering references must stay inside the stage
            for component in &stage.components {
                if let Some(ref after) = component.after {
                    if after == &component.name {
                        return Err(Error::Validation(format!(
                            "Component '{}' cannot start after itself",
                            component.name
                        )));
                    }
                    if stage.component(after).is_none() {
                        return Err(Error::Validation(format!(
                            "Component '{}' starts after '{}', which is not a component of stage '{}'",
                            component.name, after, stage.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
