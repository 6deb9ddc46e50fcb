//! Core configuration types.
//!
//! This module contains the root [`Application`] struct and the
//! [`Stage`] / [`Component`] types decoded from `maestro.json`.

use serde::{Deserialize, Serialize};

/// Root configuration structure for maestro.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Application {
    #[serde(rename = "app")]
    pub name: String,

    #[serde(default)]
    pub stages: Vec<Stage>,

    /// Operator name override. When absent the cached identity is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// An environment (production, staging, ...) holding an ordered list of components.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Stage {
    pub name: String,

    #[serde(default)]
    pub components: Vec<Component>,
}

/// A single deployable component as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Component {
    pub name: String,

    /// Number of replicas. 0 (or absent) means one replica.
    #[serde(default)]
    pub scale: u32,

    /// One instance per cluster node.
    #[serde(default)]
    pub global: bool,

    /// Never schedule two replicas on the same node.
    #[serde(default)]
    pub single: bool,

    #[serde(default)]
    pub frontend: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dns: String,

    /// Docker image the run unit starts (and the build unit pushes).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub src: String,

    /// Git repository the build unit builds the image from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitsrc: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cmd: String,

    /// `KEY=VALUE` pairs passed to the container.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<u16>,

    /// Bare volume names, mounted under the operator's shared volumes directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    /// Name of a component in the same stage that must start first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Keep the container around after the unit stops.
    #[serde(default)]
    pub keep_on_exit: bool,
}

impl Component {
    /// Replica count after normalization: at least one, exactly one for global components.
    pub fn effective_scale(&self) -> u32 {
        if self.global {
            1
        } else {
            self.scale.max(1)
        }
    }

    /// Whether the unit name carries a per-replica `%i` placeholder.
    pub fn is_scaled(&self) -> bool {
        !self.global && self.scale > 1
    }

    /// The git source, if the component declares a non-empty one.
    pub fn build_source(&self) -> Option<&str> {
        self.gitsrc.as_deref().filter(|src| !src.trim().is_empty())
    }
}

impl Application {
    /// Find a stage by name.
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.name == name)
    }
}

impl Stage {
    /// Find a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(scale: u32, global: bool) -> Component {
        Component {
            name: "pinger".to_string(),
            scale,
            global,
            ..Default::default()
        }
    }

    #[test]
    fn zero_scale_means_one_replica() {
        assert_eq!(component(0, false).effective_scale(), 1);
        assert!(!component(0, false).is_scaled());
    }

    #[test]
    fn global_forces_single_replica() {
        assert_eq!(component(5, true).effective_scale(), 1);
        assert!(!component(5, true).is_scaled());
    }

    #[test]
    fn scaled_component() {
        assert_eq!(component(3, false).effective_scale(), 3);
        assert!(component(3, false).is_scaled());
    }

    #[test]
    fn empty_gitsrc_is_not_a_build_source() {
        let mut c = component(1, false);
        assert!(c.build_source().is_none());
        c.gitsrc = Some("  ".to_string());
        assert!(c.build_source().is_none());
        c.gitsrc = Some("https://github.com/crisidev/pinger".to_string());
        assert_eq!(c.build_source(), Some("https://github.com/crisidev/pinger"));
    }
}
