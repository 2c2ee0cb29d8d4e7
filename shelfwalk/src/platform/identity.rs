//! Controller identity carried by root prompts.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static IDENTITY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"root@(EC1830|32EC2)-(\d+)-(\d+)-(ACT|STDBY)").ok());

/// Redundancy role of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Active,
    Standby,
}

impl Role {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "ACT" => Some(Role::Active),
            "STDBY" => Some(Role::Standby),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Active => f.write_str("ACT"),
            Role::Standby => f.write_str("STDBY"),
        }
    }
}

/// Controller hardware naming scheme seen in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerScheme {
    /// `EC1830-<shelf>-<controller>` controllers.
    Ec1830,
    /// `32EC2-<shelf>-<controller>` controllers.
    Ec32,
}

/// Shelf, controller and role parsed from a root prompt such as
/// `root@EC1830-81-18-ACT:/root#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerIdentity {
    pub scheme: ControllerScheme,
    pub shelf: u8,
    pub controller: u8,
    pub role: Role,
}

impl ControllerIdentity {
    /// Parse the identity out of prompt text.
    ///
    /// Returns `None` when the text is not a recognizable root prompt.
    pub fn parse(prompt: &str) -> Option<Self> {
        let caps = IDENTITY.as_ref()?.captures(prompt)?;
        let scheme = match &caps[1] {
            "EC1830" => ControllerScheme::Ec1830,
            _ => ControllerScheme::Ec32,
        };
        Some(Self {
            scheme,
            shelf: caps[2].parse().ok()?,
            controller: caps[3].parse().ok()?,
            role: Role::from_suffix(&caps[4])?,
        })
    }

    pub fn is_active(&self) -> bool {
        self.role == Role::Active
    }
}

impl fmt::Display for ControllerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self.scheme {
            ControllerScheme::Ec1830 => "EC1830",
            ControllerScheme::Ec32 => "32EC2",
        };
        write!(f, "{}-{}-{}-{}", scheme, self.shelf, self.controller, self.role)
    }
}
