//! Where a root session currently is.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::platform::Role;

/// The logical shell a root session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// The controller the SSH connection landed on.
    Local,

    /// A shelf controller reached by a nested login.
    AtShelf {
        shelf: u8,
        controller: u8,
        role: Role,
        is_master: bool,
    },

    /// A card reached by a nested login from the current shelf.
    AtSlot { shelf: u8, slot: u8 },
}

impl Location {
    pub fn is_slot(&self) -> bool {
        matches!(self, Location::AtSlot { .. })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local => f.write_str("local controller"),
            Location::AtShelf {
                shelf,
                controller,
                role,
                ..
            } => write!(f, "shelf {} controller {} ({})", shelf, controller, role),
            Location::AtSlot { shelf, slot } => write!(f, "slot {}/{}", shelf, slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Location::Local.to_string(), "local controller");
        assert_eq!(Location::AtSlot { shelf: 2, slot: 3 }.to_string(), "slot 2/3");
        let shelf = Location::AtShelf {
            shelf: 81,
            controller: 1,
            role: Role::Standby,
            is_master: true,
        };
        assert_eq!(shelf.to_string(), "shelf 81 controller 1 (STDBY)");
    }

    #[test]
    fn test_serde_roundtrip() {
        let location = Location::AtShelf {
            shelf: 2,
            controller: 18,
            role: Role::Active,
            is_master: false,
        };
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(
            json,
            r#"{"AtShelf":{"shelf":2,"controller":18,"role":"Active","is_master":false}}"#
        );
        assert_eq!(serde_json::from_str::<Location>(&json).unwrap(), location);
        assert_eq!(serde_json::to_string(&Location::Local).unwrap(), r#""Local""#);
    }
}
