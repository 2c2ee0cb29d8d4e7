//! Topology navigation for root sessions.
//!
//! A multi-shelf element is reached through its master shelf controller.
//! From there, other shelves, the standby controller and individual cards
//! are only reachable by nested `telnet` logins over the internal network.
//! [`RootNavigator`] performs those hops and tracks the current [`Location`].

mod address;
mod location;
mod navigator;

pub use address::{
    CONTROLLER_PAIR, MASTER_SHELF, controller_address, partner_controller, slot_address,
};
pub use location::Location;
pub use navigator::RootNavigator;
