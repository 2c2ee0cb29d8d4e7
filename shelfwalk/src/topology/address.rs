//! Internal addressing of a multi-shelf network element.
//!
//! Every card and controller is reachable from the master controller on the
//! internal `100.0.<shelf>.<n>` network.

use std::net::Ipv4Addr;

/// Shelf id of the master shelf.
pub const MASTER_SHELF: u8 = 81;

/// Slot ids of the two redundant controllers of every shelf.
pub const CONTROLLER_PAIR: [u8; 2] = [1, 18];

/// Address of a card slot.
pub fn slot_address(shelf: u8, slot: u8) -> Ipv4Addr {
    Ipv4Addr::new(100, 0, shelf, slot)
}

/// Address of a shelf controller.
pub fn controller_address(shelf: u8, controller: u8) -> Ipv4Addr {
    Ipv4Addr::new(100, 0, shelf, controller)
}

/// The other controller of the redundant pair.
pub fn partner_controller(controller: u8) -> u8 {
    if controller == CONTROLLER_PAIR[1] {
        CONTROLLER_PAIR[0]
    } else {
        CONTROLLER_PAIR[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses() {
        assert_eq!(slot_address(2, 3).to_string(), "100.0.2.3");
        assert_eq!(controller_address(81, 18).to_string(), "100.0.81.18");
    }

    #[test]
    fn test_partner_controller() {
        assert_eq!(partner_controller(18), 1);
        assert_eq!(partner_controller(1), 18);
    }
}
