//! Built-in catalogs for the 1830 PSS network element family.

pub mod pss_cli;
pub mod pss_root;
