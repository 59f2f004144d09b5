//! CLI command implementations
//!
//! `patch` runs the whole parse → program → save pipeline; `table` renders
//! the parsed VLAN configuration for the user.

pub mod patch;
pub mod table;
