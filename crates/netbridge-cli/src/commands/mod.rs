//! Command implementations for the netbridge CLI.
//!
//! Each command module validates its arguments, runs the operation and
//! formats output according to the requested format.

pub mod completions;
pub mod config;
pub mod generate;
pub mod introspect;
