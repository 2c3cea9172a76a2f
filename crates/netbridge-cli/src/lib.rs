//! netbridge CLI library.
//!
//! Exposes the argument definitions, commands and formatters behind the
//! `netbridge` binary so they can be tested.

pub mod actions;
pub mod cli;
pub mod commands;
pub mod formatters;
pub mod runner;

pub use actions::ConfigAction;
pub use cli::{Cli, Commands};
