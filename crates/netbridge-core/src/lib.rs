//! Core types, identifier derivation and errors for netbridge.
//!
//! This crate provides the foundational types shared by the introspector,
//! the artifact emitters and the CLI.
//!
//! # Architecture
//!
//! The core consists of:
//! - Domain model (`MemberDescriptor`, `ComponentDescriptor`, `RunContext`)
//! - Error taxonomy for a generation run
//! - Identifier derivation and collision handling
//! - The single string escaping rule used by generated code
//! - CLI value types (`OutputFormat`, `ExitCode`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod error;
mod escape;
mod ident;
mod types;

pub mod cli;

pub use error::{Error, Result};
pub use escape::escape_single_quoted;
pub use ident::{
    CollisionPolicy, GLOBAL_NAMESPACE, IdentifierAssigner, derive_identifier,
};
pub use types::{ComponentDescriptor, MemberDescriptor, RunContext, VOID_TYPE};
