//! Artifact generation for netbridge.
//!
//! Turns an introspected component into two files in a destination
//! directory:
//!
//! - `config.toml`, a manifest listing the source component and every
//!   exported member with its signature;
//! - `handler.js`, a CommonJS module exposing one promise-returning
//!   function per member through an edge-js style bridge.
//!
//! Both files are rendered from Handlebars templates, fully in memory, and
//! written only after rendering succeeds.
//!
//! # Examples
//!
//! ```no_run
//! use netbridge_codegen::{GeneratorOptions, Pipeline};
//! use netbridge_core::RunContext;
//!
//! # fn example() -> netbridge_core::Result<()> {
//! let ctx = RunContext::new("bin/Demo.dll", "out")?;
//! let pipeline = Pipeline::new(GeneratorOptions::default())?;
//! let report = pipeline.run(&ctx)?;
//!
//! for path in &report.written {
//!     println!("wrote {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod bridge;
pub mod generator;
pub mod manifest;
pub mod pipeline;
pub mod template_engine;
pub mod types;
pub mod writer;

pub use generator::{ArtifactGenerator, GeneratorOptions};
pub use pipeline::Pipeline;
pub use template_engine::TemplateEngine;
pub use types::{BRIDGE_FILE, GeneratedArtifacts, GeneratedFile, GenerationReport, MANIFEST_FILE};
