//! Generate command implementation.
//!
//! Writes the manifest and bridge module for a component:
//! 1. Validates the component path and destination directory
//! 2. Merges command-line options over the configured defaults
//! 3. Runs the introspect, render and write pipeline
//! 4. Reports the written files and exported identifiers

use anyhow::{Context, Result};
use netbridge_codegen::{GeneratorOptions, Pipeline};
use netbridge_core::cli::{ExitCode, OutputFormat};
use netbridge_core::{CollisionPolicy, RunContext};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Result of a generation run.
#[derive(Debug, Serialize)]
struct GenerationResult {
    /// Absolute component path
    source: String,
    /// Module required by the bridge
    bridge_module: String,
    /// Collision policy in effect
    collision_policy: CollisionPolicy,
    /// Files written, manifest first
    written: Vec<String>,
    /// Exported identifiers in member order
    exports: Vec<String>,
}

/// Merges command-line overrides into the configured generator options.
///
/// # Errors
///
/// Returns an error if `collisions` is not a known policy.
pub fn resolve_options(
    defaults: GeneratorOptions,
    bridge_module: Option<String>,
    collisions: Option<&str>,
) -> Result<GeneratorOptions> {
    let mut options = defaults;
    if let Some(module) = bridge_module {
        options = options.with_bridge_module(module);
    }
    if let Some(policy) = collisions {
        options = options.with_collision_policy(policy.parse::<CollisionPolicy>()?);
    }
    options.validate()?;
    Ok(options)
}

/// Runs the generate command.
///
/// # Errors
///
/// Returns an error wrapping [`netbridge_core::Error`] if any stage of the
/// run fails; in that case nothing has been written.
///
/// # Examples
///
/// ```no_run
/// use netbridge_cli::commands::generate;
/// use netbridge_codegen::GeneratorOptions;
/// use netbridge_core::cli::OutputFormat;
/// use std::path::Path;
///
/// let code = generate::run(
///     Path::new("bin/Demo.dll"),
///     Path::new("out"),
///     GeneratorOptions::default(),
///     OutputFormat::Json,
/// )?;
/// assert!(code.is_success());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn run(
    component: &Path,
    dest: &Path,
    options: GeneratorOptions,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    info!(
        component = %component.display(),
        dest = %dest.display(),
        module = %options.bridge_module,
        policy = %options.collision_policy,
        "generate"
    );

    let ctx = RunContext::new(component, dest)?;
    let result_options = options.clone();
    let report = Pipeline::new(options)?.run(&ctx)?;

    let result = GenerationResult {
        source: report.source.display().to_string(),
        bridge_module: result_options.bridge_module,
        collision_policy: result_options.collision_policy,
        written: report
            .written
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        exports: report.identifiers,
    };

    let formatted = crate::formatters::format_output(&result, output_format)
        .context("failed to format generation result")?;
    println!("{formatted}");

    Ok(ExitCode::SUCCESS)
}
