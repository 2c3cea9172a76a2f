//! End-to-end generation run.
//!
//! A run introspects the component, renders both artifacts in memory and
//! only then writes them. Any failure before the write phase leaves the
//! destination directory exactly as it was.
//!
//! # Examples
//!
//! ```no_run
//! use netbridge_codegen::{GeneratorOptions, Pipeline};
//! use netbridge_core::RunContext;
//!
//! # fn example() -> netbridge_core::Result<()> {
//! let ctx = RunContext::new("bin/Demo.dll", "out")?;
//! let report = Pipeline::new(GeneratorOptions::default())?.run(&ctx)?;
//! println!("{} members exported", report.export_count());
//! # Ok(())
//! # }
//! ```

use crate::generator::{ArtifactGenerator, GeneratorOptions};
use crate::types::GenerationReport;
use crate::writer::write_artifacts;
use netbridge_core::{Result, RunContext};
use netbridge_introspector::Introspector;

/// Introspect, generate, write.
#[derive(Debug)]
pub struct Pipeline<'a> {
    generator: ArtifactGenerator<'a>,
}

impl Pipeline<'_> {
    /// Creates a pipeline with the given generator options.
    ///
    /// # Errors
    ///
    /// Returns [`netbridge_core::Error::ConfigError`] if the options are
    /// invalid.
    pub fn new(options: GeneratorOptions) -> Result<Self> {
        Ok(Self {
            generator: ArtifactGenerator::with_options(options)?,
        })
    }

    /// Runs the pipeline with the provider matching the component path.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any stage.
    pub fn run(&self, ctx: &RunContext) -> Result<GenerationReport> {
        self.run_with(&Introspector::for_path(ctx.source_path()), ctx)
    }

    /// Runs the pipeline with an explicit introspector.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any stage.
    pub fn run_with(
        &self,
        introspector: &Introspector,
        ctx: &RunContext,
    ) -> Result<GenerationReport> {
        let component = introspector.introspect(ctx.source_path())?;
        let context = self.generator.context(&component)?;
        let artifacts = self.generator.render(&context)?;
        let written = write_artifacts(ctx.destination(), &artifacts)?;

        tracing::info!(
            exports = component.member_count(),
            destination = %ctx.destination().display(),
            "generation complete"
        );

        Ok(GenerationReport {
            source: component.source_path,
            written,
            identifiers: context.exports.into_iter().map(|e| e.identifier).collect(),
        })
    }
}
