//! Artifact generator.
//!
//! Turns a [`ComponentDescriptor`] into the manifest and bridge module,
//! fully in memory. Nothing touches the filesystem here; see
//! [`crate::writer`] for that.
//!
//! # Examples
//!
//! ```
//! use netbridge_codegen::{ArtifactGenerator, GeneratorOptions};
//! use netbridge_core::{CollisionPolicy, ComponentDescriptor, MemberDescriptor};
//! use std::path::PathBuf;
//!
//! let component = ComponentDescriptor {
//!     source_path: PathBuf::from("/opt/app/Demo.dll"),
//!     members: vec![MemberDescriptor {
//!         namespace: "Demo".to_string(),
//!         type_name: "Calc".to_string(),
//!         member_name: "Add".to_string(),
//!         is_static: false,
//!         return_type: "System.Int32".to_string(),
//!         parameter_types: vec!["System.Int32".to_string(), "System.Int32".to_string()],
//!     }],
//! };
//!
//! let options = GeneratorOptions::default().with_collision_policy(CollisionPolicy::Reject);
//! let generator = ArtifactGenerator::with_options(options).unwrap();
//! let artifacts = generator.generate(&component).unwrap();
//!
//! assert!(artifacts.bridge().unwrap().contains("Demo_Calc_Add_raw"));
//! ```

use crate::bridge::{RAW_SUFFIX, render_bridge};
use crate::manifest::render_manifest;
use crate::template_engine::TemplateEngine;
use crate::types::{ArtifactContext, ExportRecord, GeneratedArtifacts};
use netbridge_core::{
    CollisionPolicy, ComponentDescriptor, Error, IdentifierAssigner, MemberDescriptor, Result,
};
use serde::{Deserialize, Serialize};

/// Default module name passed to `require` in the bridge.
pub const DEFAULT_BRIDGE_MODULE: &str = "edge-js";

/// Generator name written into both header comments.
pub const GENERATOR_NAME: &str = "netbridge";

/// Options for a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// npm module providing `edge.func`
    pub bridge_module: String,
    /// How duplicate identifiers are handled
    pub collision_policy: CollisionPolicy,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            bridge_module: DEFAULT_BRIDGE_MODULE.to_string(),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl GeneratorOptions {
    /// Sets the bridge module name.
    #[must_use]
    pub fn with_bridge_module(mut self, module: impl Into<String>) -> Self {
        self.bridge_module = module.into();
        self
    }

    /// Sets the collision policy.
    #[must_use]
    pub const fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Checks that the options can be rendered safely.
    ///
    /// The bridge module name lands in a `//` comment and a string literal,
    /// so it must be non-empty and free of whitespace, quotes and control
    /// characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let module = &self.bridge_module;
        if module.is_empty() {
            return Err(Error::ConfigError {
                message: "bridge module name cannot be empty".to_string(),
            });
        }
        if let Some(c) = module
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '\'' | '"' | '\\' | '`'))
        {
            return Err(Error::ConfigError {
                message: format!(
                    "bridge module name '{}' contains invalid character {c:?}",
                    module.escape_debug()
                ),
            });
        }
        Ok(())
    }
}

/// Renders the manifest and bridge module for a component.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`, allowing safe use across threads.
#[derive(Debug)]
pub struct ArtifactGenerator<'a> {
    engine: TemplateEngine<'a>,
    options: GeneratorOptions,
}

impl ArtifactGenerator<'_> {
    /// Creates a generator with default options.
    ///
    /// # Errors
    ///
    /// Returns error if template registration fails.
    pub fn new() -> Result<Self> {
        Self::with_options(GeneratorOptions::default())
    }

    /// Creates a generator with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the options are invalid, or a
    /// template error if registration fails.
    pub fn with_options(options: GeneratorOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            engine: TemplateEngine::new()?,
            options,
        })
    }

    /// Returns the options in effect.
    #[must_use]
    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Builds the template context: one export per member, in member order,
    /// with identifiers assigned under the configured collision policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentifierCollision`] under
    /// [`CollisionPolicy::Reject`], or [`Error::InvalidInput`] if the
    /// component path is not valid UTF-8.
    pub fn context(&self, component: &ComponentDescriptor) -> Result<ArtifactContext> {
        let source_path = component
            .source_path
            .to_str()
            .ok_or_else(|| Error::InvalidInput {
                path: component.source_path.clone(),
                reason: "component path is not valid UTF-8".to_string(),
            })?
            .to_string();

        let mut assigner = IdentifierAssigner::new(self.options.collision_policy);
        let exports = component
            .members
            .iter()
            .map(|member| export_record(&mut assigner, member))
            .collect::<Result<Vec<_>>>()?;

        Ok(ArtifactContext {
            generator: GENERATOR_NAME.to_string(),
            bridge_module: self.options.bridge_module.clone(),
            source_path,
            exports,
        })
    }

    /// Renders both artifacts, manifest first.
    ///
    /// # Errors
    ///
    /// Returns error if identifier assignment or rendering fails. Either
    /// both files are produced or neither is.
    pub fn generate(&self, component: &ComponentDescriptor) -> Result<GeneratedArtifacts> {
        tracing::info!(
            members = component.member_count(),
            policy = %self.options.collision_policy,
            "generating artifacts for {}",
            component.source_path.display()
        );

        let context = self.context(component)?;
        self.render(&context)
    }

    /// Renders both artifacts from a prepared context, manifest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if rendering fails.
    pub fn render(&self, context: &ArtifactContext) -> Result<GeneratedArtifacts> {
        let manifest = render_manifest(&self.engine, context)?;
        let bridge = render_bridge(&self.engine, context)?;

        Ok(GeneratedArtifacts {
            files: vec![manifest, bridge],
        })
    }
}

fn export_record(assigner: &mut IdentifierAssigner, member: &MemberDescriptor) -> Result<ExportRecord> {
    let identifier = assigner.assign(&member.namespace, &member.type_name, &member.member_name)?;

    Ok(ExportRecord {
        binding: format!("{identifier}{RAW_SUFFIX}"),
        identifier,
        namespace: member.namespace.clone(),
        class: member.type_name.clone(),
        method: member.member_name.clone(),
        qualified_type: member.qualified_type_name(),
        is_static: member.is_static,
        returns: member.return_type.clone(),
        params: member.parameter_types.clone(),
    })
}
