//! Template engine for artifact generation using Handlebars.
//!
//! Wraps Handlebars with the two built-in templates and the quoting
//! helpers they rely on:
//!
//! - `{{js_str value}}` renders a single-quoted JavaScript string literal
//!   using [`escape_single_quoted`](netbridge_core::escape_single_quoted).
//! - `{{toml_str value}}` renders a TOML string using
//!   [`toml_string`](crate::manifest::toml_string).
//!
//! HTML escaping is disabled; every interpolated string goes through one of
//! the helpers instead.
//!
//! # Examples
//!
//! ```
//! use netbridge_codegen::template_engine::TemplateEngine;
//! use serde_json::json;
//!
//! let mut engine = TemplateEngine::new().unwrap();
//! engine.register_template_string("greet", "const name = {{js_str name}};").unwrap();
//! let out = engine.render("greet", &json!({"name": "O'Brien"})).unwrap();
//! assert_eq!(out, r"const name = 'O\'Brien';");
//! ```

use handlebars::{Handlebars, no_escape};
use netbridge_core::{Error, Result};
use serde::Serialize;

/// Name of the manifest template.
pub const MANIFEST_TEMPLATE: &str = "manifest";

/// Name of the bridge module template.
pub const BRIDGE_TEMPLATE: &str = "bridge";

mod helpers {
    use crate::manifest::toml_string;
    use handlebars::handlebars_helper;
    use netbridge_core::escape_single_quoted;

    handlebars_helper!(js_str: |value: str| format!("'{}'", escape_single_quoted(value)));
    handlebars_helper!(toml_str: |value: str| toml_string(value));
}

/// Template engine for artifact generation.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`, allowing it to be used across
/// thread boundaries safely.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Creates a new template engine with the built-in templates registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if a built-in template fails to
    /// parse.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Strict mode: fail on missing variables
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(no_escape);

        handlebars.register_helper("js_str", Box::new(helpers::js_str));
        handlebars.register_helper("toml_str", Box::new(helpers::toml_str));

        let mut engine = Self { handlebars };
        engine.register_template_string(
            MANIFEST_TEMPLATE,
            include_str!("../templates/manifest.toml.hbs"),
        )?;
        engine.register_template_string(
            BRIDGE_TEMPLATE,
            include_str!("../templates/handler.js.hbs"),
        )?;

        Ok(engine)
    }

    /// Renders a template with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if the template is not registered,
    /// the context is missing a referenced field, or a helper fails.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::TemplateError {
                message: format!("rendering '{template_name}' failed: {e}"),
            })
    }

    /// Registers a custom template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if the template string is invalid.
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::TemplateError {
                message: format!("failed to register template '{name}': {e}"),
            })
    }
}
