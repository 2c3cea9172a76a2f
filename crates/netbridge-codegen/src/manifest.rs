//! Manifest emitter (`config.toml`).
//!
//! The manifest holds one `[source]` table with the component path and one
//! `[[export]]` table per invocable member, in member order:
//!
//! ```toml
//! [source]
//! path = '/opt/app/Demo.dll'
//!
//! [[export]]
//! namespace = 'Demo'
//! class = 'Calc'
//! method = 'Add'
//! static = false
//! returns = 'System.Int32'
//! params = ['System.Int32', 'System.Int32']
//! ```

use crate::template_engine::{MANIFEST_TEMPLATE, TemplateEngine};
use crate::types::{ArtifactContext, GeneratedFile, MANIFEST_FILE};
use netbridge_core::Result;
use std::fmt::Write as _;

/// Renders `value` as a TOML string that parses back to exactly `value`.
///
/// Values without `'` or control characters become literal strings
/// (`'C:\bin\Demo.dll'`), which need no escaping at all. Anything else
/// becomes a basic string with `\\`, `\"` and control-character escapes.
///
/// # Examples
///
/// ```
/// use netbridge_codegen::manifest::toml_string;
///
/// assert_eq!(toml_string("System.Int32"), "'System.Int32'");
/// assert_eq!(toml_string(r"C:\bin\Demo.dll"), r"'C:\bin\Demo.dll'");
/// assert_eq!(toml_string("O'Brien"), r#""O'Brien""#);
/// ```
#[must_use]
pub fn toml_string(value: &str) -> String {
    let literal_safe = !value.contains('\'') && !value.chars().any(|c| c.is_control() && c != '\t');
    if literal_safe {
        return format!("'{value}'");
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Renders the manifest for `context`.
///
/// # Errors
///
/// Returns [`netbridge_core::Error::TemplateError`] if rendering fails.
pub fn render_manifest(engine: &TemplateEngine<'_>, context: &ArtifactContext) -> Result<GeneratedFile> {
    let content = engine.render(MANIFEST_TEMPLATE, context)?;
    tracing::debug!(exports = context.exports.len(), bytes = content.len(), "rendered manifest");

    Ok(GeneratedFile {
        path: MANIFEST_FILE.to_string(),
        content,
    })
}
