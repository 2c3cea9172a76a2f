//! Bridge module emitter (`handler.js`).
//!
//! The bridge is a CommonJS module. For each export it declares a raw
//! binding through `edge.func`, then a single `handlers` object that wraps
//! each binding in a one-argument function returning a `Promise`:
//!
//! ```js
//! const Demo_Calc_Add_raw = edge.func({
//!   assemblyFile: '/opt/app/Demo.dll',
//!   typeName: 'Demo.Calc',
//!   methodName: 'Add',
//! });
//!
//! const handlers = {
//!   Demo_Calc_Add: (payload = null) =>
//!     new Promise((resolve, reject) => { /* ... */ }),
//! };
//!
//! module.exports = handlers;
//! ```

use crate::template_engine::{BRIDGE_TEMPLATE, TemplateEngine};
use crate::types::{ArtifactContext, BRIDGE_FILE, GeneratedFile};
use netbridge_core::Result;

/// Suffix distinguishing a raw binding from its wrapper.
pub const RAW_SUFFIX: &str = "_raw";

/// Renders the bridge module for `context`.
///
/// # Errors
///
/// Returns [`netbridge_core::Error::TemplateError`] if rendering fails.
pub fn render_bridge(engine: &TemplateEngine<'_>, context: &ArtifactContext) -> Result<GeneratedFile> {
    let content = engine.render(BRIDGE_TEMPLATE, context)?;
    tracing::debug!(
        exports = context.exports.len(),
        module = %context.bridge_module,
        bytes = content.len(),
        "rendered bridge module"
    );

    Ok(GeneratedFile {
        path: BRIDGE_FILE.to_string(),
        content,
    })
}
