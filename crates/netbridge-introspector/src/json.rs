//! JSON component description provider.

use crate::provider::ComponentProvider;
use crate::types::ComponentMetadata;
use netbridge_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Reads a component description from a JSON file.
///
/// The file has the serde shape of [`ComponentMetadata`]. Useful for
/// components whose metadata is extracted by external tooling. A relative
/// `assembly` is resolved against the directory holding the description.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDescriptionProvider;

impl JsonDescriptionProvider {
    /// Creates the provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses a description from an in-memory document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoadable`] if the document is not a valid
    /// component description.
    pub fn parse(path: &Path, document: &str) -> Result<ComponentMetadata> {
        serde_json::from_str(document).map_err(|e| Error::NotLoadable {
            path: path.to_path_buf(),
            reason: format!("invalid component description: {e}"),
        })
    }
}

impl ComponentProvider for JsonDescriptionProvider {
    fn name(&self) -> &'static str {
        "json-description"
    }

    fn load(&self, path: &Path) -> Result<ComponentMetadata> {
        let document = std::fs::read_to_string(path).map_err(|e| Error::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut metadata = Self::parse(path, &document)?;
        metadata.assembly = metadata
            .assembly
            .map(|assembly| resolve_assembly(path, &assembly))
            .transpose()?;

        tracing::debug!(
            path = %path.display(),
            types = metadata.types.len(),
            assembly = ?metadata.assembly,
            "loaded component description"
        );
        Ok(metadata)
    }
}

fn resolve_assembly(description: &Path, assembly: &Path) -> Result<PathBuf> {
    if assembly.as_os_str().is_empty() {
        return Err(Error::NotLoadable {
            path: description.to_path_buf(),
            reason: "invalid component description: empty assembly path".to_string(),
        });
    }

    let joined = description
        .parent()
        .map_or_else(|| assembly.to_path_buf(), |dir| dir.join(assembly));
    std::path::absolute(&joined).map_err(|e| Error::LoadFailed {
        path: description.to_path_buf(),
        message: format!("cannot resolve assembly {}: {e}", assembly.display()),
    })
}
