//! Types for artifact generation.
//!
//! # Examples
//!
//! ```
//! use netbridge_codegen::{GeneratedArtifacts, GeneratedFile};
//!
//! let artifacts = GeneratedArtifacts {
//!     files: vec![GeneratedFile {
//!         path: "config.toml".to_string(),
//!         content: "[source]\n".to_string(),
//!     }],
//! };
//!
//! assert_eq!(artifacts.file_count(), 1);
//! assert!(artifacts.get("config.toml").is_some());
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name of the manifest artifact.
pub const MANIFEST_FILE: &str = "config.toml";

/// File name of the bridge module artifact.
pub const BRIDGE_FILE: &str = "handler.js";

/// Everything one generation run produces, rendered in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifacts {
    /// Generated files, manifest first
    pub files: Vec<GeneratedFile>,
}

impl GeneratedArtifacts {
    /// Returns the number of generated files.
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Returns the file with the given relative path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Returns the manifest content, if generated.
    #[must_use]
    pub fn manifest(&self) -> Option<&str> {
        self.get(MANIFEST_FILE).map(GeneratedFile::content)
    }

    /// Returns the bridge module content, if generated.
    #[must_use]
    pub fn bridge(&self) -> Option<&str> {
        self.get(BRIDGE_FILE).map(GeneratedFile::content)
    }
}

/// A single generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Path relative to the destination directory
    pub path: String,
    /// File content
    pub content: String,
}

impl GeneratedFile {
    /// Returns the file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the file content.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// One exported member as both templates see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    /// Derived (and possibly disambiguated) identifier
    pub identifier: String,
    /// Name of the raw `edge.func` binding
    pub binding: String,
    /// Namespace; empty for the global namespace
    pub namespace: String,
    /// Declaring type name
    pub class: String,
    /// Member name
    pub method: String,
    /// `namespace.class`, or `class` alone for the global namespace
    pub qualified_type: String,
    /// Whether the member is static
    pub is_static: bool,
    /// Return type name
    pub returns: String,
    /// Parameter type names in declaration order
    pub params: Vec<String>,
}

/// Template context shared by the manifest and bridge templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactContext {
    /// Generator name for the header comments
    pub generator: String,
    /// Module name passed to `require`
    pub bridge_module: String,
    /// Absolute component path
    pub source_path: String,
    /// Exports in member order
    pub exports: Vec<ExportRecord>,
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Component the artifacts were generated from
    pub source: PathBuf,
    /// Files written, manifest first
    pub written: Vec<PathBuf>,
    /// Identifiers in export order
    pub identifiers: Vec<String>,
}

impl GenerationReport {
    /// Returns the number of exported members.
    #[must_use]
    pub fn export_count(&self) -> usize {
        self.identifiers.len()
    }
}
