//! Error types for netbridge.
//!
//! Every failure of a generation run maps to exactly one variant of [`Error`].
//! All variants are terminal for the run: nothing is retried and no partial
//! artifact is written.
//!
//! # Examples
//!
//! ```
//! use netbridge_core::{Error, Result};
//! use std::path::PathBuf;
//!
//! fn check(path: &str) -> Result<()> {
//!     if path.is_empty() {
//!         return Err(Error::InvalidInput {
//!             path: PathBuf::from(path),
//!             reason: "path cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = check("").unwrap_err();
//! assert!(err.is_invalid_input());
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for netbridge.
///
/// The first five variants form the run taxonomy: invalid input location,
/// not-a-loadable-module, partial type load, nothing to export, and the
/// unclassified load failure. The rest cover emission and configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// Input location is missing or has the wrong kind.
    ///
    /// Raised before any loading happens, e.g. when the component path is
    /// not a file or the destination is not a directory.
    #[error("Invalid input '{}': {reason}", .path.display())]
    InvalidInput {
        /// Offending path
        path: PathBuf,
        /// Why the path was rejected
        reason: String,
    },

    /// The component is not a loadable module of the expected format.
    #[error("Not a managed/loadable module '{}': {reason}", .path.display())]
    NotLoadable {
        /// Component path
        path: PathBuf,
        /// What made the image unreadable
        reason: String,
    },

    /// The module loaded but some declared types could not be resolved.
    ///
    /// Carries every underlying cause so the caller can report them all.
    #[error("{}", format_partial_load(.path, .causes))]
    PartialTypeLoad {
        /// Component path
        path: PathBuf,
        /// One entry per type or member that failed to resolve
        causes: Vec<String>,
    },

    /// Introspection succeeded but no member satisfies the eligibility rule.
    #[error("Nothing to export: '{}' has no public, non-void methods on class types", .path.display())]
    NothingToExport {
        /// Component path
        path: PathBuf,
    },

    /// Any other failure while loading the component.
    #[error("Failed to load '{}': {message}", .path.display())]
    LoadFailed {
        /// Component path
        path: PathBuf,
        /// Underlying message
        message: String,
    },

    /// Two members derived the same identifier under the `reject` policy.
    #[error("Identifier collision on '{identifier}': {first} and {second}")]
    IdentifierCollision {
        /// The clashing identifier
        identifier: String,
        /// Qualified name of the member that claimed it first
        first: String,
        /// Qualified name of the member that clashed
        second: String,
    },

    /// Template registration or rendering failed.
    #[error("Template error: {message}")]
    TemplateError {
        /// Description of the failure
        message: String,
    },

    /// Writing a generated artifact failed.
    #[error("Failed to write '{}'", .path.display())]
    WriteFailed {
        /// Target file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },
}

fn format_partial_load(path: &std::path::Path, causes: &[String]) -> String {
    let mut out = format!(
        "Partial type load in '{}': {} type(s) could not be resolved",
        path.display(),
        causes.len()
    );
    for cause in causes {
        let _ = write!(out, "\n  - {cause}");
    }
    out
}

impl Error {
    /// Returns `true` if this is an invalid input error.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Returns `true` if the component is not a loadable module.
    ///
    /// # Examples
    ///
    /// ```
    /// use netbridge_core::Error;
    /// use std::path::PathBuf;
    ///
    /// let err = Error::NotLoadable {
    ///     path: PathBuf::from("notes.txt"),
    ///     reason: "missing MZ signature".to_string(),
    /// };
    /// assert!(err.is_not_loadable());
    /// assert!(err.is_load_error());
    /// ```
    #[must_use]
    pub const fn is_not_loadable(&self) -> bool {
        matches!(self, Self::NotLoadable { .. })
    }

    /// Returns `true` if some types of the component failed to resolve.
    #[must_use]
    pub const fn is_partial_type_load(&self) -> bool {
        matches!(self, Self::PartialTypeLoad { .. })
    }

    /// Returns `true` if no member qualified for export.
    #[must_use]
    pub const fn is_nothing_to_export(&self) -> bool {
        matches!(self, Self::NothingToExport { .. })
    }

    /// Returns `true` for any failure raised while loading the component.
    ///
    /// Covers not-loadable, partial type load and unclassified load failures.
    #[must_use]
    pub const fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::NotLoadable { .. } | Self::PartialTypeLoad { .. } | Self::LoadFailed { .. }
        )
    }

    /// Returns `true` if this is an identifier collision.
    #[must_use]
    pub const fn is_identifier_collision(&self) -> bool {
        matches!(self, Self::IdentifierCollision { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns the unresolved causes of a partial type load, or an empty slice.
    #[must_use]
    pub fn causes(&self) -> &[String] {
        match self {
            Self::PartialTypeLoad { causes, .. } => causes.as_slice(),
            _ => &[],
        }
    }
}

/// Result type alias for netbridge operations.
pub type Result<T> = std::result::Result<T, Error>;
