//! Domain model for one generation run.
//!
//! # Examples
//!
//! ```
//! use netbridge_core::MemberDescriptor;
//!
//! let add = MemberDescriptor {
//!     namespace: "Demo".to_string(),
//!     type_name: "Calc".to_string(),
//!     member_name: "Add".to_string(),
//!     is_static: false,
//!     return_type: "System.Int32".to_string(),
//!     parameter_types: vec!["System.Int32".to_string(), "System.Int32".to_string()],
//! };
//!
//! assert_eq!(add.qualified_type_name(), "Demo.Calc");
//! assert_eq!(add.identifier(), "Demo_Calc_Add");
//! ```

use crate::{Error, Result, derive_identifier};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fully-qualified name of the "no value" return type.
pub const VOID_TYPE: &str = "System.Void";

/// An invocable member of a component.
///
/// Created by the introspector and consumed read-only by the emitters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Namespace of the declaring type; empty for the global namespace
    pub namespace: String,
    /// Simple name of the declaring type
    pub type_name: String,
    /// Name of the member
    pub member_name: String,
    /// Whether the member is invoked without a receiver instance
    pub is_static: bool,
    /// Fully-qualified return type name (never [`VOID_TYPE`])
    pub return_type: String,
    /// Fully-qualified parameter type names in declaration order
    pub parameter_types: Vec<String>,
}

impl MemberDescriptor {
    /// Returns `namespace.type_name`, or just `type_name` for the global namespace.
    #[must_use]
    pub fn qualified_type_name(&self) -> String {
        if self.namespace.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}.{}", self.namespace, self.type_name)
        }
    }

    /// Returns the member's qualified name, e.g. `Demo.Calc.Add`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.qualified_type_name(), self.member_name)
    }

    /// Returns the derived identifier before any collision handling.
    #[must_use]
    pub fn identifier(&self) -> String {
        derive_identifier(&self.namespace, &self.type_name, &self.member_name)
    }
}

/// The introspected surface of one component.
///
/// Rebuilt on every run; member order is the discovery order and is carried
/// verbatim into both artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Absolute path of the component
    pub source_path: PathBuf,
    /// Invocable members in discovery order
    pub members: Vec<MemberDescriptor>,
}

impl ComponentDescriptor {
    /// Returns the number of invocable members.
    #[inline]
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if no member qualified.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Explicit input of a generation run.
///
/// Both paths are validated once at construction and never change afterwards.
///
/// # Examples
///
/// ```no_run
/// use netbridge_core::RunContext;
///
/// # fn example() -> netbridge_core::Result<()> {
/// let ctx = RunContext::new("bin/Demo.dll", "out")?;
/// println!("{}", ctx.source_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    source_path: PathBuf,
    destination: PathBuf,
}

impl RunContext {
    /// Validates the paths and builds the run context.
    ///
    /// The source path is made absolute so that generated artifacts do not
    /// depend on the working directory of the consumer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the source is not an existing file
    /// or the destination is not an existing directory.
    pub fn new(source_path: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Self> {
        let source_path = source_path.as_ref();
        let destination = destination.as_ref();

        if !source_path.is_file() {
            return Err(Error::InvalidInput {
                path: source_path.to_path_buf(),
                reason: if source_path.exists() {
                    "component path is not a file".to_string()
                } else {
                    "component path does not exist".to_string()
                },
            });
        }

        if !destination.is_dir() {
            return Err(Error::InvalidInput {
                path: destination.to_path_buf(),
                reason: if destination.exists() {
                    "destination is not a directory".to_string()
                } else {
                    "destination directory does not exist".to_string()
                },
            });
        }

        let absolute = |path: &Path| {
            std::path::absolute(path).map_err(|e| Error::InvalidInput {
                path: path.to_path_buf(),
                reason: format!("cannot resolve absolute path: {e}"),
            })
        };

        Ok(Self {
            source_path: absolute(source_path)?,
            destination: absolute(destination)?,
        })
    }

    /// Returns the absolute component path.
    #[inline]
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Returns the absolute destination directory.
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}
