//! Provider-level description of a component.
//!
//! These types describe *every* declared type and member, before the
//! eligibility filter runs. Providers produce them; the [`Introspector`]
//! turns them into [`MemberDescriptor`]s.
//!
//! The serde shape doubles as the JSON component description format read by
//! [`JsonDescriptionProvider`]:
//!
//! ```json
//! {
//!   "assembly": "bin/Release/Demo.dll",
//!   "types": [
//!     {
//!       "namespace": "Demo",
//!       "name": "Calc",
//!       "kind": "class",
//!       "members": [
//!         {
//!           "name": "Add",
//!           "visibility": "public",
//!           "is_static": false,
//!           "return_type": "System.Int32",
//!           "parameter_types": ["System.Int32", "System.Int32"]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! [`Introspector`]: crate::Introspector
//! [`MemberDescriptor`]: netbridge_core::MemberDescriptor
//! [`JsonDescriptionProvider`]: crate::JsonDescriptionProvider

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Everything a provider knows about a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    /// Runtime version recorded in the image, when the format has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
    /// Assembly the bridge loads, when it is not the file that was read.
    ///
    /// Descriptions name their assembly here; providers return it absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly: Option<PathBuf>,
    /// Declared types in enumeration order
    #[serde(default)]
    pub types: Vec<TypeMetadata>,
}

impl ComponentMetadata {
    /// Returns the total number of members across all types.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.types.iter().map(|t| t.members.len()).sum()
    }
}

/// A declared type and its methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMetadata {
    /// Namespace; empty for the global namespace
    #[serde(default)]
    pub namespace: String,
    /// Simple type name
    pub name: String,
    /// Kind of type
    #[serde(default)]
    pub kind: TypeKind,
    /// Methods in declaration order
    #[serde(default)]
    pub members: Vec<MemberMetadata>,
}

impl TypeMetadata {
    /// Returns `namespace.name`, or `name` for the global namespace.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// Reference type
    #[default]
    Class,
    /// Delegate type; a class as far as invocation is concerned
    Delegate,
    /// Value type
    Struct,
    /// Enumeration (a value type)
    Enum,
    /// Interface
    Interface,
}

impl TypeKind {
    /// Returns `true` for class-like kinds (classes and delegates).
    #[must_use]
    pub const fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::Delegate)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::Delegate => "delegate",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Interface => "interface",
        })
    }
}

/// Member accessibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible everywhere
    #[default]
    Public,
    /// `protected`
    Family,
    /// `internal`
    Assembly,
    /// `protected internal`
    FamilyOrAssembly,
    /// `private protected`
    FamilyAndAssembly,
    /// `private` or compiler-controlled
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Public => "public",
            Self::Family => "protected",
            Self::Assembly => "internal",
            Self::FamilyOrAssembly => "protected internal",
            Self::FamilyAndAssembly => "private protected",
            Self::Private => "private",
        })
    }
}

/// A method declared on a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberMetadata {
    /// Method name
    pub name: String,
    /// Accessibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Whether the method is static
    #[serde(default)]
    pub is_static: bool,
    /// Whether the platform marks the method special (accessors, operators)
    #[serde(default)]
    pub is_special: bool,
    /// Fully-qualified return type name; `System.Void` for no value
    pub return_type: String,
    /// Fully-qualified parameter type names in declaration order
    #[serde(default)]
    pub parameter_types: Vec<String>,
}
