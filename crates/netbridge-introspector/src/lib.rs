//! Component introspection for netbridge.
//!
//! Loads a component through a [`ComponentProvider`], then filters its
//! members down to the invocable subset that the emitters consume.
//!
//! Two providers ship with the crate:
//! - [`ClrMetadataProvider`] reads ECMA-335 metadata tables straight from a
//!   PE image (`.dll`/`.exe`), without loading or running any code.
//! - [`JsonDescriptionProvider`] reads a JSON component description, for
//!   components described by external tooling.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod eligibility;
pub mod introspector;
pub mod json;
pub mod metadata;
pub mod provider;
pub mod types;

pub use eligibility::{Eligibility, Exclusion};
pub use introspector::Introspector;
pub use json::JsonDescriptionProvider;
pub use metadata::ClrMetadataProvider;
pub use provider::{ComponentProvider, provider_for_path};
pub use types::{ComponentMetadata, MemberMetadata, TypeKind, TypeMetadata, Visibility};
