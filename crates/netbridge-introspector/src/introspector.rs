//! Component introspection.
//!
//! # Examples
//!
//! ```no_run
//! use netbridge_introspector::Introspector;
//! use std::path::Path;
//!
//! # fn example() -> netbridge_core::Result<()> {
//! let introspector = Introspector::for_path(Path::new("bin/Demo.dll"));
//! let component = introspector.introspect(Path::new("bin/Demo.dll"))?;
//! for member in &component.members {
//!     println!("{}", member.qualified_name());
//! }
//! # Ok(())
//! # }
//! ```

use crate::eligibility::{Eligibility, classify};
use crate::provider::{ComponentProvider, provider_for_path};
use crate::types::{ComponentMetadata, MemberMetadata, TypeMetadata};
use netbridge_core::{ComponentDescriptor, Error, MemberDescriptor, Result};
use serde::Serialize;
use std::path::Path;

/// A member together with its eligibility verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedMember {
    /// Namespace of the declaring type
    pub namespace: String,
    /// Declaring type name
    pub type_name: String,
    /// Member name
    pub member_name: String,
    /// Verdict
    pub eligibility: Eligibility,
}

/// Enumerates the invocable members of a component.
#[derive(Debug)]
pub struct Introspector {
    provider: Box<dyn ComponentProvider>,
}

impl Introspector {
    /// Creates an introspector over the given provider.
    #[must_use]
    pub fn new(provider: Box<dyn ComponentProvider>) -> Self {
        Self { provider }
    }

    /// Creates an introspector with the provider matching `path`.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        Self::new(provider_for_path(path))
    }

    /// Returns the provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Loads the component and returns its invocable members.
    ///
    /// Member order is type enumeration order, then member declaration
    /// order within each type. The descriptor's source path is the
    /// assembly named by the provider, or `path` itself.
    ///
    /// # Errors
    ///
    /// Propagates provider load errors, and returns
    /// [`Error::NothingToExport`] when no member qualifies.
    pub fn introspect(&self, path: &Path) -> Result<ComponentDescriptor> {
        let metadata = self.load(path)?;
        let members = select_members(&metadata);

        tracing::info!(
            provider = self.provider.name(),
            types = metadata.types.len(),
            members = metadata.member_count(),
            invocable = members.len(),
            "introspected {}",
            path.display()
        );

        if members.is_empty() {
            return Err(Error::NothingToExport {
                path: path.to_path_buf(),
            });
        }

        Ok(ComponentDescriptor {
            source_path: metadata.assembly.unwrap_or_else(|| path.to_path_buf()),
            members,
        })
    }

    /// Loads the component and classifies every member, eligible or not.
    ///
    /// # Errors
    ///
    /// Propagates provider load errors. An empty result is not an error.
    pub fn classify_all(&self, path: &Path) -> Result<Vec<ClassifiedMember>> {
        let metadata = self.load(path)?;

        Ok(metadata
            .types
            .iter()
            .flat_map(|owner| {
                owner.members.iter().map(move |member| ClassifiedMember {
                    namespace: owner.namespace.clone(),
                    type_name: owner.name.clone(),
                    member_name: member.name.clone(),
                    eligibility: classify(owner, member),
                })
            })
            .collect())
    }

    fn load(&self, path: &Path) -> Result<ComponentMetadata> {
        tracing::debug!(provider = self.provider.name(), "loading {}", path.display());
        self.provider.load(path)
    }
}

/// Applies the eligibility rule to every member, keeping discovery order.
#[must_use]
pub fn select_members(metadata: &ComponentMetadata) -> Vec<MemberDescriptor> {
    let mut selected = Vec::new();

    for owner in &metadata.types {
        for member in &owner.members {
            match classify(owner, member) {
                Eligibility::Eligible => selected.push(to_descriptor(owner, member)),
                Eligibility::Excluded(reason) => {
                    tracing::debug!("skipping {}.{}: {reason}", owner.full_name(), member.name);
                }
            }
        }
    }

    selected
}

fn to_descriptor(owner: &TypeMetadata, member: &MemberMetadata) -> MemberDescriptor {
    MemberDescriptor {
        namespace: owner.namespace.clone(),
        type_name: owner.name.clone(),
        member_name: member.name.clone(),
        is_static: member.is_static,
        return_type: member.return_type.clone(),
        parameter_types: member.parameter_types.clone(),
    }
}
