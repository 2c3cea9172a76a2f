//! Introspect command implementation.
//!
//! Loads a component and lists the members `generate` would export, or
//! with `--all` every declared member and its verdict.

use anyhow::{Context, Result};
use netbridge_core::cli::{ExitCode, OutputFormat};
use netbridge_core::{CollisionPolicy, Error, IdentifierAssigner, MemberDescriptor};
use netbridge_introspector::Introspector;
use netbridge_introspector::introspector::ClassifiedMember;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Exported members of a component.
#[derive(Debug, Serialize)]
struct IntrospectionResult {
    /// Component path
    source: String,
    /// Provider that read the component
    provider: &'static str,
    /// Collision policy the identifiers were assigned under
    collision_policy: CollisionPolicy,
    /// Number of exported members
    export_count: usize,
    /// Exported members with the identifiers `generate` would emit
    exports: Vec<ExportedMember>,
}

#[derive(Debug, Serialize)]
struct ExportedMember {
    identifier: String,
    #[serde(flatten)]
    member: MemberDescriptor,
}

/// Every member of a component with its verdict.
#[derive(Debug, Serialize)]
struct ClassificationResult {
    /// Component path
    source: String,
    /// Provider that read the component
    provider: &'static str,
    /// Number of declared members
    member_count: usize,
    /// Number of exported members
    eligible_count: usize,
    /// All members in declaration order
    members: Vec<ClassifiedMember>,
}

/// Runs the introspect command.
///
/// # Errors
///
/// Returns an error wrapping [`netbridge_core::Error`] if the component
/// cannot be read or, without `all`, exports nothing or hits a collision
/// under [`CollisionPolicy::Reject`].
pub fn run(
    component: &Path,
    all: bool,
    policy: CollisionPolicy,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    info!(component = %component.display(), all, %policy, "introspect");

    if !component.is_file() {
        return Err(Error::InvalidInput {
            path: component.to_path_buf(),
            reason: "component path is not an existing file".to_string(),
        }
        .into());
    }

    let introspector = Introspector::for_path(component);
    let source = component.display().to_string();

    let formatted = if all {
        let members = introspector.classify_all(component)?;
        let result = ClassificationResult {
            source,
            provider: introspector.provider_name(),
            member_count: members.len(),
            eligible_count: members.iter().filter(|m| m.eligibility.is_eligible()).count(),
            members,
        };
        crate::formatters::format_output(&result, output_format)
    } else {
        let descriptor = introspector.introspect(component)?;
        let exports = assign_identifiers(descriptor.members, policy)?;
        let result = IntrospectionResult {
            source,
            provider: introspector.provider_name(),
            collision_policy: policy,
            export_count: exports.len(),
            exports,
        };
        crate::formatters::format_output(&result, output_format)
    }
    .context("failed to format introspection result")?;

    println!("{formatted}");

    Ok(ExitCode::SUCCESS)
}

/// Pairs members with identifiers assigned in member order, as `generate` does.
fn assign_identifiers(
    members: Vec<MemberDescriptor>,
    policy: CollisionPolicy,
) -> netbridge_core::Result<Vec<ExportedMember>> {
    let mut assigner = IdentifierAssigner::new(policy);
    let mut exports = Vec::with_capacity(members.len());
    for member in members {
        let identifier =
            assigner.assign(&member.namespace, &member.type_name, &member.member_name)?;
        exports.push(ExportedMember { identifier, member });
    }
    Ok(exports)
}
