//! The invocability rule.
//!
//! A member is exported iff it is public, not special, returns a value, and
//! is declared on a class-like type. Parameter count and parameter types
//! play no part; compatibility with the foreign bridge is the bridge's
//! concern.

use crate::types::{MemberMetadata, TypeMetadata, Visibility};
use netbridge_core::VOID_TYPE;
use serde::Serialize;
use std::fmt;

/// Why a member was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    /// Declaring type is a struct, enum or interface
    NotClassLike,
    /// Member is not publicly visible
    NotPublic,
    /// Member is an accessor, operator or other special member
    Special,
    /// Member returns no value
    VoidReturn,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotClassLike => "declaring type is not a class",
            Self::NotPublic => "not public",
            Self::Special => "special member",
            Self::VoidReturn => "returns void",
        })
    }
}

/// Outcome of the eligibility check for one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum Eligibility {
    /// Member is exported
    Eligible,
    /// Member is skipped for the given reason
    Excluded(Exclusion),
}

impl Eligibility {
    /// Returns `true` if the member is exported.
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Classifies a member of `owner`.
///
/// When several rules fail, the first in the order type kind, visibility,
/// special marker, return type is reported.
///
/// # Examples
///
/// ```
/// use netbridge_introspector::eligibility::classify;
/// use netbridge_introspector::{Eligibility, Exclusion, MemberMetadata, TypeKind, TypeMetadata, Visibility};
///
/// let log = MemberMetadata {
///     name: "Log".to_string(),
///     visibility: Visibility::Public,
///     is_static: true,
///     is_special: false,
///     return_type: "System.Void".to_string(),
///     parameter_types: vec!["System.String".to_string()],
/// };
/// let owner = TypeMetadata {
///     namespace: "Demo".to_string(),
///     name: "Calc".to_string(),
///     kind: TypeKind::Class,
///     members: vec![log.clone()],
/// };
///
/// assert_eq!(classify(&owner, &log), Eligibility::Excluded(Exclusion::VoidReturn));
/// ```
#[must_use]
pub fn classify(owner: &TypeMetadata, member: &MemberMetadata) -> Eligibility {
    if !owner.kind.is_class_like() {
        Eligibility::Excluded(Exclusion::NotClassLike)
    } else if member.visibility != Visibility::Public {
        Eligibility::Excluded(Exclusion::NotPublic)
    } else if member.is_special {
        Eligibility::Excluded(Exclusion::Special)
    } else if member.return_type == VOID_TYPE {
        Eligibility::Excluded(Exclusion::VoidReturn)
    } else {
        Eligibility::Eligible
    }
}
