//! Identifier derivation for exported members.
//!
//! [`derive_identifier`] turns a `(namespace, type, member)` triple into a
//! token usable both as a JavaScript identifier and as a lookup key.
//! [`IdentifierAssigner`] applies a [`CollisionPolicy`] across one run, since
//! distinct members (overloads, punctuation-only differences) can derive the
//! same token.
//!
//! # Examples
//!
//! ```
//! use netbridge_core::{CollisionPolicy, IdentifierAssigner, derive_identifier};
//!
//! assert_eq!(derive_identifier("Demo", "Calc", "Add"), "Demo_Calc_Add");
//! assert_eq!(derive_identifier("", "Calc", "Do-It!"), "Global_Calc_Do_It_");
//!
//! let mut assigner = IdentifierAssigner::new(CollisionPolicy::Suffix);
//! assert_eq!(assigner.assign("Demo", "Calc", "Add").unwrap(), "Demo_Calc_Add");
//! assert_eq!(assigner.assign("Demo", "Calc", "Add").unwrap(), "Demo_Calc_Add_2");
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Placeholder used in place of an empty namespace.
pub const GLOBAL_NAMESPACE: &str = "Global";

/// Derives the identifier for a member.
///
/// The namespace (or [`GLOBAL_NAMESPACE`] when empty), type name and member
/// name are joined with `_`, then every character that is not alphanumeric
/// is replaced by `_`. The replacement is one-for-one, so the result has
/// `ns + type + member + 2` characters.
///
/// # Examples
///
/// ```
/// use netbridge_core::derive_identifier;
///
/// assert_eq!(derive_identifier("My.Namespace", "List`1", "Get"), "My_Namespace_List_1_Get");
/// ```
#[must_use]
pub fn derive_identifier(namespace: &str, type_name: &str, member_name: &str) -> String {
    let namespace = if namespace.is_empty() {
        GLOBAL_NAMESPACE
    } else {
        namespace
    };

    format!("{namespace}_{type_name}_{member_name}")
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '_' })
        .collect()
}

/// What to do when two members derive the same identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later duplicates get the smallest free ordinal suffix (`_2`, `_3`, ...).
    #[default]
    Suffix,
    /// Keep duplicates as derived and log a warning.
    Allow,
    /// Fail the run on the first duplicate.
    Reject,
}

impl CollisionPolicy {
    /// Returns the configuration name of the policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Suffix => "suffix",
            Self::Allow => "allow",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "suffix" => Ok(Self::Suffix),
            "allow" => Ok(Self::Allow),
            "reject" => Ok(Self::Reject),
            _ => Err(Error::ConfigError {
                message: format!(
                    "invalid collision policy: '{s}' (expected: suffix, allow, or reject)"
                ),
            }),
        }
    }
}

/// Assigns identifiers to members in discovery order.
///
/// Holds the identifiers handed out so far in one run, keyed to the
/// qualified member name that claimed them.
#[derive(Debug, Clone, Default)]
pub struct IdentifierAssigner {
    policy: CollisionPolicy,
    taken: HashMap<String, String>,
}

impl IdentifierAssigner {
    /// Creates an assigner with the given policy.
    #[must_use]
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            taken: HashMap::new(),
        }
    }

    /// Returns the policy in effect.
    #[must_use]
    pub const fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Derives and records the identifier for the next member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentifierCollision`] when the policy is
    /// [`CollisionPolicy::Reject`] and the identifier is already taken.
    pub fn assign(&mut self, namespace: &str, type_name: &str, member_name: &str) -> Result<String> {
        let derived = derive_identifier(namespace, type_name, member_name);
        let qualified = if namespace.is_empty() {
            format!("{type_name}.{member_name}")
        } else {
            format!("{namespace}.{type_name}.{member_name}")
        };

        let Some(first) = self.taken.get(&derived) else {
            self.taken.insert(derived.clone(), qualified);
            return Ok(derived);
        };

        match self.policy {
            CollisionPolicy::Allow => {
                tracing::warn!(
                    identifier = %derived,
                    first = %first,
                    second = %qualified,
                    "duplicate identifier kept; the generated bridge will not load"
                );
                Ok(derived)
            }
            CollisionPolicy::Reject => Err(Error::IdentifierCollision {
                identifier: derived,
                first: first.clone(),
                second: qualified,
            }),
            CollisionPolicy::Suffix => {
                let mut ordinal = 2u32;
                let unique = loop {
                    let candidate = format!("{derived}_{ordinal}");
                    if !self.taken.contains_key(&candidate) {
                        break candidate;
                    }
                    ordinal += 1;
                };
                tracing::debug!(identifier = %derived, assigned = %unique, "identifier collision resolved");
                self.taken.insert(unique.clone(), qualified);
                Ok(unique)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_scenario() {
        assert_eq!(derive_identifier("Demo", "Calc", "Add"), "Demo_Calc_Add");
    }

    #[test]
    fn test_empty_namespace_uses_placeholder() {
        assert_eq!(derive_identifier("", "Calc", "Add"), "Global_Calc_Add");
    }

    #[test]
    fn test_one_for_one_substitution() {
        assert_eq!(derive_identifier("Demo", "Calc", "Do-It!"), "Demo_Calc_Do_It_");
        assert_eq!(derive_identifier("", "Calc", "Do-It!"), "Global_Calc_Do_It_");
        assert_eq!(derive_identifier("A.B", "C+D", "a  b"), "A_B_C_D_a__b");
    }

    #[test]
    fn test_length_property() {
        let triples = [
            ("", "", ""),
            ("Demo", "Calc", "Add"),
            ("My.Deep.Namespace", "Outer+Inner", "op-$"),
            ("Ünïcode", "Tÿpe", "Mëthod"),
            ("", "List`1", "<Clone>$"),
        ];
        for (ns, ty, member) in triples {
            let ns_len = if ns.is_empty() {
                GLOBAL_NAMESPACE.chars().count()
            } else {
                ns.chars().count()
            };
            let expected = ns_len + ty.chars().count() + member.chars().count() + 2;
            assert_eq!(derive_identifier(ns, ty, member).chars().count(), expected);
        }
    }

    #[test]
    fn test_output_is_alphanumeric_or_underscore() {
        let id = derive_identifier("a.b-c", "d e", "f(g)h");
        assert!(id.chars().all(|c| c.is_alphanumeric() || c == '_'));
    }

    #[test]
    fn test_derive_is_stable() {
        let first = derive_identifier("Demo", "Calc", "Sum'");
        let second = derive_identifier("Demo", "Calc", "Sum'");
        assert_eq!(first, second);
    }

    #[test]
    fn test_suffix_policy() {
        let mut assigner = IdentifierAssigner::new(CollisionPolicy::Suffix);
        assert_eq!(assigner.assign("Demo", "Calc", "Add").unwrap(), "Demo_Calc_Add");
        assert_eq!(assigner.assign("Demo", "Calc", "Add").unwrap(), "Demo_Calc_Add_2");
        assert_eq!(assigner.assign("Demo", "Calc", "Add").unwrap(), "Demo_Calc_Add_3");
    }

    #[test]
    fn test_suffix_skips_taken_ordinals() {
        let mut assigner = IdentifierAssigner::new(CollisionPolicy::Suffix);
        assert_eq!(assigner.assign("Demo", "Calc", "Add_2").unwrap(), "Demo_Calc_Add_2");
        assert_eq!(assigner.assign("Demo", "Calc", "Add").unwrap(), "Demo_Calc_Add");
        assert_eq!(assigner.assign("Demo", "Calc", "Add").unwrap(), "Demo_Calc_Add_3");
    }

    #[test]
    fn test_punctuation_collision_suffixed() {
        let mut assigner = IdentifierAssigner::new(CollisionPolicy::Suffix);
        assert_eq!(assigner.assign("Demo", "Calc", "a-b").unwrap(), "Demo_Calc_a_b");
        assert_eq!(assigner.assign("Demo", "Calc", "a+b").unwrap(), "Demo_Calc_a_b_2");
    }

    #[test]
    fn test_allow_policy_keeps_duplicates() {
        let mut assigner = IdentifierAssigner::new(CollisionPolicy::Allow);
        assert_eq!(assigner.assign("Demo", "Calc", "Add").unwrap(), "Demo_Calc_Add");
        assert_eq!(assigner.assign("Demo", "Calc", "Add").unwrap(), "Demo_Calc_Add");
    }

    #[test]
    fn test_reject_policy_errors() {
        let mut assigner = IdentifierAssigner::new(CollisionPolicy::Reject);
        assigner.assign("Demo", "Calc", "a-b").unwrap();
        let err = assigner.assign("Demo", "Calc", "a.b").unwrap_err();
        match err {
            Error::IdentifierCollision {
                identifier,
                first,
                second,
            } => {
                assert_eq!(identifier, "Demo_Calc_a_b");
                assert_eq!(first, "Demo.Calc.a-b");
                assert_eq!(second, "Demo.Calc.a.b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("suffix".parse::<CollisionPolicy>().unwrap(), CollisionPolicy::Suffix);
        assert_eq!("ALLOW".parse::<CollisionPolicy>().unwrap(), CollisionPolicy::Allow);
        assert_eq!("reject".parse::<CollisionPolicy>().unwrap(), CollisionPolicy::Reject);
        assert!("ordinal".parse::<CollisionPolicy>().unwrap_err().is_config_error());
        assert_eq!(CollisionPolicy::default(), CollisionPolicy::Suffix);
    }
}
