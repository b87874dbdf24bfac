//! Capability Registry
//!
//! Maps versions of the downstream type checker to the serialization features
//! it understands. The registry is plain data: rules come from configuration,
//! are never mutated after construction, and can be shared freely across
//! worker threads.

use crate::version::VersionIdentifier;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A named behavior of the downstream type checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Weak-reference collections are generic (`ObjectSpace::WeakMap[T.untyped]`).
    GenericWeakCollections,
    /// `T::Class[...]` and `T.anything` may appear inside `T.any(...)`.
    ClassTypeInUnion,
    /// Class references inside unions may be root-qualified (`T::Class[::String]`).
    QualifiedClassNameInUnion,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::GenericWeakCollections,
        Capability::ClassTypeInUnion,
        Capability::QualifiedClassNameInUnion,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::GenericWeakCollections => "generic_weak_collections",
            Capability::ClassTypeInUnion => "class_type_in_union",
            Capability::QualifiedClassNameInUnion => "qualified_class_name_in_union",
        };
        f.write_str(name)
    }
}

/// A capability holds from `introduced_at` (inclusive) until `revoked_at`
/// (exclusive), if set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRule {
    pub capability: Capability,
    pub introduced_at: VersionIdentifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<VersionIdentifier>,
}

impl CapabilityRule {
    pub fn introduced(capability: Capability, introduced_at: VersionIdentifier) -> Self {
        Self {
            capability,
            introduced_at,
            revoked_at: None,
        }
    }

    pub fn revoked_at(mut self, version: VersionIdentifier) -> Self {
        self.revoked_at = Some(version);
        self
    }

    pub fn holds_at(&self, version: &VersionIdentifier) -> bool {
        if *version < self.introduced_at {
            return false;
        }
        match &self.revoked_at {
            Some(revoked) => version < revoked,
            None => true,
        }
    }
}

/// The capabilities available for one version. Iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn contains_all(&self, required: &[Capability]) -> bool {
        required.iter().all(|c| self.contains(*c))
    }

    pub fn is_subset(&self, other: &CapabilitySet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Version-to-capability table plus the generic families whose rendering a
/// capability governs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRegistry {
    rules: Vec<CapabilityRule>,
    gated_generics: IndexMap<String, Capability>,
}

impl CapabilityRegistry {
    pub fn new(rules: Vec<CapabilityRule>, gated_generics: IndexMap<String, Capability>) -> Self {
        Self {
            rules,
            gated_generics,
        }
    }

    /// Every capability with at least one rule holding at `version`.
    pub fn capabilities_for(&self, version: &VersionIdentifier) -> CapabilitySet {
        self.rules
            .iter()
            .filter(|rule| rule.holds_at(version))
            .map(|rule| rule.capability)
            .collect()
    }

    /// The capability that decides whether `base` renders with its type
    /// arguments, if any.
    pub fn gating_capability(&self, base: &str) -> Option<Capability> {
        self.gated_generics.get(base).copied()
    }

    /// True when no rule is ever revoked, i.e. `capabilities_for` can only
    /// grow as the version increases.
    pub fn is_monotonic(&self) -> bool {
        self.rules.iter().all(|rule| rule.revoked_at.is_none())
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new(default_rules(), default_gated_generics())
    }
}

/// Cutoffs observed in the downstream type checker's releases.
///
/// `ObjectSpace::WeakMap` stopped being generic in 0.5.10587; `T.anything`
/// and `T::Class` inside unions arrived in 0.5.10782, and qualified class
/// names inside `T::Class` in 0.5.10820.
pub fn default_rules() -> Vec<CapabilityRule> {
    vec![
        CapabilityRule::introduced(Capability::GenericWeakCollections, known_version("0.0.0"))
            .revoked_at(known_version("0.5.10587")),
        CapabilityRule::introduced(Capability::ClassTypeInUnion, known_version("0.5.10782")),
        CapabilityRule::introduced(
            Capability::QualifiedClassNameInUnion,
            known_version("0.5.10820"),
        ),
    ]
}

pub fn default_gated_generics() -> IndexMap<String, Capability> {
    let mut gated = IndexMap::new();
    gated.insert(
        "ObjectSpace::WeakMap".to_string(),
        Capability::GenericWeakCollections,
    );
    gated
}

fn known_version(text: &str) -> VersionIdentifier {
    match VersionIdentifier::parse(text) {
        Ok(version) => version,
        Err(_) => unreachable!("built-in cutoff {text} is a valid version"),
    }
}
