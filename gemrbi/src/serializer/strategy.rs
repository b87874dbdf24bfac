//! Union rendering strategies.
//!
//! Each entry pairs the capabilities it requires with the rendering it
//! selects; the first entry whose requirements are met wins. A new cutoff is a
//! new row, not a new branch.

use crate::capabilities::{Capability, CapabilitySet};
use crate::types::TypeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionRendering {
    /// Keep class references and root-qualify their names.
    QualifyClassReferences,
    /// Replace class references with `T.untyped`, keep the union shape.
    DegradeClassReferences,
    /// Replace the whole union with `T.untyped`.
    Collapse,
}

const UNION_STRATEGIES: &[(&[Capability], UnionRendering)] = &[
    (
        &[
            Capability::ClassTypeInUnion,
            Capability::QualifiedClassNameInUnion,
        ],
        UnionRendering::QualifyClassReferences,
    ),
    (
        &[Capability::ClassTypeInUnion],
        UnionRendering::DegradeClassReferences,
    ),
    (&[], UnionRendering::Collapse),
];

pub fn union_strategy(caps: &CapabilitySet) -> UnionRendering {
    UNION_STRATEGIES
        .iter()
        .find(|(required, _)| caps.contains_all(required))
        .map(|(_, rendering)| *rendering)
        .unwrap_or(UnionRendering::Collapse)
}

/// Rewrites a union that contains class references according to `rendering`.
/// The result is normalized again, so it may no longer be a union.
pub fn apply(rendering: UnionRendering, union: &TypeNode) -> TypeNode {
    match rendering {
        UnionRendering::Collapse => TypeNode::Unknown,
        UnionRendering::DegradeClassReferences => {
            map_class_types(union, &|_| TypeNode::Unknown).normalize()
        }
        UnionRendering::QualifyClassReferences => {
            map_class_types(union, &|name| TypeNode::class_type(qualify(name))).normalize()
        }
    }
}

fn map_class_types(node: &TypeNode, f: &dyn Fn(&str) -> TypeNode) -> TypeNode {
    match node {
        TypeNode::ClassType { name } => f(name),
        TypeNode::Union { members } => {
            TypeNode::union(members.iter().map(|m| map_class_types(m, f)).collect())
        }
        TypeNode::Generic { base, arguments } => TypeNode::generic(
            base.clone(),
            arguments.iter().map(|a| map_class_types(a, f)).collect(),
        ),
        TypeNode::Alias { body } => TypeNode::alias(map_class_types(body, f)),
        other => other.clone(),
    }
}

/// Anchors a constant name at the root namespace.
pub fn qualify(name: &str) -> String {
    if name.starts_with("::") {
        name.to_string()
    } else {
        format!("::{}", name)
    }
}
