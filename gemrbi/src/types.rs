//! Type Model
//!
//! The closed set of type shapes the walker can extract and the serializer can
//! render. Nodes are immutable values; every transformation returns a new node.

use crate::error::{GemRbiError, GemRbiResult};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNode {
    /// A named type, rendered verbatim (`Integer`, `Elem`).
    Simple { name: String },
    /// A generic instantiation (`T::Array[Integer]`).
    Generic { base: String, arguments: Vec<TypeNode> },
    /// The class object of a named class (`T::Class[String]`).
    ClassType { name: String },
    /// Member order is kept for output; equivalence ignores it.
    Union { members: Vec<TypeNode> },
    /// Inference failure or an explicitly untyped value.
    Unknown,
    /// The top type.
    Anything,
    Alias { body: Box<TypeNode> },
}

impl TypeNode {
    pub fn simple(name: impl Into<String>) -> Self {
        TypeNode::Simple { name: name.into() }
    }

    pub fn generic(base: impl Into<String>, arguments: Vec<TypeNode>) -> Self {
        TypeNode::Generic {
            base: base.into(),
            arguments,
        }
    }

    pub fn class_type(name: impl Into<String>) -> Self {
        TypeNode::ClassType { name: name.into() }
    }

    pub fn union(members: Vec<TypeNode>) -> Self {
        TypeNode::Union { members }
    }

    pub fn alias(body: TypeNode) -> Self {
        TypeNode::Alias {
            body: Box::new(body),
        }
    }

    pub fn nilable(inner: TypeNode) -> Self {
        TypeNode::union(vec![inner, TypeNode::simple(NIL_CLASS)])
    }

    /// Whether a `ClassType` appears anywhere inside this node.
    pub fn contains_class_type(&self) -> bool {
        match self {
            TypeNode::ClassType { .. } => true,
            TypeNode::Generic { arguments, .. } => arguments.iter().any(Self::contains_class_type),
            TypeNode::Union { members } => members.iter().any(Self::contains_class_type),
            TypeNode::Alias { body } => body.contains_class_type(),
            TypeNode::Simple { .. } | TypeNode::Unknown | TypeNode::Anything => false,
        }
    }

    /// Structural equivalence. Unions compare as sets of members; every other
    /// variant is order-sensitive.
    pub fn equivalent(&self, other: &TypeNode) -> bool {
        match (self, other) {
            (TypeNode::Union { members: a }, TypeNode::Union { members: b }) => {
                a.iter().all(|x| b.iter().any(|y| x.equivalent(y)))
                    && b.iter().all(|y| a.iter().any(|x| x.equivalent(y)))
            }
            (
                TypeNode::Generic {
                    base: base_a,
                    arguments: args_a,
                },
                TypeNode::Generic {
                    base: base_b,
                    arguments: args_b,
                },
            ) => {
                base_a == base_b
                    && args_a.len() == args_b.len()
                    && args_a.iter().zip(args_b).all(|(x, y)| x.equivalent(y))
            }
            (TypeNode::Alias { body: a }, TypeNode::Alias { body: b }) => a.equivalent(b),
            (a, b) => a == b,
        }
    }

    /// Flattens nested unions, drops duplicate members (keeping the first
    /// occurrence) and collapses a single-member union to that member.
    pub fn normalize(&self) -> TypeNode {
        match self {
            TypeNode::Union { members } => {
                let mut flat: Vec<TypeNode> = Vec::with_capacity(members.len());
                for member in members.iter().map(Self::normalize) {
                    match member {
                        TypeNode::Union { members: inner } => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                let mut unique: Vec<TypeNode> = Vec::with_capacity(flat.len());
                for member in flat {
                    if !unique.iter().any(|seen| seen.equivalent(&member)) {
                        unique.push(member);
                    }
                }
                if unique.len() == 1 {
                    unique.remove(0)
                } else {
                    TypeNode::Union { members: unique }
                }
            }
            TypeNode::Generic { base, arguments } => TypeNode::Generic {
                base: base.clone(),
                arguments: arguments.iter().map(Self::normalize).collect(),
            },
            TypeNode::Alias { body } => TypeNode::alias(body.normalize()),
            other => other.clone(),
        }
    }

    /// Checks the structural invariants the serializer relies on.
    pub fn validate(&self, construct: &str) -> GemRbiResult<()> {
        match self {
            TypeNode::Generic { base, arguments } => {
                if arguments.is_empty() {
                    return Err(GemRbiError::assembly(
                        construct,
                        format!("generic type {base} has no type arguments"),
                    ));
                }
                arguments.iter().try_for_each(|arg| arg.validate(construct))
            }
            TypeNode::Union { members } => {
                if members.is_empty() {
                    return Err(GemRbiError::assembly(construct, "union has no members"));
                }
                members.iter().try_for_each(|m| m.validate(construct))
            }
            TypeNode::Alias { body } => body.validate(construct),
            TypeNode::Simple { name } | TypeNode::ClassType { name } if name.is_empty() => Err(
                GemRbiError::assembly(construct, "type reference has an empty name"),
            ),
            _ => Ok(()),
        }
    }

    /// Short human-readable form for log lines.
    pub fn describe(&self) -> String {
        match self {
            TypeNode::Simple { name } => name.clone(),
            TypeNode::Generic { base, arguments } => {
                format!("{}<{}>", base, arguments.iter().map(Self::describe).join(", "))
            }
            TypeNode::ClassType { name } => format!("class<{}>", name),
            TypeNode::Union { members } => members.iter().map(Self::describe).join(" | "),
            TypeNode::Unknown => "unknown".to_string(),
            TypeNode::Anything => "anything".to_string(),
            TypeNode::Alias { body } => format!("alias<{}>", body.describe()),
        }
    }
}

pub const NIL_CLASS: &str = "NilClass";
