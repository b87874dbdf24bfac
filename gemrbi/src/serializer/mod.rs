//! Version-Gated Serializer
//!
//! Renders type-model nodes as Sorbet type syntax for one capability set.
//! Rendering is a pure function of the node and the capabilities: the same
//! inputs always produce the same text, whatever order constructs are visited
//! in.
//!
//! | Node                  | Text                                   |
//! |-----------------------|----------------------------------------|
//! | `Simple(n)`           | `n`                                    |
//! | `Generic(b, args)`    | `b[args]`, or `b` when its family is gated off |
//! | `ClassType(n)`        | `T::Class[n]`                          |
//! | `Union(ms)`           | `T.any(ms)` / `T.nilable(..)`, see [`strategy`] |
//! | `Unknown`             | `T.untyped`                            |
//! | `Anything`            | `T.anything`                           |
//! | `Alias(b)`            | `T.type_alias { b }`                   |

pub mod declarations;
pub mod strategy;

use crate::capabilities::{CapabilityRegistry, CapabilitySet};
use crate::error::GemRbiResult;
use crate::types::{TypeNode, NIL_CLASS};
use itertools::Itertools;

pub use declarations::render_construct;
pub use strategy::{union_strategy, UnionRendering};

pub const UNTYPED: &str = "T.untyped";
pub const ANYTHING: &str = "T.anything";

pub struct TypeSerializer<'a> {
    caps: &'a CapabilitySet,
    registry: &'a CapabilityRegistry,
}

impl<'a> TypeSerializer<'a> {
    pub fn new(caps: &'a CapabilitySet, registry: &'a CapabilityRegistry) -> Self {
        Self { caps, registry }
    }

    /// Renders `node` for the construct named `construct`. Fails only when the
    /// node breaks a structural invariant.
    pub fn render(&self, construct: &str, node: &TypeNode) -> GemRbiResult<String> {
        node.validate(construct)?;
        Ok(self.emit(&node.normalize()))
    }

    fn emit(&self, node: &TypeNode) -> String {
        match node {
            TypeNode::Simple { name } => name.clone(),
            TypeNode::Generic { base, arguments } => self.emit_generic(base, arguments),
            TypeNode::ClassType { name } => format!("T::Class[{}]", name),
            TypeNode::Union { members } => self.emit_union(node, members),
            TypeNode::Unknown => UNTYPED.to_string(),
            TypeNode::Anything => ANYTHING.to_string(),
            TypeNode::Alias { body } => format!("T.type_alias {{ {} }}", self.emit(body)),
        }
    }

    fn emit_generic(&self, base: &str, arguments: &[TypeNode]) -> String {
        let gated_off = self
            .registry
            .gating_capability(base)
            .is_some_and(|capability| !self.caps.contains(capability));
        if gated_off {
            return base.to_string();
        }
        format!("{}[{}]", base, arguments.iter().map(|a| self.emit(a)).join(", "))
    }

    fn emit_union(&self, union: &TypeNode, members: &[TypeNode]) -> String {
        if union.contains_class_type() {
            let rewritten = strategy::apply(union_strategy(self.caps), union);
            return match &rewritten {
                TypeNode::Union { members } => self.emit_union_members(members),
                other => self.emit(other),
            };
        }
        self.emit_union_members(members)
    }

    fn emit_union_members(&self, members: &[TypeNode]) -> String {
        let is_nil = |m: &TypeNode| matches!(m, TypeNode::Simple { name } if name == NIL_CLASS);
        if !members.iter().any(is_nil) {
            return format!("T.any({})", members.iter().map(|m| self.emit(m)).join(", "));
        }
        let rest: Vec<&TypeNode> = members.iter().filter(|m| !is_nil(*m)).collect();
        match rest.as_slice() {
            [] => NIL_CLASS.to_string(),
            [single] => format!("T.nilable({})", self.emit(single)),
            many => format!(
                "T.nilable(T.any({}))",
                many.iter().map(|m| self.emit(m)).join(", ")
            ),
        }
    }
}
