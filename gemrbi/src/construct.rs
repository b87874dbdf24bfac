//! Documentable constructs: the walker's output and the serializer's input.

use crate::image::{ParameterKind, Variance};
use crate::types::TypeNode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructKind {
    Constant,
    Class,
    Module,
    Method,
}

/// A declared type member of a generic class or module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    pub variance: Variance,
    pub fixed: Option<TypeNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixinKind {
    Include,
    Extend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mixin {
    pub kind: MixinKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub ty: TypeNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub parameters: Vec<MethodParameter>,
    /// `None` is `void`.
    pub return_type: Option<TypeNode>,
    pub singleton: bool,
    /// False when the method had no runtime contract; no `sig` is emitted.
    pub typed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentableConstruct {
    pub qualified_name: String,
    pub name: String,
    pub kind: ConstructKind,
    /// For constants the value's type (a `ClassType` means the constant is
    /// bound to a class); for classes and modules the namespace itself; for
    /// methods the return type.
    pub ty: TypeNode,
    pub generic_parameters: Vec<TypeParameter>,
    pub method_signature: Option<MethodSignature>,
    pub superclass: Option<String>,
    pub mixins: Vec<Mixin>,
    pub members: Vec<DocumentableConstruct>,
}

impl DocumentableConstruct {
    pub fn constant(
        qualified_name: impl Into<String>,
        name: impl Into<String>,
        ty: TypeNode,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            name: name.into(),
            kind: ConstructKind::Constant,
            ty,
            generic_parameters: Vec::new(),
            method_signature: None,
            superclass: None,
            mixins: Vec::new(),
            members: Vec::new(),
        }
    }

    /// This construct followed by all nested members, depth first.
    pub fn flatten(&self) -> Vec<&DocumentableConstruct> {
        let mut out = vec![self];
        for member in &self.members {
            out.extend(member.flatten());
        }
        out
    }
}
