//! Symbol Walker
//!
//! Traverses the namespace graph of a package image and classifies every
//! runtime value it finds into the closed [`TypeNode`] set. Classification
//! happens exactly once, here; nothing downstream looks at raw runtime values.
//!
//! The walker always extracts the fullest type it can see. Adapting that type
//! to an older type checker is the serializer's job.

use crate::construct::{
    ConstructKind, DocumentableConstruct, MethodParameter, MethodSignature, Mixin, MixinKind,
    TypeParameter,
};
use crate::image::{MethodInfo, NamespaceObject, PackageImage, RuntimeType, RuntimeValue};
use crate::types::TypeNode;
use tracing::debug;

const SIG_MODULE: &str = "T::Sig";
const GENERIC_MODULE: &str = "T::Generic";

/// Type-member names visible while walking one class or module body.
#[derive(Debug, Default)]
struct TypeScope<'a> {
    names: Vec<&'a str>,
}

impl<'a> TypeScope<'a> {
    fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }
}

#[derive(Debug, Clone)]
pub struct SymbolWalker {
    weak_collection_templates: Vec<String>,
}

impl Default for SymbolWalker {
    fn default() -> Self {
        Self::new(vec!["ObjectSpace::WeakMap".to_string()])
    }
}

impl SymbolWalker {
    pub fn new(weak_collection_templates: Vec<String>) -> Self {
        Self {
            weak_collection_templates,
        }
    }

    pub fn templates(&self) -> &[String] {
        &self.weak_collection_templates
    }

    /// Discovers every documentable construct in `image`, in namespace order.
    pub fn discover(&self, image: &PackageImage) -> Vec<DocumentableConstruct> {
        let scope = TypeScope::default();
        image
            .constants
            .iter()
            .map(|(name, value)| self.classify_constant(None, name, value, &scope))
            .collect()
    }

    fn classify_constant(
        &self,
        owner: Option<&str>,
        name: &str,
        value: &RuntimeValue,
        scope: &TypeScope<'_>,
    ) -> DocumentableConstruct {
        let qualified = match owner {
            Some(owner) => format!("{}::{}", owner, name),
            None => name.to_string(),
        };

        let construct = match value {
            RuntimeValue::Class(namespace) => {
                self.discover_namespace(qualified, name, ConstructKind::Class, namespace)
            }
            RuntimeValue::Module(namespace) => {
                self.discover_namespace(qualified, name, ConstructKind::Module, namespace)
            }
            RuntimeValue::Instance {
                class,
                generic_arity,
            } => {
                let ty = self.classify_instance(&qualified, class, *generic_arity);
                DocumentableConstruct::constant(qualified, name, ty)
            }
            RuntimeValue::TypeAlias { body } => {
                let ty = TypeNode::alias(classify_type(&qualified, body, scope));
                DocumentableConstruct::constant(qualified, name, ty)
            }
            RuntimeValue::ClassReference { target } if !target.is_empty() => {
                DocumentableConstruct::constant(qualified, name, TypeNode::class_type(target))
            }
            RuntimeValue::ClassReference { .. } | RuntimeValue::Opaque { .. } => {
                debug!(
                    construct = %qualified,
                    "could not determine constant type, using T.untyped"
                );
                DocumentableConstruct::constant(qualified, name, TypeNode::Unknown)
            }
        };

        debug!(
            construct = %construct.qualified_name,
            kind = ?construct.kind,
            ty = %construct.ty.describe(),
            "discovered construct"
        );
        construct
    }

    fn classify_instance(&self, qualified: &str, class: &str, generic_arity: usize) -> TypeNode {
        if class.is_empty() {
            debug!(construct = %qualified, "instance without a class name, using T.untyped");
            return TypeNode::Unknown;
        }
        if self.weak_collection_templates.iter().any(|t| t == class) {
            return TypeNode::generic(class, vec![TypeNode::Unknown]);
        }
        match generic_arity {
            0 => TypeNode::simple(class),
            n => TypeNode::generic(class, vec![TypeNode::Unknown; n]),
        }
    }

    fn discover_namespace(
        &self,
        qualified: String,
        name: &str,
        kind: ConstructKind,
        namespace: &NamespaceObject,
    ) -> DocumentableConstruct {
        let scope = TypeScope {
            names: namespace
                .type_members
                .iter()
                .map(|member| member.name.as_str())
                .collect(),
        };

        let generic_parameters: Vec<TypeParameter> = namespace
            .type_members
            .iter()
            .map(|member| TypeParameter {
                name: member.name.clone(),
                variance: member.variance,
                fixed: member
                    .fixed
                    .as_ref()
                    .map(|fixed| classify_type(&qualified, fixed, &scope)),
            })
            .collect();

        let mut mixins: Vec<Mixin> = namespace
            .includes
            .iter()
            .map(|module| (MixinKind::Include, module))
            .chain(namespace.extends.iter().map(|module| (MixinKind::Extend, module)))
            .filter(|(_, module)| module.as_str() != SIG_MODULE)
            .map(|(kind, module)| Mixin {
                kind,
                name: module.clone(),
            })
            .collect();
        if !generic_parameters.is_empty()
            && !mixins
                .iter()
                .any(|m| m.kind == MixinKind::Extend && m.name == GENERIC_MODULE)
        {
            mixins.push(Mixin {
                kind: MixinKind::Extend,
                name: GENERIC_MODULE.to_string(),
            });
        }

        let mut members: Vec<DocumentableConstruct> = namespace
            .constants
            .iter()
            // type members are constants too; they are declared separately
            .filter(|(constant, _)| !scope.contains(constant))
            .map(|(constant, value)| {
                self.classify_constant(Some(qualified.as_str()), constant, value, &scope)
            })
            .collect();
        members.extend(
            namespace
                .methods
                .iter()
                .map(|method| discover_method(&qualified, method, &scope)),
        );

        let superclass = namespace
            .superclass
            .as_ref()
            .filter(|superclass| kind == ConstructKind::Class && superclass.as_str() != "Object")
            .cloned();

        DocumentableConstruct {
            ty: TypeNode::simple(qualified.clone()),
            qualified_name: qualified,
            name: name.to_string(),
            kind,
            generic_parameters,
            method_signature: None,
            superclass,
            mixins,
            members,
        }
    }
}

fn discover_method(
    owner: &str,
    method: &MethodInfo,
    scope: &TypeScope<'_>,
) -> DocumentableConstruct {
    let separator = if method.singleton { "." } else { "#" };
    let qualified = format!("{}{}{}", owner, separator, method.name);

    let signature = match &method.signature {
        Some(sig) => {
            let parameters = method
                .parameters
                .iter()
                .map(|param| {
                    let ty = match sig.params.get(&param.name) {
                        Some(runtime) => classify_type(&qualified, runtime, scope),
                        None => {
                            debug!(
                                construct = %qualified,
                                param = %param.name,
                                "parameter missing from signature"
                            );
                            TypeNode::Unknown
                        }
                    };
                    MethodParameter {
                        name: param.name.clone(),
                        kind: param.kind,
                        ty,
                    }
                })
                .collect();
            MethodSignature {
                parameters,
                return_type: sig
                    .returns
                    .as_ref()
                    .map(|returns| classify_type(&qualified, returns, scope)),
                singleton: method.singleton,
                typed: true,
            }
        }
        None => MethodSignature {
            parameters: method
                .parameters
                .iter()
                .map(|param| MethodParameter {
                    name: param.name.clone(),
                    kind: param.kind,
                    ty: TypeNode::Unknown,
                })
                .collect(),
            return_type: Some(TypeNode::Unknown),
            singleton: method.singleton,
            typed: false,
        },
    };

    DocumentableConstruct {
        ty: signature.return_type.clone().unwrap_or(TypeNode::Unknown),
        qualified_name: qualified,
        name: method.name.clone(),
        kind: ConstructKind::Method,
        generic_parameters: Vec::new(),
        method_signature: Some(signature),
        superclass: None,
        mixins: Vec::new(),
        members: Vec::new(),
    }
}

/// Maps a runtime type object onto the type model. Never fails: anything the
/// model cannot express becomes `Unknown`.
fn classify_type(construct: &str, runtime: &RuntimeType, scope: &TypeScope<'_>) -> TypeNode {
    match runtime {
        RuntimeType::Named { name } if !name.is_empty() => TypeNode::simple(name),
        RuntimeType::TypeParameter { name } if scope.contains(name) => TypeNode::simple(name),
        RuntimeType::TypeParameter { name } => {
            debug!(construct, type_parameter = %name, "type parameter not in scope");
            TypeNode::Unknown
        }
        RuntimeType::Untyped => TypeNode::Unknown,
        RuntimeType::Anything => TypeNode::Anything,
        RuntimeType::Union { types } => {
            let mut members: Vec<TypeNode> = types
                .iter()
                .map(|t| classify_type(construct, t, scope))
                .collect();
            match members.len() {
                0 => TypeNode::Unknown,
                1 => members.remove(0),
                _ => TypeNode::union(members),
            }
        }
        RuntimeType::Nilable { inner } => TypeNode::nilable(classify_type(construct, inner, scope)),
        RuntimeType::Generic { name, arguments } if arguments.is_empty() => TypeNode::simple(name),
        RuntimeType::Generic { name, arguments } => TypeNode::generic(
            name,
            arguments
                .iter()
                .map(|arg| classify_type(construct, arg, scope))
                .collect(),
        ),
        RuntimeType::ClassOf { name } if !name.is_empty() => TypeNode::class_type(name),
        RuntimeType::Named { .. } | RuntimeType::ClassOf { .. } | RuntimeType::Opaque { .. } => {
            debug!(construct, "unclassifiable runtime type, using T.untyped");
            TypeNode::Unknown
        }
    }
}
