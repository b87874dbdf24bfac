//! Construct rendering: turns a discovered construct into an RBI node, with
//! every type inside it rendered for the serializer's capability set.

use super::TypeSerializer;
use crate::construct::{
    ConstructKind, DocumentableConstruct, MethodParameter, MethodSignature, TypeParameter,
};
use crate::error::{GemRbiError, GemRbiResult};
use crate::image::{ParameterKind, Variance};
use crate::rbi::{Node, ScopeKind};
use crate::types::TypeNode;
use itertools::Itertools;

pub fn render_construct(
    serializer: &TypeSerializer<'_>,
    construct: &DocumentableConstruct,
) -> GemRbiResult<Node> {
    match construct.kind {
        ConstructKind::Constant => render_constant(serializer, construct),
        ConstructKind::Class => render_scope(serializer, construct, ScopeKind::Class),
        ConstructKind::Module => render_scope(serializer, construct, ScopeKind::Module),
        ConstructKind::Method => {
            let signature = construct.method_signature.as_ref().ok_or_else(|| {
                GemRbiError::assembly(&construct.qualified_name, "method without a signature")
            })?;
            render_method(serializer, construct, signature)
        }
    }
}

fn render_constant(
    serializer: &TypeSerializer<'_>,
    construct: &DocumentableConstruct,
) -> GemRbiResult<Node> {
    let value = match &construct.ty {
        // a constant bound to a class is written as a plain reference
        TypeNode::ClassType { name } => name.clone(),
        TypeNode::Alias { .. } => serializer.render(&construct.qualified_name, &construct.ty)?,
        ty => format!(
            "T.let(T.unsafe(nil), {})",
            serializer.render(&construct.qualified_name, ty)?
        ),
    };
    Ok(Node::Const {
        name: construct.name.clone(),
        value,
    })
}

fn render_scope(
    serializer: &TypeSerializer<'_>,
    construct: &DocumentableConstruct,
    kind: ScopeKind,
) -> GemRbiResult<Node> {
    let mixins = construct
        .mixins
        .iter()
        .map(|mixin| Node::Mixin {
            kind: mixin.kind,
            name: mixin.name.clone(),
        })
        .collect();

    let type_members = construct
        .generic_parameters
        .iter()
        .map(|param| render_type_member(serializer, construct, param))
        .collect::<GemRbiResult<Vec<_>>>()?;

    let mut constants = Vec::new();
    let mut methods = Vec::new();
    let mut scopes = Vec::new();
    for member in &construct.members {
        let node = render_construct(serializer, member)?;
        match member.kind {
            ConstructKind::Constant => constants.push(node),
            ConstructKind::Method => methods.push(node),
            ConstructKind::Class | ConstructKind::Module => scopes.push(node),
        }
    }

    Ok(Node::Scope {
        kind,
        name: construct.name.clone(),
        superclass: construct.superclass.clone(),
        groups: vec![mixins, type_members, constants, methods, scopes],
    })
}

fn render_type_member(
    serializer: &TypeSerializer<'_>,
    owner: &DocumentableConstruct,
    param: &TypeParameter,
) -> GemRbiResult<Node> {
    let mut declaration = match param.variance {
        Variance::Invariant => "type_member".to_string(),
        Variance::Out => "type_member(:out)".to_string(),
        Variance::In => "type_member(:in)".to_string(),
    };
    if let Some(fixed) = &param.fixed {
        let context = format!("{}::{}", owner.qualified_name, param.name);
        declaration.push_str(&format!(
            " {{ {{ fixed: {} }} }}",
            serializer.render(&context, fixed)?
        ));
    }
    Ok(Node::TypeMember {
        name: param.name.clone(),
        declaration,
    })
}

fn render_method(
    serializer: &TypeSerializer<'_>,
    construct: &DocumentableConstruct,
    signature: &MethodSignature,
) -> GemRbiResult<Node> {
    let parameters = signature
        .parameters
        .iter()
        .map(parameter_declaration)
        .collect();

    let sig = if signature.typed {
        Some(render_sig(serializer, construct, signature)?)
    } else {
        None
    };

    Ok(Node::Method {
        name: construct.name.clone(),
        singleton: signature.singleton,
        parameters,
        sig,
    })
}

fn render_sig(
    serializer: &TypeSerializer<'_>,
    construct: &DocumentableConstruct,
    signature: &MethodSignature,
) -> GemRbiResult<String> {
    let returns = match &signature.return_type {
        Some(ty) => format!("returns({})", serializer.render(&construct.qualified_name, ty)?),
        None => "void".to_string(),
    };
    if signature.parameters.is_empty() {
        return Ok(format!("sig {{ {} }}", returns));
    }
    let params: Vec<String> = signature
        .parameters
        .iter()
        .map(|param| {
            serializer
                .render(&construct.qualified_name, &param.ty)
                .map(|ty| format!("{}: {}", param.name, ty))
        })
        .try_collect()?;
    Ok(format!("sig {{ params({}).{} }}", params.join(", "), returns))
}

fn parameter_declaration(param: &MethodParameter) -> String {
    let name = &param.name;
    match param.kind {
        ParameterKind::Req => name.clone(),
        ParameterKind::Opt => format!("{} = T.unsafe(nil)", name),
        ParameterKind::Rest => format!("*{}", name),
        ParameterKind::Keyreq => format!("{}:", name),
        ParameterKind::Key => format!("{}: T.unsafe(nil)", name),
        ParameterKind::Keyrest => format!("**{}", name),
        ParameterKind::Block => format!("&{}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{CapabilityRegistry, CapabilitySet};
    use crate::rbi::RbiPrinter;
    use pretty_assertions::assert_eq;

    fn print(construct: &DocumentableConstruct) -> String {
        let caps = CapabilitySet::all();
        let registry = CapabilityRegistry::default();
        let serializer = TypeSerializer::new(&caps, &registry);
        let node = render_construct(&serializer, construct).unwrap();
        RbiPrinter::default().print(&node, 0)
    }

    fn method(name: &str, signature: MethodSignature) -> DocumentableConstruct {
        DocumentableConstruct {
            qualified_name: format!("Foo#{}", name),
            name: name.to_string(),
            kind: ConstructKind::Method,
            ty: signature.return_type.clone().unwrap_or(TypeNode::Unknown),
            generic_parameters: vec![],
            method_signature: Some(signature),
            superclass: None,
            mixins: vec![],
            members: vec![],
        }
    }

    fn param(name: &str, kind: ParameterKind, ty: TypeNode) -> MethodParameter {
        MethodParameter {
            name: name.to_string(),
            kind,
            ty,
        }
    }

    #[test]
    fn test_constant_forms() {
        assert_eq!(
            print(&DocumentableConstruct::constant(
                "VERSION",
                "VERSION",
                TypeNode::simple("String")
            )),
            "VERSION = T.let(T.unsafe(nil), String)"
        );
        assert_eq!(
            print(&DocumentableConstruct::constant(
                "Alias",
                "Alias",
                TypeNode::class_type("Foo::Bar")
            )),
            "Alias = Foo::Bar"
        );
        assert_eq!(
            print(&DocumentableConstruct::constant(
                "Id",
                "Id",
                TypeNode::alias(TypeNode::simple("Integer"))
            )),
            "Id = T.type_alias { Integer }"
        );
    }

    #[test]
    fn test_method_with_every_parameter_kind() {
        let signature = MethodSignature {
            parameters: vec![
                param("a", ParameterKind::Req, TypeNode::simple("Integer")),
                param("b", ParameterKind::Opt, TypeNode::simple("String")),
                param("c", ParameterKind::Rest, TypeNode::Unknown),
                param("d", ParameterKind::Keyreq, TypeNode::simple("Symbol")),
                param("e", ParameterKind::Key, TypeNode::Anything),
                param("f", ParameterKind::Keyrest, TypeNode::Unknown),
                param("g", ParameterKind::Block, TypeNode::Unknown),
            ],
            return_type: Some(TypeNode::simple("Integer")),
            singleton: true,
            typed: true,
        };
        assert_eq!(
            print(&method("run", signature)),
            "sig { params(a: Integer, b: String, c: T.untyped, d: Symbol, e: T.anything, f: T.untyped, g: T.untyped).returns(Integer) }\n\
             def self.run(a, b = T.unsafe(nil), *c, d:, e: T.unsafe(nil), **f, &g); end"
        );
    }

    #[test]
    fn test_untyped_method_has_no_sig() {
        let signature = MethodSignature {
            parameters: vec![param("x", ParameterKind::Req, TypeNode::Unknown)],
            return_type: Some(TypeNode::Unknown),
            singleton: false,
            typed: false,
        };
        assert_eq!(print(&method("bar", signature)), "def bar(x); end");
    }

    #[test]
    fn test_void_method_without_parameters() {
        let signature = MethodSignature {
            parameters: vec![],
            return_type: None,
            singleton: false,
            typed: true,
        };
        assert_eq!(print(&method("reset", signature)), "sig { void }\ndef reset; end");
    }

    #[test]
    fn test_type_member_variance_and_fixed() {
        let mut class = DocumentableConstruct::constant("Box", "Box", TypeNode::simple("Box"));
        class.kind = ConstructKind::Class;
        class.generic_parameters = vec![
            TypeParameter {
                name: "Out".to_string(),
                variance: Variance::Out,
                fixed: None,
            },
            TypeParameter {
                name: "Key".to_string(),
                variance: Variance::Invariant,
                fixed: Some(TypeNode::simple("Symbol")),
            },
        ];
        assert_eq!(
            print(&class),
            "class Box\n  Out = type_member(:out)\n  Key = type_member { { fixed: Symbol } }\nend"
        );
    }
}
