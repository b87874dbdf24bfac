//! Package images.
//!
//! A package image is the reflection snapshot of one loaded package, produced
//! by an external loader and handed over as JSON. Namespace maps are
//! `IndexMap`s so the walker sees constants in the order the loader recorded
//! them.

use crate::error::GemRbiResult;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageImage {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub constants: IndexMap<String, RuntimeValue>,
}

impl PackageImage {
    pub fn from_json(json: &str) -> GemRbiResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> GemRbiResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// The runtime value bound to a constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuntimeValue {
    Class(NamespaceObject),
    Module(NamespaceObject),
    /// An ordinary object; `generic_arity` is the number of type parameters
    /// its class declares.
    Instance {
        class: String,
        #[serde(default)]
        generic_arity: usize,
    },
    TypeAlias { body: RuntimeType },
    /// A constant bound to a class or module defined under another name.
    ClassReference { target: String },
    /// Anything the loader could not describe.
    Opaque {
        #[serde(default)]
        description: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceObject {
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub type_members: Vec<TypeMemberInfo>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub constants: IndexMap<String, RuntimeValue>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMemberInfo {
    pub name: String,
    #[serde(default)]
    pub variance: Variance,
    #[serde(default)]
    pub fixed: Option<RuntimeType>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    #[default]
    Invariant,
    Out,
    In,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub singleton: bool,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    /// The runtime contract attached to the method, if any.
    #[serde(default)]
    pub signature: Option<SignatureInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    pub kind: ParameterKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Req,
    Opt,
    Rest,
    Keyreq,
    Key,
    Keyrest,
    Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureInfo {
    #[serde(default)]
    pub params: IndexMap<String, RuntimeType>,
    /// `None` means the method is declared `void`.
    #[serde(default)]
    pub returns: Option<RuntimeType>,
}

/// A runtime type object as reported by reflection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuntimeType {
    Named {
        name: String,
    },
    TypeParameter {
        name: String,
    },
    Untyped,
    Anything,
    Union {
        types: Vec<RuntimeType>,
    },
    Nilable {
        inner: Box<RuntimeType>,
    },
    Generic {
        name: String,
        #[serde(default)]
        arguments: Vec<RuntimeType>,
    },
    ClassOf {
        name: String,
    },
    Opaque {
        #[serde(default)]
        description: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generic_class_image() {
        let image = PackageImage::from_json(
            r#"{
                "name": "generic_type",
                "version": "0.0.1",
                "constants": {
                    "GenericType": {
                        "kind": "class",
                        "extends": ["T::Sig", "T::Generic"],
                        "type_members": [{ "name": "Elem" }],
                        "methods": [{
                            "name": "foo",
                            "parameters": [{ "name": "foo", "kind": "req" }],
                            "signature": {
                                "params": { "foo": { "kind": "type_parameter", "name": "Elem" } }
                            }
                        }]
                    }
                }
            }"#,
        )
        .unwrap();

        let RuntimeValue::Class(class) = &image.constants["GenericType"] else {
            panic!("expected a class");
        };
        assert_eq!(class.type_members[0].variance, Variance::Invariant);
        let signature = class.methods[0].signature.as_ref().unwrap();
        assert_eq!(signature.returns, None);
        assert_eq!(
            signature.params["foo"],
            RuntimeType::TypeParameter {
                name: "Elem".to_string()
            }
        );
    }

    #[test]
    fn test_constants_keep_document_order() {
        let image = PackageImage::from_json(
            r#"{
                "name": "foo", "version": "1.0.0",
                "constants": {
                    "Zeta": { "kind": "instance", "class": "Integer" },
                    "Alpha": { "kind": "instance", "class": "String" }
                }
            }"#,
        )
        .unwrap();
        let names: Vec<&str> = image.constants.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_rejects_unknown_value_kind() {
        let result = PackageImage::from_json(
            r#"{ "name": "foo", "version": "1", "constants": { "X": { "kind": "lambda" } } }"#,
        );
        assert!(result.is_err());
    }
}
