use gemrbi::{Compiler, CompilerConfig, PackageImage};
use pretty_assertions::assert_eq;

const HEADER: &str = "\
# typed: true

# DO NOT EDIT MANUALLY
# This is an autogenerated file for types exported from the `foo` gem.
# Please instead update this file by running `bin/tapioca gem foo`.
";

fn foo_image(constant: &str) -> PackageImage {
    PackageImage::from_json(&format!(
        r#"{{"name":"foo","version":"0.0.1","constants":{{"Foo":{}}}}}"#,
        constant
    ))
    .unwrap()
}

fn compile(image: &PackageImage, version: &str) -> String {
    Compiler::default()
        .compile_version_str(image, version)
        .unwrap()
        .contents()
}

fn weak_map_image() -> PackageImage {
    foo_image(r#"{"kind":"instance","class":"ObjectSpace::WeakMap"}"#)
}

fn class_union_alias_image() -> PackageImage {
    foo_image(
        r#"{"kind":"type_alias","body":{"kind":"union","types":[
            {"kind":"anything"},
            {"kind":"class_of","name":"String"}
        ]}}"#,
    )
}

fn generic_type_image() -> PackageImage {
    PackageImage::from_json(
        r#"{
            "name": "generic_type",
            "version": "0.0.1",
            "constants": {
                "GenericType": {
                    "kind": "class",
                    "superclass": "Object",
                    "extends": ["T::Sig", "T::Generic"],
                    "type_members": [{ "name": "Elem" }],
                    "constants": { "Elem": { "kind": "opaque" } },
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
    .unwrap()
}

#[test]
fn weak_map_keeps_type_argument_before_cutoff() {
    assert_eq!(
        compile(&weak_map_image(), "0.5.10585"),
        format!(
            "{}\nFoo = T.let(T.unsafe(nil), ObjectSpace::WeakMap[T.untyped])\n",
            HEADER
        )
    );
}

#[test]
fn weak_map_is_bare_after_cutoff() {
    assert_eq!(
        compile(&weak_map_image(), "0.5.10588"),
        format!("{}\nFoo = T.let(T.unsafe(nil), ObjectSpace::WeakMap)\n", HEADER)
    );
}

#[test]
fn class_reference_union_collapses_on_old_versions() {
    assert_eq!(
        compile(&class_union_alias_image(), "0.5.10780"),
        format!("{}\nFoo = T.type_alias {{ T.untyped }}\n", HEADER)
    );
}

#[test]
fn class_reference_union_degrades_before_qualified_names() {
    assert_eq!(
        compile(&class_union_alias_image(), "0.5.10800"),
        format!("{}\nFoo = T.type_alias {{ T.any(T.anything, T.untyped) }}\n", HEADER)
    );
}

#[test]
fn class_reference_union_is_qualified_on_new_versions() {
    assert_eq!(
        compile(&class_union_alias_image(), "0.5.10860"),
        format!(
            "{}\nFoo = T.type_alias {{ T.any(T.anything, T::Class[::String]) }}\n",
            HEADER
        )
    );
}

#[test]
fn generic_class_output_is_identical_across_versions() {
    let expected = "\
# typed: true

# DO NOT EDIT MANUALLY
# This is an autogenerated file for types exported from the `generic_type` gem.
# Please instead update this file by running `bin/tapioca gem generic_type`.

class GenericType
  extend T::Generic

  Elem = type_member

  sig { params(foo: Elem).void }
  def foo(foo); end
end
";
    let image = generic_type_image();
    assert_eq!(compile(&image, "0.5.10539"), expected);
    assert_eq!(compile(&image, "0.5.10554"), expected);
    assert_eq!(compile(&image, "0.5.11000"), expected);
}

#[test]
fn compiling_twice_gives_identical_output() {
    let compiler = Compiler::default();
    let image = generic_type_image();
    let first = compiler.compile_version_str(&image, "0.5.10800").unwrap();
    let second = compiler.compile_version_str(&image, "0.5.10800").unwrap();
    assert_eq!(first, second);
}

#[test]
fn configured_cutoffs_replace_the_defaults() {
    let config = CompilerConfig::from_toml_str(
        r#"
regen_command = "bundle exec tapioca gem"

[[capabilities]]
capability = "class_type_in_union"
introduced_at = "0.5.10700"
"#,
    )
    .unwrap();
    let file = Compiler::new(config)
        .compile_version_str(&class_union_alias_image(), "0.5.10780")
        .unwrap();
    assert_eq!(
        file.body,
        vec!["Foo = T.type_alias { T.any(T.anything, T.untyped) }".to_string()]
    );
    assert!(file.contents().contains("`bundle exec tapioca gem foo`"));
}

#[test]
fn nested_namespaces_and_class_references() {
    let image = PackageImage::from_json(
        r#"{
            "name": "foo",
            "version": "1.2.0",
            "constants": {
                "Foo": {
                    "kind": "module",
                    "constants": {
                        "VERSION": { "kind": "instance", "class": "String" },
                        "Error": { "kind": "class", "superclass": "StandardError" },
                        "Base": {
                            "kind": "class",
                            "includes": ["Comparable"],
                            "methods": [
                                { "name": "build", "singleton": true, "parameters": [
                                    { "name": "opts", "kind": "keyrest" }
                                ]},
                                { "name": "name", "signature": {
                                    "returns": { "kind": "nilable", "inner": { "kind": "named", "name": "String" } }
                                }}
                            ]
                        }
                    }
                },
                "Legacy": { "kind": "class_reference", "target": "Foo::Base" }
            }
        }"#,
    )
    .unwrap();
    let file = Compiler::default()
        .compile_version_str(&image, "0.5.11000")
        .unwrap();
    let expected_body = "\
module Foo
  VERSION = T.let(T.unsafe(nil), String)

  class Error < StandardError; end

  class Base
    include Comparable

    def self.build(**opts); end

    sig { returns(T.nilable(String)) }
    def name; end
  end
end

Legacy = Foo::Base";
    assert_eq!(file.relative_path(), "foo@1.2.0.rbi");
    assert_eq!(file.contents(), format!("{}\n{}\n", HEADER, expected_body));
}
