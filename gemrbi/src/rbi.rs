//! RBI tree and printer.
//!
//! Layout rules: two-space indentation per scope; groups inside a scope are
//! separated by one blank line; inside a group, two nodes are separated by a
//! blank line unless both print on a single line. Empty scopes print as
//! `class Foo; end`.

use crate::construct::MixinKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Class,
    Module,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scope {
        kind: ScopeKind,
        name: String,
        superclass: Option<String>,
        groups: Vec<Vec<Node>>,
    },
    Const {
        name: String,
        value: String,
    },
    TypeMember {
        name: String,
        declaration: String,
    },
    Mixin {
        kind: MixinKind,
        name: String,
    },
    Method {
        name: String,
        singleton: bool,
        parameters: Vec<String>,
        sig: Option<String>,
    },
}

const INDENT: &str = "  ";

#[derive(Debug, Default)]
pub struct RbiPrinter;

impl RbiPrinter {
    fn indent(&self, depth: usize) -> String {
        INDENT.repeat(depth)
    }

    /// Prints `node` at `depth` without a trailing newline.
    pub fn print(&self, node: &Node, depth: usize) -> String {
        let pad = self.indent(depth);
        match node {
            Node::Const { name, value } => format!("{}{} = {}", pad, name, value),
            Node::TypeMember { name, declaration } => format!("{}{} = {}", pad, name, declaration),
            Node::Mixin { kind, name } => {
                let keyword = match kind {
                    MixinKind::Include => "include",
                    MixinKind::Extend => "extend",
                };
                format!("{}{} {}", pad, keyword, name)
            }
            Node::Method {
                name,
                singleton,
                parameters,
                sig,
            } => {
                let receiver = if *singleton { "self." } else { "" };
                let params = if parameters.is_empty() {
                    String::new()
                } else {
                    format!("({})", parameters.join(", "))
                };
                let def = format!("{}def {}{}{}; end", pad, receiver, name, params);
                match sig {
                    Some(sig) => format!("{}{}\n{}", pad, sig, def),
                    None => def,
                }
            }
            Node::Scope {
                kind,
                name,
                superclass,
                groups,
            } => {
                let keyword = match kind {
                    ScopeKind::Class => "class",
                    ScopeKind::Module => "module",
                };
                let mut header = format!("{}{} {}", pad, keyword, name);
                if let Some(superclass) = superclass {
                    header.push_str(" < ");
                    header.push_str(superclass);
                }
                let body: Vec<String> = groups
                    .iter()
                    .filter(|group| !group.is_empty())
                    .map(|group| self.print_group(group, depth + 1))
                    .collect();
                if body.is_empty() {
                    return format!("{}; end", header);
                }
                format!("{}\n{}\n{}end", header, body.join("\n\n"), pad)
            }
        }
    }

    /// Prints the nodes of one group at `depth`.
    pub fn print_group(&self, nodes: &[Node], depth: usize) -> String {
        let fragments: Vec<String> = nodes.iter().map(|node| self.print(node, depth)).collect();
        join_fragments(&fragments)
    }
}

/// Joins printed nodes: single-line neighbours share a block, anything else is
/// separated by a blank line.
pub fn join_fragments(fragments: &[String]) -> String {
    let mut out = String::new();
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            let previous = &fragments[i - 1];
            out.push('\n');
            if previous.contains('\n') || fragment.contains('\n') {
                out.push('\n');
            }
        }
        out.push_str(fragment);
    }
    out
}
