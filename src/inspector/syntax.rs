//! Small helpers over tree-sitter TypeScript nodes.

use crate::annotation_args::{last_segment, strip_quotes};
use crate::declarations::{Annotation, MemberDecl, TypeShape};
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Source text covered by a node
pub fn node_text<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

/// Collapses every whitespace run to a single space
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Collects descendants of `root` whose kind is one of `kinds`, in source order
pub fn collect_nodes<'t>(root: Node<'t>, kinds: &[&str], out: &mut Vec<Node<'t>>) {
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            out.push(child);
        }
        collect_nodes(child, kinds, out);
    }
}

/// Named child of `node` with the given kind
pub fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

/// Whether any direct child (named or anonymous) has the given kind
pub fn has_child_kind(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

/// Decorators that are direct children of `node`
pub fn decorators_of(node: Node, src: &[u8]) -> Vec<Annotation> {
    let mut cursor = node.walk();
    let decorators: Vec<Node> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "decorator")
        .collect();
    decorators
        .into_iter()
        .map(|d| annotation_from_decorator(d, src))
        .collect()
}

/// Lowers a `decorator` node into an [`Annotation`].
///
/// `@Name`, `@ns.Name` and `@Name(args)` are all accepted; the name keeps only its last
/// dotted segment.
pub fn annotation_from_decorator(decorator: Node, src: &[u8]) -> Annotation {
    let mut cursor = decorator.walk();
    let expression = decorator
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");

    let Some(expression) = expression else {
        return Annotation::new(String::new(), Vec::new());
    };

    if expression.kind() != "call_expression" {
        let name = last_segment(node_text(expression, src)).to_string();
        return Annotation::new(name, Vec::new());
    }

    let name = expression
        .child_by_field_name("function")
        .map(|f| last_segment(node_text(f, src)).to_string())
        .unwrap_or_default();

    let arguments = expression
        .child_by_field_name("arguments")
        .map(|args| {
            let mut cursor = args.walk();
            let texts: Vec<String> = args
                .named_children(&mut cursor)
                .filter(|c| c.kind() != "comment")
                .map(|c| node_text(c, src).trim().to_string())
                .collect();
            texts
        })
        .unwrap_or_default();

    Annotation::new(name, arguments)
}

/// A class body member together with the decorators and doc block placed before it.
pub struct ClassMember<'t> {
    pub node: Node<'t>,
    pub annotations: Vec<Annotation>,
    pub doc_comment: Option<String>,
}

/// Walks a `class_body`, attaching preceding decorators and `/** */` blocks to methods and fields.
///
/// The TypeScript grammar places method decorators as siblings before the
/// `method_definition`, while field decorators sit inside the field node; both end up in
/// the member's annotation list.
pub fn class_members<'t>(body: Node<'t>, src: &[u8]) -> Vec<ClassMember<'t>> {
    let mut members = Vec::new();
    let mut pending_annotations = Vec::new();
    let mut pending_doc: Option<String> = None;

    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        match child.kind() {
            "decorator" => pending_annotations.push(annotation_from_decorator(child, src)),
            "comment" => {
                let text = node_text(child, src);
                if text.starts_with("/**") {
                    pending_doc = Some(text.to_string());
                }
            }
            "method_definition" | "public_field_definition" => {
                let mut annotations = std::mem::take(&mut pending_annotations);
                annotations.extend(decorators_of(child, src));
                members.push(ClassMember {
                    node: child,
                    annotations,
                    doc_comment: pending_doc.take(),
                });
            }
            _ => {
                pending_annotations.clear();
                pending_doc = None;
            }
        }
    }

    members
}

/// Unwraps a `type_annotation` (`: T`) to the type node it carries
pub fn type_annotation_inner(node: Node) -> Option<Node> {
    if node.kind() != "type_annotation" {
        return Some(node);
    }
    let mut cursor = node.walk();
    let inner = node
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    inner
}

/// Builds a member from a `property_signature` or `public_field_definition`
pub fn member_from_node(node: Node, annotations: Vec<Annotation>, src: &[u8]) -> Option<MemberDecl> {
    let name = strip_quotes(node_text(node.child_by_field_name("name")?, src).trim());
    if name.is_empty() {
        return None;
    }

    let type_text = node
        .child_by_field_name("type")
        .and_then(type_annotation_inner)
        .map(|t| normalize_whitespace(node_text(t, src)))
        .unwrap_or_else(|| "any".to_string());

    Some(MemberDecl {
        name,
        type_text,
        optional: has_child_kind(node, "?"),
        annotations,
    })
}

/// Members of an `object_type` / `interface_body` node
pub fn object_type_shape(node: Node, src: &[u8]) -> TypeShape {
    let mut cursor = node.walk();
    let members = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "property_signature")
        .filter_map(|c| member_from_node(c, Vec::new(), src))
        .collect();
    TypeShape { members }
}

/// Data members of a class body; methods and static fields are skipped
pub fn class_field_shape(body: Node, src: &[u8]) -> TypeShape {
    let members = class_members(body, src)
        .into_iter()
        .filter(|m| m.node.kind() == "public_field_definition" && !has_child_kind(m.node, "static"))
        .filter_map(|m| member_from_node(m.node, m.annotations, src))
        .collect();
    TypeShape { members }
}

/// Strips comment markers from a `/** ... */` block
pub fn strip_doc_comment(raw: &str) -> String {
    let body = raw
        .trim()
        .trim_start_matches("/**")
        .trim_start_matches("/*")
        .trim_end_matches("*/");

    body.lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').unwrap_or(line).trim()
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
