//! Walks a classified schema tree and emits CTO declarations.
//!
//! Messages become `concept` blocks and enums become `enum` blocks. The namespace is
//! only known once the whole tree has been walked, so output is buffered and the
//! `namespace` line is inserted at the top afterwards.

use crate::GenerateError;
use crate::buffer::LineBuffer;
use crate::schema::{Node, NodeKind, SchemaField, SchemaNode, SchemaValue, classify};
use crate::sink::OutputSink;
use crate::types::{accepts_default, cto_type, quotes_default, unqualify};

/// Emits `node` and its descendants into `buffer` and returns the namespace found in
/// this subtree, if any. When several are found the last one visited wins.
pub fn visit(buffer: &mut LineBuffer, node: &Node<'_>, indent: usize) -> Option<String> {
    let mut namespace = match &node.kind {
        NodeKind::Message { name, fields } => {
            emit_concept(buffer, name, fields, indent);
            None
        }
        NodeKind::Enum { name, values } => {
            emit_enum(buffer, name, values, indent);
            None
        }
        NodeKind::Namespace { full_name } => Some(full_name.to_string()),
        NodeKind::Opaque => None,
    };

    for child in &node.children {
        if let Some(child_namespace) = visit(buffer, child, indent) {
            namespace = Some(child_namespace);
        }
    }

    namespace
}

fn emit_concept(buffer: &mut LineBuffer, name: &str, fields: &[SchemaField], indent: usize) {
    buffer.push_line(indent, format!("concept {name}{{"));
    for field in fields {
        buffer.push_line(indent + 1, field_line(field));
    }
    buffer.push_line(indent, "}");
}

fn emit_enum(buffer: &mut LineBuffer, name: &str, values: &[SchemaValue], indent: usize) {
    buffer.push_line(indent, format!("enum {name}{{"));
    for value in values {
        buffer.push_line(indent + 1, format!("o {}", value.name));
    }
    buffer.push_line(indent, "}");
}

/// `o <Type>[[]] <name>[ default=<literal>][ optional]`
pub fn field_line(field: &SchemaField) -> String {
    let ty = cto_type(&field.type_name);
    let mut line = format!("o {ty}");
    if field.repeated {
        line.push_str("[]");
    }
    line.push(' ');
    line.push_str(unqualify(&field.name));

    if !field.repeated
        && let Some(literal) = field.default.as_deref().filter(|d| !d.is_empty())
        && accepts_default(&ty)
    {
        if quotes_default(&ty) {
            line.push_str(&format!(" default=\"{literal}\""));
        } else {
            line.push_str(&format!(" default={literal}"));
        }
    }

    if field.optional {
        line.push_str(" optional");
    }
    line
}

/// `namespace <name>` with the root `.` removed.
pub fn namespace_line(full_name: &str) -> String {
    let name = full_name.strip_prefix('.').unwrap_or(full_name);
    format!("namespace {name}")
}

fn walk(root: &SchemaNode) -> (LineBuffer, Option<String>) {
    let tree = classify(root);
    let mut buffer = LineBuffer::new();
    let namespace = visit(&mut buffer, &tree, 0);
    (buffer, namespace)
}

/// Translates a schema tree into CTO source lines, namespace first when one exists.
pub fn translate(root: &SchemaNode) -> Vec<String> {
    let (mut buffer, namespace) = walk(root);
    if let Some(ns) = namespace {
        buffer.insert_line(0, 0, namespace_line(&ns));
    }
    buffer.lines()
}

/// Translates a schema tree and flushes it to `sink` as the unit `unit`.
pub fn convert<S>(root: &SchemaNode, sink: &mut S, unit: &str) -> Result<(), GenerateError>
where
    S: OutputSink + ?Sized,
{
    let (buffer, namespace) = walk(root);

    sink.open_unit(unit)?;
    for line in buffer.entries() {
        sink.write_line(line.indent, &line.text)?;
    }
    if let Some(ns) = namespace {
        sink.write_before_line(0, &namespace_line(&ns))?;
    }
    sink.close_unit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widgets_tree() -> SchemaNode {
        SchemaNode::default().with_nested(vec![
            SchemaNode::namespace("acme", ".acme").with_nested(vec![
                SchemaNode::namespace("widgets", ".acme.widgets").with_nested(vec![
                    SchemaNode::message(
                        "Widget",
                        vec![
                            SchemaField::new("name", "string"),
                            SchemaField::new("count", "int32").repeated(),
                        ],
                    ),
                ]),
            ]),
        ])
    }

    #[test]
    fn translates_widget_example() {
        assert_eq!(
            translate(&widgets_tree()),
            vec![
                "namespace acme.widgets",
                "concept Widget{",
                "  o String name",
                "  o Integer[] count",
                "}",
            ]
        );
    }

    #[test]
    fn translation_is_deterministic() {
        let tree = widgets_tree();
        assert_eq!(translate(&tree), translate(&tree));
    }

    #[test]
    fn namespace_found_last_is_hoisted_to_first_line() {
        let tree = SchemaNode::default().with_nested(vec![
            SchemaNode::message("A", vec![SchemaField::new("a", "string")]),
            SchemaNode::enumeration("B", [("X", 0)]),
            SchemaNode::default().with_nested(vec![
                SchemaNode::default().with_nested(vec![SchemaNode::namespace("deep", ".deep.ns")]),
            ]),
        ]);
        let lines = translate(&tree);
        assert_eq!(lines[0], "namespace deep.ns");
        assert_eq!(lines[1], "concept A{");
        assert_eq!(lines.iter().filter(|l| l.starts_with("namespace")).count(), 1);
    }

    #[test]
    fn tree_without_namespace_has_no_namespace_line() {
        let tree = SchemaNode::default().with_nested(vec![SchemaNode::message(
            "Ping",
            vec![SchemaField::new("payload", "bytes")],
        )]);
        assert_eq!(
            translate(&tree),
            vec!["concept Ping{", "  o String payload", "}"]
        );
    }

    #[test]
    fn empty_tree_translates_to_nothing() {
        assert!(translate(&SchemaNode::default()).is_empty());
    }

    #[test]
    fn last_sibling_namespace_wins() {
        let tree = SchemaNode::default().with_nested(vec![
            SchemaNode::namespace("first", ".first"),
            SchemaNode::namespace("second", ".second"),
            SchemaNode::default(),
        ]);
        assert_eq!(translate(&tree), vec!["namespace second"]);
    }

    #[test]
    fn nested_namespace_overrides_its_container() {
        let tree = SchemaNode::namespace("acme", ".acme")
            .with_nested(vec![SchemaNode::namespace("inner", ".acme.inner")]);
        let mut buffer = LineBuffer::new();
        let ns = visit(&mut buffer, &classify(&tree), 0);
        assert_eq!(ns.as_deref(), Some(".acme.inner"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn only_one_leading_dot_is_stripped() {
        assert_eq!(namespace_line(".acme.widgets"), "namespace acme.widgets");
        assert_eq!(namespace_line("acme"), "namespace acme");
        assert_eq!(namespace_line("..odd"), "namespace .odd");
    }

    #[test]
    fn string_default_is_quoted() {
        let field = SchemaField::new("greeting", "string").with_default("hello");
        assert_eq!(field_line(&field), "o String greeting default=\"hello\"");
    }

    #[test]
    fn repeated_field_drops_default() {
        let field = SchemaField::new("greeting", "string")
            .with_default("hello")
            .repeated();
        assert_eq!(field_line(&field), "o String[] greeting");
    }

    #[test]
    fn numeric_and_boolean_defaults_are_bare() {
        let retries = SchemaField::new("retries", "int32")
            .with_default("3")
            .optional();
        assert_eq!(field_line(&retries), "o Integer retries default=3 optional");

        let active = SchemaField::new("active", "bool").with_default("false");
        assert_eq!(field_line(&active), "o Boolean active default=false");

        let ratio = SchemaField::new("ratio", "float").with_default("-1.5");
        assert_eq!(field_line(&ratio), "o Double ratio default=-1.5");
    }

    #[test]
    fn default_on_reference_type_is_dropped() {
        let field = SchemaField::new("tier", "Account.Tier").with_default("BASIC");
        assert_eq!(field_line(&field), "o Tier tier");
    }

    #[test]
    fn empty_default_is_dropped() {
        let field = SchemaField::new("label", "string").with_default("");
        assert_eq!(field_line(&field), "o String label");
    }

    #[test]
    fn qualified_names_are_unqualified() {
        let field = SchemaField::new("acme.Order.placed_at", ".google.protobuf.Timestamp");
        assert_eq!(field_line(&field), "o Timestamp placed_at");
    }

    #[test]
    fn enum_emits_names_without_numbers() {
        let tree = SchemaNode::enumeration("Color", [("RED", 0), ("GREEN", 1), ("BLUE", 2)]);
        let lines = translate(&tree);
        assert_eq!(
            lines,
            vec!["enum Color{", "  o RED", "  o GREEN", "  o BLUE", "}"]
        );
        assert!(!lines.iter().any(|l| l.chars().any(|c| c.is_ascii_digit())));
    }

    #[test]
    fn nested_declarations_follow_their_parent_at_the_same_indent() {
        let tree = SchemaNode::message("Order", vec![SchemaField::new("status", "Order.Status")])
            .with_nested(vec![SchemaNode::enumeration("Status", [("NEW", 0)])]);
        assert_eq!(
            translate(&tree),
            vec![
                "concept Order{",
                "  o Status status",
                "}",
                "enum Status{",
                "  o NEW",
                "}",
            ]
        );
    }

    #[test]
    fn indent_applies_to_block_bodies() {
        let tree = SchemaNode::message("A", vec![SchemaField::new("a", "int64")]);
        let mut buffer = LineBuffer::new();
        visit(&mut buffer, &classify(&tree), 2);
        assert_eq!(buffer.lines(), vec!["    concept A{", "      o Long a", "    }"]);
    }

    #[test]
    fn convert_through_sink_matches_translate() {
        let tree = widgets_tree();
        let mut sink = LineBuffer::new();
        convert(&tree, &mut sink, "widgets.cto").unwrap();
        assert_eq!(sink.unit(), Some("widgets.cto"));
        assert_eq!(sink.lines(), translate(&tree));
    }
}
