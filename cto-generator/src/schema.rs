//! Schema node tree handed to the translator, and its classification.
//!
//! A [`SchemaNode`] mirrors a protobuf reflection object: which optional parts are
//! populated decides what the node is. [`classify`] settles that once per node so the
//! walker can match on a [`NodeKind`].

use parser::{Field, ProtoModel, TypeDecl};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaNode {
    pub name: String,
    /// Dotted name rooted with a leading `.`, e.g. `.acme.widgets`.
    pub full_name: Option<String>,
    pub fields: Vec<SchemaField>,
    /// Enum values in declaration order. `Some` even when empty.
    pub values: Option<Vec<SchemaValue>>,
    pub nested: Vec<SchemaNode>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaField {
    pub name: String,
    /// Scalar keyword or possibly dotted type reference.
    pub type_name: String,
    pub repeated: bool,
    pub optional: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaValue {
    pub name: String,
    pub number: i32,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    fn from_field(field: &Field) -> Self {
        Self {
            name: field.name.clone(),
            type_name: field.ty.token().to_string(),
            repeated: field.is_repeated(),
            optional: field.is_optional(),
            default: field.default.clone(),
        }
    }
}

impl SchemaNode {
    pub fn namespace(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: Some(full_name.into()),
            ..Self::default()
        }
    }

    pub fn message(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            name: name.into(),
            fields,
            ..Self::default()
        }
    }

    pub fn enumeration<N: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = (N, i32)>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|(name, number)| SchemaValue {
                name: name.into(),
                number,
            })
            .collect();
        Self {
            name: name.into(),
            values: Some(values),
            ..Self::default()
        }
    }

    pub fn with_nested(mut self, nested: Vec<SchemaNode>) -> Self {
        self.nested = nested;
        self
    }

    /// Builds the node tree for a parsed file: an anonymous root, one namespace node
    /// per package segment, then the file's declarations under the innermost one.
    pub fn from_model(model: &ProtoModel) -> Self {
        let mut children: Vec<SchemaNode> =
            model.types.iter().map(Self::from_type_decl).collect();

        if let Some(package) = model.package.as_deref().filter(|p| !p.is_empty()) {
            let segments: Vec<&str> = package.split('.').collect();
            for depth in (1..=segments.len()).rev() {
                let full_name = format!(".{}", segments[..depth].join("."));
                let namespace = SchemaNode::namespace(segments[depth - 1], full_name);
                children = vec![namespace.with_nested(children)];
            }
        }

        SchemaNode::default().with_nested(children)
    }

    fn from_type_decl(decl: &TypeDecl) -> Self {
        match decl {
            TypeDecl::Message(m) => SchemaNode::message(
                m.name.clone(),
                m.fields.iter().map(SchemaField::from_field).collect(),
            )
            .with_nested(m.nested.iter().map(Self::from_type_decl).collect()),
            TypeDecl::Enum(e) => SchemaNode::enumeration(
                e.name.clone(),
                e.values.iter().map(|v| (v.name.clone(), v.number)),
            ),
        }
    }

    /// Classifies this node alone, checking fields, then values, then the full name.
    pub fn kind(&self) -> NodeKind<'_> {
        if !self.fields.is_empty() {
            NodeKind::Message {
                name: &self.name,
                fields: &self.fields,
            }
        } else if let Some(values) = &self.values {
            NodeKind::Enum {
                name: &self.name,
                values,
            }
        } else if let Some(full_name) = &self.full_name {
            NodeKind::Namespace { full_name }
        } else {
            NodeKind::Opaque
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<'a> {
    Message {
        name: &'a str,
        fields: &'a [SchemaField],
    },
    Enum {
        name: &'a str,
        values: &'a [SchemaValue],
    },
    Namespace {
        full_name: &'a str,
    },
    Opaque,
}

/// A classified node together with its classified children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    pub kind: NodeKind<'a>,
    pub children: Vec<Node<'a>>,
}

pub fn classify(node: &SchemaNode) -> Node<'_> {
    Node {
        kind: node.kind(),
        children: node.nested.iter().map(classify).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::parse_proto_str;

    #[test]
    fn fields_take_priority_over_values_and_full_name() {
        let mut node = SchemaNode::message("Widget", vec![SchemaField::new("id", "int32")]);
        node.values = Some(Vec::new());
        node.full_name = Some(".acme.Widget".into());
        assert!(matches!(node.kind(), NodeKind::Message { name: "Widget", .. }));
    }

    #[test]
    fn values_take_priority_over_full_name() {
        let mut node = SchemaNode::enumeration("Color", [("RED", 0)]);
        node.full_name = Some(".acme.Color".into());
        assert!(matches!(node.kind(), NodeKind::Enum { name: "Color", .. }));
    }

    #[test]
    fn empty_values_still_classify_as_enum() {
        let node = SchemaNode::enumeration("Empty", Vec::<(String, i32)>::new());
        assert!(matches!(node.kind(), NodeKind::Enum { values: [], .. }));
    }

    #[test]
    fn message_without_fields_is_opaque() {
        let node = SchemaNode::message("Empty", Vec::new());
        assert_eq!(node.kind(), NodeKind::Opaque);
    }

    #[test]
    fn full_name_alone_is_namespace() {
        let node = SchemaNode::namespace("widgets", ".acme.widgets");
        assert_eq!(
            node.kind(),
            NodeKind::Namespace {
                full_name: ".acme.widgets"
            }
        );
    }

    #[test]
    fn classify_keeps_children_in_order() {
        let root = SchemaNode::default().with_nested(vec![
            SchemaNode::enumeration("A", [("X", 0)]),
            SchemaNode::default(),
            SchemaNode::namespace("b", ".b"),
        ]);
        let tree = classify(&root);
        assert_eq!(tree.kind, NodeKind::Opaque);
        assert_eq!(tree.children.len(), 3);
        assert!(matches!(tree.children[0].kind, NodeKind::Enum { name: "A", .. }));
        assert_eq!(tree.children[1].kind, NodeKind::Opaque);
        assert!(matches!(tree.children[2].kind, NodeKind::Namespace { .. }));
    }

    #[test]
    fn from_model_nests_package_segments() {
        let model = parse_proto_str(
            r#"
            syntax = "proto2";
            package acme.widgets;
            message Widget {
                required string name = 1;
                repeated int32 count = 2;
                optional string label = 3 [default = "none"];
                enum Kind { SMALL = 0; }
            }
        "#,
        )
        .expect("parse failed");

        let root = SchemaNode::from_model(&model);
        assert_eq!(root.full_name, None);
        assert_eq!(root.nested.len(), 1);

        let acme = &root.nested[0];
        assert_eq!(acme.name, "acme");
        assert_eq!(acme.full_name.as_deref(), Some(".acme"));

        let widgets = &acme.nested[0];
        assert_eq!(widgets.full_name.as_deref(), Some(".acme.widgets"));

        let widget = &widgets.nested[0];
        assert_eq!(widget.full_name, None);
        assert_eq!(
            widget.fields,
            vec![
                SchemaField::new("name", "string"),
                SchemaField::new("count", "int32").repeated(),
                SchemaField::new("label", "string")
                    .optional()
                    .with_default("none"),
            ]
        );
        assert_eq!(widget.nested.len(), 1);
        assert_eq!(
            widget.nested[0].values,
            Some(vec![SchemaValue {
                name: "SMALL".into(),
                number: 0
            }])
        );
    }

    #[test]
    fn from_model_without_package_has_no_namespace_nodes() {
        let model = parse_proto_str("message Ping { string payload = 1; }").expect("parse failed");
        let root = SchemaNode::from_model(&model);
        assert_eq!(root.nested.len(), 1);
        assert_eq!(root.nested[0].name, "Ping");
        assert!(root.nested[0].full_name.is_none());
    }
}
