// IR for .proto files.
// - Top-level has syntax, package, imports and a list of types (message or enum only).
// - Messages own their fields and their nested type declarations, in source order.
// - Field type is either a scalar or a custom type reference as written.
// - Services and extensions are not represented.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoModel {
    pub syntax: Option<String>,
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDecl {
    Message(Message),
    Enum(Enum),
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Message(m) => &m.name,
            TypeDecl::Enum(e) => &e.name,
        }
    }
}

// ---------------- Message & Fields ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
    pub nested: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub ty: FieldType,
    pub name: String,
    pub order: u32, // tag number
    pub label: FieldLabel,
    /// Value of the `default` field option. String literals are stored unquoted.
    pub default: Option<String>,
}

impl Field {
    pub fn is_repeated(&self) -> bool {
        self.label == FieldLabel::Repeated
    }

    /// Anything not `required` or `repeated` may be absent, including proto3 fields
    /// written without a label.
    pub fn is_optional(&self) -> bool {
        matches!(self.label, FieldLabel::Singular | FieldLabel::Optional)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldLabel {
    /// No label (proto3 implicit presence, map fields).
    #[default]
    Singular,
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Custom(String), // type reference as written, possibly dotted
}

impl FieldType {
    /// The type token as it appears in the source file.
    pub fn token(&self) -> &str {
        match self {
            FieldType::Scalar(s) => s.as_str(),
            FieldType::Custom(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub fn parse(s: &str) -> Option<Self> {
        let st = match s {
            "double" => ScalarType::Double,
            "float" => ScalarType::Float,
            "int32" => ScalarType::Int32,
            "int64" => ScalarType::Int64,
            "uint32" => ScalarType::Uint32,
            "uint64" => ScalarType::Uint64,
            "sint32" => ScalarType::Sint32,
            "sint64" => ScalarType::Sint64,
            "fixed32" => ScalarType::Fixed32,
            "fixed64" => ScalarType::Fixed64,
            "sfixed32" => ScalarType::Sfixed32,
            "sfixed64" => ScalarType::Sfixed64,
            "bool" => ScalarType::Bool,
            "string" => ScalarType::String,
            "bytes" => ScalarType::Bytes,
            _ => return None,
        };
        Some(st)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }
}

// ---------------- Enum ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enum {
    pub name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}
