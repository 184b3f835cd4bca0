mod model;

use pest::Parser as _;
use pest::iterators::Pair;
use pest_derive::Parser;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub use model::*;

#[derive(Parser)]
#[grammar = "resources/proto.pest"] // Path relative to the crate's src directory
pub struct ProtoParser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Pest(Box<pest::error::Error<Rule>>),
    #[error("{0}")]
    Message(&'static str),
    #[error("{what} {value} of {name} is out of range")]
    OutOfRange {
        what: &'static str,
        name: String,
        value: String,
    },
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(e: pest::error::Error<Rule>) -> Self {
        Self::Pest(Box::new(e))
    }
}

// Public API: parse a .proto file into ProtoModel IR
pub fn parse_proto_file<P: AsRef<Path>>(path: P) -> Result<ProtoModel, ParseError> {
    let content = fs::read_to_string(path)?;
    parse_proto_str(&content)
}

/// Parse .proto source text into ProtoModel IR.
pub fn parse_proto_str(content: &str) -> Result<ProtoModel, ParseError> {
    let mut pairs = ProtoParser::parse(Rule::proto, content)?;
    let proto_pair = pairs
        .next()
        .ok_or(ParseError::Message("expected proto root"))?;
    parse_proto(proto_pair)
}

fn parse_proto(pair: Pair<Rule>) -> Result<ProtoModel, ParseError> {
    let mut model = ProtoModel::default();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::syntax_statement => {
                // syntax_statement = { ("syntax" | "edition") ~ "=" ~ string_literal ~ ";" }
                model.syntax = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::string_literal)
                    .map(string_literal_value);
            }
            Rule::proto_body => {
                for b in inner.into_inner() {
                    match b.as_rule() {
                        Rule::package_statement => {
                            // package_statement = { "package" ~ package_name ~ ";" }
                            model.package = b
                                .into_inner()
                                .find(|p| p.as_rule() == Rule::package_name)
                                .and_then(|p| {
                                    p.into_inner().find(|x| x.as_rule() == Rule::full_ident)
                                })
                                .map(|p| p.as_str().to_string());
                        }
                        Rule::import_statement => {
                            if let Some(path) = b
                                .into_inner()
                                .find(|p| p.as_rule() == Rule::string_literal)
                            {
                                model.imports.push(string_literal_value(path));
                            }
                        }
                        Rule::top_level_definition => {
                            for def in b.into_inner() {
                                match def.as_rule() {
                                    Rule::message_block => model
                                        .types
                                        .push(TypeDecl::Message(parse_message_block(def)?)),
                                    Rule::enum_block => {
                                        model.types.push(TypeDecl::Enum(parse_enum_block(def)?))
                                    }
                                    // services and extensions have no place in the model
                                    _ => {}
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    Ok(model)
}

fn parse_message_block(block: Pair<Rule>) -> Result<Message, ParseError> {
    // message_block = { "message" ~ message_name ~ message_body }
    let mut name = String::new();
    let mut body_opt: Option<Pair<Rule>> = None;

    for p in block.into_inner() {
        match p.as_rule() {
            Rule::message_name => name = p.as_str().to_string(),
            Rule::message_body => body_opt = Some(p),
            _ => {}
        }
    }

    parse_message_body(name, body_opt)
}

fn parse_message_body(
    name: String,
    body_opt: Option<Pair<Rule>>,
) -> Result<Message, ParseError> {
    let mut message = Message {
        name,
        ..Message::default()
    };

    let Some(body) = body_opt else {
        return Ok(message);
    };

    for elem in body.into_inner() {
        if elem.as_rule() != Rule::message_element {
            continue;
        }
        for inner in elem.into_inner() {
            match inner.as_rule() {
                Rule::field => {
                    if let Some(field) = parse_field(inner, None)? {
                        message.fields.push(field);
                    }
                }
                Rule::map_field => {
                    if let Some(field) = parse_map_field(inner)? {
                        message.fields.push(field);
                    }
                }
                Rule::group_field => {
                    if let Some((field, group)) = parse_group_field(inner, None)? {
                        message.fields.push(field);
                        message.nested.push(TypeDecl::Message(group));
                    }
                }
                Rule::oneof => {
                    // Flatten oneof members into message fields; a member is never required
                    for oneof_inner in inner.into_inner() {
                        if oneof_inner.as_rule() != Rule::oneof_field {
                            continue;
                        }
                        for f in oneof_inner.into_inner() {
                            match f.as_rule() {
                                Rule::field => {
                                    if let Some(field) =
                                        parse_field(f, Some(FieldLabel::Optional))?
                                    {
                                        message.fields.push(field);
                                    }
                                }
                                Rule::group_field => {
                                    if let Some((field, group)) =
                                        parse_group_field(f, Some(FieldLabel::Optional))?
                                    {
                                        message.fields.push(field);
                                        message.nested.push(TypeDecl::Message(group));
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                }
                Rule::enum_block => message
                    .nested
                    .push(TypeDecl::Enum(parse_enum_block(inner)?)),
                Rule::message_block => message
                    .nested
                    .push(TypeDecl::Message(parse_message_block(inner)?)),
                _ => {}
            }
        }
    }

    Ok(message)
}

fn parse_enum_block(block: Pair<Rule>) -> Result<Enum, ParseError> {
    // enum_block = { "enum" ~ enum_name ~ "{" ~ enum_body* ~ "}" ~ ";"? }
    let mut en = Enum::default();

    for p in block.into_inner() {
        match p.as_rule() {
            Rule::enum_name => {
                en.name = p.as_str().to_string();
            }
            Rule::enum_body => {
                for eb in p.into_inner() {
                    if eb.as_rule() == Rule::enum_field {
                        let mut val_name: Option<String> = None;
                        let mut number_text: Option<&str> = None;
                        for ef in eb.into_inner() {
                            match ef.as_rule() {
                                Rule::enum_field_name => val_name = Some(ef.as_str().to_string()),
                                Rule::enum_field_value => number_text = Some(ef.as_str()),
                                _ => {}
                            }
                        }
                        if let (Some(vn), Some(text)) = (val_name, number_text) {
                            let number = parse_integer_value(text)
                                .and_then(|n| i32::try_from(n).ok())
                                .ok_or_else(|| out_of_range("enum value", &vn, text))?;
                            en.values.push(EnumValue { name: vn, number });
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(en)
}

fn parse_field(
    pair: Pair<Rule>,
    label_override: Option<FieldLabel>,
) -> Result<Option<Field>, ParseError> {
    // field = { field_modifier? ~ type_reference ~ field_name ~ "=" ~ tag ~ field_options? ~ ";" }
    let mut ty_opt: Option<FieldType> = None;
    let mut name_opt: Option<String> = None;
    let mut tag_opt: Option<&str> = None;
    let mut label = FieldLabel::Singular;
    let mut default = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::field_modifier => label = parse_field_label(p.as_str()),
            Rule::type_reference => ty_opt = Some(parse_type_reference(p)),
            Rule::field_name => name_opt = Some(p.as_str().to_string()),
            Rule::tag => tag_opt = Some(p.as_str()),
            Rule::field_options => default = parse_default_option(p),
            _ => {}
        }
    }

    let (Some(ty), Some(name), Some(tag)) = (ty_opt, name_opt, tag_opt) else {
        return Ok(None);
    };
    let order = parse_tag(&name, tag)?;
    Ok(Some(Field {
        ty,
        name,
        order,
        label: label_override.unwrap_or(label),
        default,
    }))
}

fn parse_map_field(pair: Pair<Rule>) -> Result<Option<Field>, ParseError> {
    // map_field = { "map" ~ "<" ~ map_key_type ~ "," ~ type_reference ~ ">" ~ field_name ~ "=" ~ tag ... }
    // The key type is dropped; the field takes the value type.
    let mut ty_opt: Option<FieldType> = None;
    let mut name_opt: Option<String> = None;
    let mut tag_opt: Option<&str> = None;
    let mut default = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::type_reference => ty_opt = Some(parse_type_reference(p)),
            Rule::field_name => name_opt = Some(p.as_str().to_string()),
            Rule::tag => tag_opt = Some(p.as_str()),
            Rule::field_options => default = parse_default_option(p),
            _ => {}
        }
    }

    let (Some(ty), Some(name), Some(tag)) = (ty_opt, name_opt, tag_opt) else {
        return Ok(None);
    };
    let order = parse_tag(&name, tag)?;
    Ok(Some(Field {
        ty,
        name,
        order,
        label: FieldLabel::Singular,
        default,
    }))
}

// A group declares a nested message and a field of that type named after it in lower case.
fn parse_group_field(
    pair: Pair<Rule>,
    label_override: Option<FieldLabel>,
) -> Result<Option<(Field, Message)>, ParseError> {
    let mut label = FieldLabel::Singular;
    let mut name_opt: Option<String> = None;
    let mut tag_opt: Option<&str> = None;
    let mut body_opt: Option<Pair<Rule>> = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::field_modifier => label = parse_field_label(p.as_str()),
            Rule::message_name => name_opt = Some(p.as_str().to_string()),
            Rule::tag => tag_opt = Some(p.as_str()),
            Rule::message_body => body_opt = Some(p),
            _ => {}
        }
    }

    let (Some(name), Some(tag)) = (name_opt, tag_opt) else {
        return Ok(None);
    };
    let order = parse_tag(&name, tag)?;
    let field = Field {
        ty: FieldType::Custom(name.clone()),
        name: name.to_lowercase(),
        order,
        label: label_override.unwrap_or(label),
        default: None,
    };
    let group = parse_message_body(name, body_opt)?;
    Ok(Some((field, group)))
}

fn parse_field_label(s: &str) -> FieldLabel {
    match s {
        "optional" => FieldLabel::Optional,
        "required" => FieldLabel::Required,
        "repeated" => FieldLabel::Repeated,
        _ => FieldLabel::Singular,
    }
}

fn parse_default_option(pair: Pair<Rule>) -> Option<String> {
    // field_options = { "[" ~ field_option ~ ("," ~ field_option)* ~ "]" }
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::field_option)
        .find_map(|opt| {
            let mut inner = opt.into_inner();
            let name = inner.next()?;
            if name.as_str() != "default" {
                return None;
            }
            inner.next().map(constant_value)
        })
}

fn constant_value(pair: Pair<Rule>) -> String {
    // constant = { string_literal | float_lit | integer_value | full_ident | aggregate_value }
    match pair.clone().into_inner().next() {
        Some(lit) if lit.as_rule() == Rule::string_literal => string_literal_value(lit),
        _ => pair.as_str().trim().to_string(),
    }
}

fn string_literal_value(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|content| content.as_str().to_string())
        .unwrap_or_default()
}

fn parse_type_reference(pair: Pair<Rule>) -> FieldType {
    // type_reference = ${ scalar_type | "."? ~ full_ident }
    // If it's a scalar, inner will include a scalar_type; otherwise, we can use the full string slice.
    let mut inners = pair.clone().into_inner();
    if let Some(first) = inners.next()
        && first.as_rule() == Rule::scalar_type
        && let Some(scalar) = ScalarType::parse(first.as_str())
    {
        return FieldType::Scalar(scalar);
    }
    let mut s = pair.as_str().to_string();
    if s.starts_with('.') {
        s.remove(0);
    }
    FieldType::Custom(s)
}

fn parse_tag(field: &str, s: &str) -> Result<u32, ParseError> {
    parse_integer_value(s)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| out_of_range("field tag", field, s))
}

fn out_of_range(what: &'static str, name: &str, value: &str) -> ParseError {
    ParseError::OutOfRange {
        what,
        name: name.to_string(),
        value: value.to_string(),
    }
}

// None when the literal does not fit an i128.
fn parse_integer_value(s: &str) -> Option<i128> {
    // integer_value = dec|hex|oct with optional sign
    let (neg, rest) = if let Some(stripped) = s.strip_prefix('-') {
        (true, stripped)
    } else {
        (false, s.strip_prefix('+').unwrap_or(s))
    };
    let val: i128 = if rest.starts_with("0x") || rest.starts_with("0X") {
        i128::from_str_radix(&rest[2..], 16).ok()?
    } else if rest.starts_with('0') && rest.len() > 1 {
        // Octal per grammar
        i128::from_str_radix(&rest[1..], 8).ok()?
    } else {
        rest.parse::<i128>().ok()?
    };
    Some(if neg { -val } else { val })
}
