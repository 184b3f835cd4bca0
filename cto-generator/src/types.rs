//! Protobuf scalar type names to CTO type names.

/// CTO types that may carry a `default=` clause.
pub const DEFAULTABLE_TYPES: [&str; 6] =
    ["String", "DateTime", "Integer", "Double", "Long", "Boolean"];

/// Maps a protobuf scalar keyword to its CTO type. Returns `None` for anything else,
/// which is a reference to a user-defined message or enum.
pub fn map_scalar_type(source_type: &str) -> Option<&'static str> {
    let target = match source_type {
        "string" | "bytes" => "String",
        "double" | "float" => "Double",
        "int32" | "uint32" | "sint32" | "fixed32" | "sfixed32" => "Integer",
        "int64" | "uint64" | "sint64" | "fixed64" | "sfixed64" => "Long",
        "bool" => "Boolean",
        _ => return None,
    };
    Some(target)
}

/// Discards everything up to and including the last `.`.
pub fn unqualify(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, last)| last)
}

/// CTO type for a field's type token: the mapped scalar, or the unqualified reference.
pub fn cto_type(type_token: &str) -> String {
    match map_scalar_type(type_token) {
        Some(scalar) => scalar.to_string(),
        None => unqualify(type_token).to_string(),
    }
}

pub fn accepts_default(cto_type: &str) -> bool {
    DEFAULTABLE_TYPES.contains(&cto_type)
}

pub fn quotes_default(cto_type: &str) -> bool {
    matches!(cto_type, "String" | "DateTime")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_scalar_keyword() {
        let expected = [
            ("string", "String"),
            ("bytes", "String"),
            ("double", "Double"),
            ("float", "Double"),
            ("int32", "Integer"),
            ("uint32", "Integer"),
            ("sint32", "Integer"),
            ("fixed32", "Integer"),
            ("sfixed32", "Integer"),
            ("int64", "Long"),
            ("uint64", "Long"),
            ("sint64", "Long"),
            ("fixed64", "Long"),
            ("sfixed64", "Long"),
            ("bool", "Boolean"),
        ];
        for (proto, cto) in expected {
            assert_eq!(map_scalar_type(proto), Some(cto), "mapping for {proto}");
            assert_eq!(cto_type(proto), cto);
        }
    }

    #[test]
    fn unknown_tokens_pass_through_unqualified() {
        assert_eq!(map_scalar_type("Address"), None);
        assert_eq!(map_scalar_type("String"), None);
        assert_eq!(cto_type("Address"), "Address");
        assert_eq!(cto_type("google.protobuf.Timestamp"), "Timestamp");
        assert_eq!(cto_type(".acme.Order.Status"), "Status");
    }

    #[test]
    fn unqualify_strips_to_last_segment() {
        assert_eq!(unqualify("a.b.c"), "c");
        assert_eq!(unqualify("c"), "c");
        assert_eq!(unqualify(".c"), "c");
        assert_eq!(unqualify("a."), "");
        assert_eq!(unqualify(""), "");
        for s in ["a.b.c", "c", ".x", "a..b", "trailing.", ""] {
            assert_eq!(unqualify(unqualify(s)), unqualify(s));
        }
    }

    #[test]
    fn default_support() {
        for ty in DEFAULTABLE_TYPES {
            assert!(accepts_default(ty));
        }
        assert!(!accepts_default("Address"));
        assert!(quotes_default("String"));
        assert!(quotes_default("DateTime"));
        assert!(!quotes_default("Integer"));
    }
}
