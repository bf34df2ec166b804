use serde::{Deserialize, Serialize};

/// Sort direction, normalized to `1` / `-1` in produced documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

impl From<i32> for Order {
    fn from(n: i32) -> Self {
        if n < 0 { Self::Desc } else { Self::Asc }
    }
}

impl From<&str> for Order {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") { Self::Asc } else { Self::Desc }
    }
}

/// Argument accepted by `is_type`: a raw BSON type code, or a canonical type
/// name translated through [`type_code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArg {
    Code(i32),
    Name(String),
}

impl From<i32> for TypeArg {
    fn from(code: i32) -> Self {
        Self::Code(code)
    }
}

impl From<&str> for TypeArg {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for TypeArg {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Translates a canonical BSON type name to its wire code. Callers lowercase
/// the name first.
#[must_use]
pub fn type_code(name: &str) -> Option<i32> {
    Some(match name {
        "double" => 1,
        "string" => 2,
        "object" => 3,
        "array" => 4,
        "binary" => 5,
        "undefined" => 6,
        "objectid" => 7,
        "boolean" => 8,
        "date" => 9,
        "null" => 10,
        "regex" => 11,
        "jscode" => 13,
        "symbol" => 14,
        "jscodewithscope" => 15,
        "integer32" => 16,
        "timestamp" => 17,
        "integer64" => 18,
        "maxkey" => 127,
        "minkey" => 255,
        _ => return None,
    })
}
