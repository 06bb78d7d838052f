use serde_json::Value;

vocabulary! {
    /// Value type of a setting, declared through `type` or inferred.
    pub enum ValueType {
        /// `true` / `false`.
        Bool => "bool",
        /// Whole number.
        Int => "int",
        /// Number with an optional fractional part.
        Float => "float",
        /// Free-form text.
        String => "string",
        /// One of the setting's allowed values.
        Enum => "enum",
        /// File system path.
        Path => "path",
        /// `#rgb`, `#rrggbb` or `#aarrggbb` color literal.
        Color => "color",
        /// Sequence of scalars.
        List => "list",
    }
}

impl ValueType {
    /// Resolve a `type` option, accepting the common aliases of each name.
    pub fn from_name(name: &str) -> Option<Self> {
        let alias = match name.trim().to_ascii_lowercase().as_str() {
            "boolean" => Some(ValueType::Bool),
            "integer" => Some(ValueType::Int),
            "number" => Some(ValueType::Float),
            "str" | "text" => Some(ValueType::String),
            "array" => Some(ValueType::List),
            _ => None,
        };
        alias.or_else(|| Self::parse(name))
    }

    /// Whether `value` has the shape this type stores.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueType::Bool => value.is_boolean(),
            ValueType::Int => value.is_i64() || value.is_u64(),
            ValueType::Float => value.is_number(),
            ValueType::String | ValueType::Path => value.is_string(),
            ValueType::Enum => is_scalar(value),
            ValueType::Color => value.as_str().is_some_and(is_color_literal),
            ValueType::List => value.as_array().is_some_and(|a| a.iter().all(is_scalar)),
        }
    }

    /// Whether min/max bounds are meaningful for this type.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }
}

/// Non-null value that is neither a list nor a mapping.
pub fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// Accepts `#rgb`, `#rrggbb` and `#aarrggbb`.
pub fn is_color_literal(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Truthiness used when a non-boolean setting drives a group.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Short description of a value for diagnostics, e.g. `string "abc"`.
pub fn describe(value: &Value) -> String {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    };
    format!("{kind} {value}")
}
