/// A field default value, as it appears after the `=` in an IDL field
/// declaration.
///
/// Only the shapes that have a direct IDL literal are representable. Non-empty
/// object and array defaults are rejected by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Null,
    /// Escape-safe string contents, without the surrounding quotes.
    Str(String),
    /// A numeric literal, kept exactly as it was written in the source.
    Num(String),
    Bool(bool),
    EmptyMap,
    EmptyArray,
}

impl DefaultValue {
    /// Render this value as an IDL literal.
    pub fn to_literal(&self) -> String {
        match self {
            DefaultValue::Null => "null".to_string(),
            DefaultValue::Str(s) => format!("\"{s}\""),
            DefaultValue::Num(lit) => lit.clone(),
            DefaultValue::Bool(b) => b.to_string(),
            DefaultValue::EmptyMap => "{}".to_string(),
            DefaultValue::EmptyArray => "[]".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals() {
        assert_eq!(DefaultValue::Null.to_literal(), "null");
        assert_eq!(DefaultValue::Str("hi".to_string()).to_literal(), "\"hi\"");
        assert_eq!(DefaultValue::Num("1.50".to_string()).to_literal(), "1.50");
        assert_eq!(DefaultValue::Bool(false).to_literal(), "false");
        assert_eq!(DefaultValue::EmptyMap.to_literal(), "{}");
        assert_eq!(DefaultValue::EmptyArray.to_literal(), "[]");
    }

    #[test]
    fn string_literal_is_not_escaped_again() {
        // The loader hands over escape-safe text; rendering must not double it.
        let v = DefaultValue::Str(r#"say \"hi\""#.to_string());
        assert_eq!(v.to_literal(), r#""say \"hi\"""#);
    }
}
