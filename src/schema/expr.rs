//! Type-expression grammar for schema field types.
//!
//! ```text
//! expr := NAME | expr "?" | expr "[]" | "vector[" expr "]" | "set[" expr "]"
//! ```
//!
//! Suffixes bind outermost-last, so `string[]?` is an optional vector of
//! strings and `vector[uint8]?` is an optional vector of uint8.

/// Parsed type expression: a tree of wrapper applications over leaf names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Name(String),
    Optional(Box<TypeExpr>),
    Vector(Box<TypeExpr>),
    Set(Box<TypeExpr>),
}

/// Parse a field type expression. Errors carry a plain message; the
/// compiler wraps them with the owning struct and field.
pub fn parse(input: &str) -> Result<TypeExpr, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty type expression".into());
    }
    if let Some(rest) = s.strip_suffix('?') {
        return Ok(TypeExpr::Optional(Box::new(parse(rest)?)));
    }
    if let Some(rest) = s.strip_suffix("[]") {
        return Ok(TypeExpr::Vector(Box::new(parse(rest)?)));
    }
    if let Some(inner) = s
        .strip_prefix("vector[")
        .and_then(|r| r.strip_suffix(']'))
    {
        return Ok(TypeExpr::Vector(Box::new(parse(inner)?)));
    }
    if let Some(inner) = s.strip_prefix("set[").and_then(|r| r.strip_suffix(']')) {
        return Ok(TypeExpr::Set(Box::new(parse(inner)?)));
    }
    if s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        Ok(TypeExpr::Name(s.to_string()))
    } else {
        Err(format!("unexpected character in '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Box<TypeExpr> {
        Box::new(TypeExpr::Name(s.into()))
    }

    #[test]
    fn test_plain_name() {
        assert_eq!(parse("uint8").unwrap(), TypeExpr::Name("uint8".into()));
    }

    #[test]
    fn test_optional_suffix() {
        assert_eq!(
            parse("string?").unwrap(),
            TypeExpr::Optional(name("string"))
        );
    }

    #[test]
    fn test_vector_suffix_and_explicit() {
        assert_eq!(parse("string[]").unwrap(), TypeExpr::Vector(name("string")));
        assert_eq!(
            parse("vector[string]").unwrap(),
            TypeExpr::Vector(name("string"))
        );
    }

    #[test]
    fn test_nested() {
        assert_eq!(
            parse("string[]?").unwrap(),
            TypeExpr::Optional(Box::new(TypeExpr::Vector(name("string"))))
        );
        assert_eq!(
            parse("vector[uint8[]]").unwrap(),
            TypeExpr::Vector(Box::new(TypeExpr::Vector(name("uint8"))))
        );
    }

    #[test]
    fn test_set_form() {
        assert_eq!(parse("set[uint16]").unwrap(), TypeExpr::Set(name("uint16")));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("a b").is_err());
        assert!(parse("name[").is_err());
    }
}
