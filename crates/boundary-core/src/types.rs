//! Managed value model
//!
//! - `ElementKind`: the three primitive kinds that cross the boundary
//! - `Value`: a dynamically-typed managed element
//! - `TextLike`: text or raw bytes accepted wherever a string is encoded

use std::fmt;

/// Primitive element kind of a boundary collection
///
/// Type mapping:
/// - `ElementKind::Text` → `c_char_p` (NUL-terminated byte string)
/// - `ElementKind::Int` → `c_int`
/// - `ElementKind::Float` → `c_float`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Text,
    Int,
    Float,
}

impl ElementKind {
    /// C name of the element type
    pub fn display_name(&self) -> &'static str {
        match self {
            ElementKind::Text => "c_char_p",
            ElementKind::Int => "c_int",
            ElementKind::Float => "c_float",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Managed element whose kind is only known at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Element kind this value encodes to
    pub fn kind(&self) -> ElementKind {
        match self {
            Value::Int(_) => ElementKind::Int,
            Value::Float(_) => ElementKind::Float,
            Value::Text(_) | Value::Bytes(_) => ElementKind::Text,
        }
    }

    /// Borrow a text or bytes value as `TextLike`
    pub fn as_text_like(&self) -> Option<TextLike<'_>> {
        match self {
            Value::Text(s) => Some(TextLike::Text(s)),
            Value::Bytes(b) => Some(TextLike::Bytes(b)),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

/// Text or raw bytes, resolved to bytes at encode time
///
/// Text is encoded as UTF-8; bytes pass through unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLike<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> TextLike<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            TextLike::Text(s) => s.as_bytes(),
            TextLike::Bytes(b) => b,
        }
    }
}

impl<'a> From<&'a str> for TextLike<'a> {
    fn from(value: &'a str) -> Self {
        TextLike::Text(value)
    }
}

impl<'a> From<&'a String> for TextLike<'a> {
    fn from(value: &'a String) -> Self {
        TextLike::Text(value)
    }
}

impl<'a> From<&'a [u8]> for TextLike<'a> {
    fn from(value: &'a [u8]) -> Self {
        TextLike::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for TextLike<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        TextLike::Bytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for TextLike<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        TextLike::Bytes(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_kind_display_names() {
        assert_eq!(ElementKind::Text.to_string(), "c_char_p");
        assert_eq!(ElementKind::Int.to_string(), "c_int");
        assert_eq!(ElementKind::Float.to_string(), "c_float");
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::from(1i32).kind(), ElementKind::Int);
        assert_eq!(Value::from(1.5f32).kind(), ElementKind::Float);
        assert_eq!(Value::from("a").kind(), ElementKind::Text);
        assert_eq!(Value::from(vec![0xffu8]).kind(), ElementKind::Text);
    }

    #[test]
    fn test_value_as_text_like() {
        assert_eq!(
            Value::from("hi").as_text_like(),
            Some(TextLike::Text("hi"))
        );
        assert_eq!(
            Value::Bytes(vec![1, 2]).as_text_like(),
            Some(TextLike::Bytes(&[1, 2]))
        );
        assert_eq!(Value::Int(3).as_text_like(), None);
    }

    #[test]
    fn test_text_like_bytes() {
        assert_eq!(TextLike::from("héllo").as_bytes(), "héllo".as_bytes());
        assert_eq!(TextLike::from(b"\xff\x00").as_bytes(), &[0xff, 0x00]);
    }
}
