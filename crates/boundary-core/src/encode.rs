//! Boundary-safe encoders
//!
//! Turn managed strings, integers and floats into flat buffers laid out the
//! way the native entry points expect:
//! - `CStringBuffer`: one NUL-terminated byte string
//! - `StringArrayBuffer`: NUL-terminated copies plus a pointer table
//! - `IntArrayBuffer`: contiguous `c_int`s
//! - `FloatArrayBuffer`: contiguous `c_float`s
//!
//! # Ownership
//!
//! Every buffer here is owned by the managed side. Native entry points only
//! borrow them for the duration of a call and nothing in this crate hands
//! them to a native free function.
//!
//! # Embedded NULs
//!
//! Bytes are copied verbatim. A string containing NUL is not rejected; the
//! native side simply sees it truncated at the first NUL.

use crate::error::{EncodingError, MarshalResult};
use crate::types::{ElementKind, TextLike, Value};
use std::os::raw::{c_char, c_float, c_int};

const MAX_ELEMENTS: usize = c_int::MAX as usize;

/// Managed NUL-terminated byte string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CStringBuffer {
    /// Content followed by a single NUL
    bytes: Vec<u8>,
}

impl CStringBuffer {
    pub fn new<'a>(text: impl Into<TextLike<'a>>) -> Self {
        let text = text.into().as_bytes();
        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text);
        bytes.push(0);
        Self { bytes }
    }

    /// Pointer to the first byte; never null, valid while `self` lives
    pub fn as_ptr(&self) -> *const c_char {
        self.bytes.as_ptr() as *const c_char
    }

    /// Content without the terminator, including any embedded NULs
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Managed array of NUL-terminated strings
#[derive(Debug)]
pub struct StringArrayBuffer {
    strings: Vec<CStringBuffer>,
    /// Points into `strings`; each `CStringBuffer` heap block stays put
    pointers: Vec<*const c_char>,
    count: c_int,
}

impl StringArrayBuffer {
    fn new(strings: Vec<CStringBuffer>, count: c_int) -> Self {
        let pointers = strings.iter().map(CStringBuffer::as_ptr).collect();
        Self {
            strings,
            pointers,
            count,
        }
    }

    pub fn as_ptr(&self) -> *const *const c_char {
        self.pointers.as_ptr()
    }

    /// Element count as sent across the boundary
    pub fn count(&self) -> c_int {
        self.count
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CStringBuffer> {
        self.strings.get(index)
    }
}

/// Managed contiguous `c_int` array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntArrayBuffer {
    values: Vec<c_int>,
    count: c_int,
}

impl IntArrayBuffer {
    pub fn as_ptr(&self) -> *const c_int {
        self.values.as_ptr()
    }

    pub fn count(&self) -> c_int {
        self.count
    }

    pub fn as_slice(&self) -> &[c_int] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Values already in native width are taken without copying
impl TryFrom<Vec<c_int>> for IntArrayBuffer {
    type Error = EncodingError;

    fn try_from(values: Vec<c_int>) -> Result<Self, Self::Error> {
        let count = element_count(values.len(), MAX_ELEMENTS)?;
        Ok(Self { values, count })
    }
}

/// Managed contiguous `c_float` array
#[derive(Debug, Clone, PartialEq)]
pub struct FloatArrayBuffer {
    values: Vec<c_float>,
    count: c_int,
}

impl FloatArrayBuffer {
    pub fn as_ptr(&self) -> *const c_float {
        self.values.as_ptr()
    }

    pub fn count(&self) -> c_int {
        self.count
    }

    pub fn as_slice(&self) -> &[c_float] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TryFrom<Vec<c_float>> for FloatArrayBuffer {
    type Error = EncodingError;

    fn try_from(values: Vec<c_float>) -> Result<Self, Self::Error> {
        let count = element_count(values.len(), MAX_ELEMENTS)?;
        Ok(Self { values, count })
    }
}

/// Array encoded from dynamically-typed values
#[derive(Debug)]
pub enum EncodedArray {
    Text(StringArrayBuffer),
    Int(IntArrayBuffer),
    Float(FloatArrayBuffer),
}

impl EncodedArray {
    pub fn kind(&self) -> ElementKind {
        match self {
            EncodedArray::Text(_) => ElementKind::Text,
            EncodedArray::Int(_) => ElementKind::Int,
            EncodedArray::Float(_) => ElementKind::Float,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EncodedArray::Text(buffer) => buffer.len(),
            EncodedArray::Int(buffer) => buffer.len(),
            EncodedArray::Float(buffer) => buffer.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Encoder for managed collections
///
/// Validates every element before anything crosses the boundary: integers
/// must fit `c_int`, finite floats must fit `c_float`, and the collection
/// must not exceed the element limit (`c_int::MAX` unless lowered).
///
/// # Example
///
/// ```
/// # use boundary_core::{ElementKind, MarshalContext, Value};
/// let ctx = MarshalContext::new();
///
/// let ints = ctx.ints(&[1, 2, 3]).unwrap();
/// assert_eq!(ints.as_slice(), &[1, 2, 3]);
///
/// // A string in an integer list is rejected up front
/// let values = [Value::Int(1), Value::from("two")];
/// assert!(ctx.encode(&values, ElementKind::Int).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MarshalContext {
    max_len: usize,
}

impl MarshalContext {
    pub fn new() -> Self {
        Self {
            max_len: MAX_ELEMENTS,
        }
    }

    /// Lower the element limit; it never exceeds `c_int::MAX`
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len: max_len.min(MAX_ELEMENTS),
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Encode text-like items into a string array
    pub fn strings<'a, I>(&self, items: I) -> MarshalResult<StringArrayBuffer>
    where
        I: IntoIterator,
        I::Item: Into<TextLike<'a>>,
    {
        let strings: Vec<CStringBuffer> = items
            .into_iter()
            .map(|item| CStringBuffer::new(item))
            .collect();
        let count = element_count(strings.len(), self.max_len)?;
        Ok(StringArrayBuffer::new(strings, count))
    }

    /// Encode integers, checking each one into `c_int`
    pub fn ints(&self, values: &[i64]) -> MarshalResult<IntArrayBuffer> {
        let count = element_count(values.len(), self.max_len)?;
        let values = values
            .iter()
            .enumerate()
            .map(|(index, &value)| narrow_int(index, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IntArrayBuffer { values, count })
    }

    /// Encode floats, narrowing each one to `c_float`
    pub fn floats(&self, values: &[f64]) -> MarshalResult<FloatArrayBuffer> {
        let count = element_count(values.len(), self.max_len)?;
        let values = values
            .iter()
            .enumerate()
            .map(|(index, &value)| narrow_float(index, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FloatArrayBuffer { values, count })
    }

    /// Encode dynamically-typed values as an array of `kind`
    ///
    /// Every element must already be of that kind; nothing is coerced.
    pub fn encode(&self, values: &[Value], kind: ElementKind) -> MarshalResult<EncodedArray> {
        if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| v.kind() != kind) {
            return Err(EncodingError::TypeMismatch {
                index,
                expected: kind,
                got: value.type_name(),
            }
            .into());
        }

        // Every value is of `kind` from here on
        match kind {
            ElementKind::Text => {
                let items = values.iter().filter_map(Value::as_text_like);
                Ok(EncodedArray::Text(self.strings(items)?))
            }
            ElementKind::Int => {
                let ints: Vec<i64> = values
                    .iter()
                    .filter_map(|value| match value {
                        Value::Int(i) => Some(*i),
                        _ => None,
                    })
                    .collect();
                Ok(EncodedArray::Int(self.ints(&ints)?))
            }
            ElementKind::Float => {
                let floats: Vec<f64> = values
                    .iter()
                    .filter_map(|value| match value {
                        Value::Float(f) => Some(*f),
                        _ => None,
                    })
                    .collect();
                Ok(EncodedArray::Float(self.floats(&floats)?))
            }
        }
    }
}

impl Default for MarshalContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a single string
///
/// Empty input yields a non-null buffer holding only the terminator.
pub fn prepare_string<'a>(text: impl Into<TextLike<'a>>) -> CStringBuffer {
    CStringBuffer::new(text)
}

/// Encode text-like items into a string array
pub fn prepare_string_array<'a, I>(items: I) -> MarshalResult<StringArrayBuffer>
where
    I: IntoIterator,
    I::Item: Into<TextLike<'a>>,
{
    MarshalContext::new().strings(items)
}

/// Encode integers into a `c_int` array
pub fn prepare_int_array(values: &[i64]) -> MarshalResult<IntArrayBuffer> {
    MarshalContext::new().ints(values)
}

/// Encode floats into a `c_float` array
///
/// Single precision keeps roughly seven significant digits: values up to
/// 1000 in magnitude come back within 1e-4.
pub fn prepare_float_array(values: &[f64]) -> MarshalResult<FloatArrayBuffer> {
    MarshalContext::new().floats(values)
}

fn element_count(len: usize, max_len: usize) -> Result<c_int, EncodingError> {
    if len > max_len {
        return Err(EncodingError::TooLong { len });
    }
    c_int::try_from(len).map_err(|_| EncodingError::TooLong { len })
}

fn narrow_int(index: usize, value: i64) -> Result<c_int, EncodingError> {
    c_int::try_from(value).map_err(|_| EncodingError::NumberOutOfRange {
        index,
        value: value as f64,
        target: "c_int",
    })
}

fn narrow_float(index: usize, value: f64) -> Result<c_float, EncodingError> {
    // NaN and infinities have exact single-precision forms
    if value.is_finite() && value.abs() > f64::from(c_float::MAX) {
        return Err(EncodingError::NumberOutOfRange {
            index,
            value,
            target: "c_float",
        });
    }
    Ok(value as c_float)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarshalError;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::ffi::CStr;

    fn encoding_error(result: MarshalResult<impl std::fmt::Debug>) -> EncodingError {
        match result {
            Err(MarshalError::Encoding(err)) => err,
            other => panic!("Expected EncodingError, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_string_is_non_null_terminator() {
        let buffer = prepare_string("");
        assert!(!buffer.as_ptr().is_null());
        assert!(buffer.is_empty());
        assert_eq!(unsafe { *buffer.as_ptr() }, 0);
    }

    #[rstest]
    #[case("hello", b"hello")]
    #[case("\0\0", b"")]
    #[case("as\0\nasdf", b"as")]
    fn test_native_view_stops_at_first_nul(#[case] input: &str, #[case] seen: &[u8]) {
        let buffer = prepare_string(input);
        assert_eq!(buffer.as_bytes(), input.as_bytes());
        let c_view = unsafe { CStr::from_ptr(buffer.as_ptr()) };
        assert_eq!(c_view.to_bytes(), seen);
    }

    #[test]
    fn test_bytes_pass_through_unmodified() {
        let buffer = prepare_string(b"\xff\xferaw");
        assert_eq!(buffer.as_bytes(), b"\xff\xferaw");
    }

    #[test]
    fn test_string_array_pointer_table() {
        let owned = vec!["one".to_string(), String::new(), "three".to_string()];
        let buffer = prepare_string_array(&owned).unwrap();
        assert_eq!(buffer.count(), 3);

        let table = unsafe { std::slice::from_raw_parts(buffer.as_ptr(), 3) };
        let seen: Vec<&[u8]> = table
            .iter()
            .map(|&ptr| unsafe { CStr::from_ptr(ptr) }.to_bytes())
            .collect();
        assert_eq!(seen, vec![&b"one"[..], b"", b"three"]);
    }

    #[test]
    fn test_string_array_survives_move() {
        let buffer = prepare_string_array(["a", "b"]).unwrap();
        let moved = Box::new(buffer);
        let first = unsafe { CStr::from_ptr(*moved.as_ptr()) };
        assert_eq!(first.to_bytes(), b"a");
    }

    #[test]
    fn test_int_range_checked() {
        let buffer = prepare_int_array(&[i32::MIN.into(), 0, i32::MAX.into()]).unwrap();
        assert_eq!(buffer.as_slice(), &[i32::MIN, 0, i32::MAX]);

        let err = encoding_error(prepare_int_array(&[1, 3_000_000_000]));
        assert!(matches!(
            err,
            EncodingError::NumberOutOfRange { index: 1, target: "c_int", .. }
        ));
    }

    #[test]
    fn test_float_narrowing() {
        let buffer = prepare_float_array(&[1.5, -0.25]).unwrap();
        assert_eq!(buffer.as_slice(), &[1.5f32, -0.25]);

        let err = encoding_error(prepare_float_array(&[0.0, 1e39]));
        assert!(matches!(
            err,
            EncodingError::NumberOutOfRange { index: 1, target: "c_float", .. }
        ));
    }

    #[test]
    fn test_float_specials_pass_through() {
        let buffer = prepare_float_array(&[f64::NAN, f64::INFINITY, f64::NEG_INFINITY]).unwrap();
        let values = buffer.as_slice();
        assert!(values[0].is_nan());
        assert_eq!(values[1], f32::INFINITY);
        assert_eq!(values[2], f32::NEG_INFINITY);
    }

    #[test]
    fn test_native_width_vectors_are_not_copied() {
        let values = vec![1, 2, 3];
        let ptr = values.as_ptr();
        let buffer = IntArrayBuffer::try_from(values).unwrap();
        assert_eq!(buffer.as_ptr(), ptr);
        assert_eq!(buffer.count(), 3);

        let floats = vec![0.5f32];
        let ptr = floats.as_ptr();
        assert_eq!(FloatArrayBuffer::try_from(floats).unwrap().as_ptr(), ptr);
    }

    #[test]
    fn test_too_long() {
        let ctx = MarshalContext::with_max_len(2);
        let err = encoding_error(ctx.ints(&[1, 2, 3]));
        assert_eq!(err, EncodingError::TooLong { len: 3 });

        let err = encoding_error(ctx.strings(["a", "b", "c"]));
        assert_eq!(err, EncodingError::TooLong { len: 3 });

        assert!(ctx.floats(&[1.0, 2.0]).is_ok());
    }

    #[test]
    fn test_max_len_capped_at_c_int() {
        let ctx = MarshalContext::with_max_len(usize::MAX);
        assert_eq!(ctx.max_len(), c_int::MAX as usize);
    }

    #[rstest]
    #[case(ElementKind::Int, vec![Value::Int(1), Value::from("2")], 1, "text")]
    #[case(ElementKind::Float, vec![Value::Int(1)], 0, "int")]
    #[case(ElementKind::Text, vec![Value::from("a"), Value::Float(1.0)], 1, "float")]
    fn test_encode_type_mismatch(
        #[case] kind: ElementKind,
        #[case] values: Vec<Value>,
        #[case] index: usize,
        #[case] got: &'static str,
    ) {
        let err = encoding_error(MarshalContext::new().encode(&values, kind));
        assert_eq!(
            err,
            EncodingError::TypeMismatch {
                index,
                expected: kind,
                got,
            }
        );
    }

    #[test]
    fn test_encode_mixed_text_and_bytes() {
        let values = [Value::from("a"), Value::Bytes(vec![0xff])];
        let encoded = MarshalContext::new()
            .encode(&values, ElementKind::Text)
            .unwrap();
        assert_eq!(encoded.kind(), ElementKind::Text);
        assert_eq!(encoded.len(), 2);
        match encoded {
            EncodedArray::Text(buffer) => {
                assert_eq!(buffer.get(1).map(CStringBuffer::as_bytes), Some(&[0xffu8][..]));
            }
            other => panic!("Expected text array, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_empty() {
        let encoded = MarshalContext::new().encode(&[], ElementKind::Float).unwrap();
        assert!(encoded.is_empty());
        assert_eq!(encoded.kind(), ElementKind::Float);
    }
}
