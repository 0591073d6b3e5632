//! Boundary-safe decoders
//!
//! Read natively-allocated buffers back into managed values. These functions
//! never free anything; release is the job of the handle that owns the
//! buffer (see `envelope`).
//!
//! - Integers widen to `i64`, floats to `f64`
//! - Strings decode permissively: invalid UTF-8 becomes U+FFFD and the loss
//!   is logged at the configured level, never raised

use crate::error::{DecodingLoss, ProtocolError};
use boundary_config::LossLevel;
use log::Level;
use std::ffi::CStr;
use std::os::raw::{c_char, c_float, c_int};

/// Log level used for decoding loss, `None` when loss is not reported
pub fn loss_log_level(level: LossLevel) -> Option<Level> {
    match level {
        LossLevel::Warn => Some(Level::Warn),
        LossLevel::Info => Some(Level::Info),
        LossLevel::Debug => Some(Level::Debug),
        LossLevel::Off => None,
    }
}

/// Decode bytes as UTF-8, replacing invalid sequences
///
/// Returns the decoded string and, if anything was replaced, the loss for
/// element `index`.
pub fn decode_lossy(bytes: &[u8], index: usize) -> (String, Option<DecodingLoss>) {
    let text = String::from_utf8_lossy(bytes).into_owned();
    let invalid_bytes = invalid_byte_count(bytes);
    let loss = (invalid_bytes > 0).then_some(DecodingLoss {
        index,
        invalid_bytes,
    });
    (text, loss)
}

/// Decode bytes as UTF-8 and report any loss through `log`
pub fn decode_bytes(bytes: &[u8], index: usize, loss_level: Option<Level>) -> String {
    let (text, loss) = decode_lossy(bytes, index);
    if let (Some(loss), Some(level)) = (loss, loss_level) {
        log::log!(level, "decoding loss: {}", loss);
    }
    text
}

fn invalid_byte_count(mut bytes: &[u8]) -> usize {
    let mut invalid = 0;
    loop {
        match std::str::from_utf8(bytes) {
            Ok(_) => return invalid,
            Err(e) => {
                let bad = e.error_len().unwrap_or(bytes.len() - e.valid_up_to());
                invalid += bad;
                bytes = &bytes[e.valid_up_to() + bad..];
            }
        }
    }
}

/// Validate an envelope's reported count
///
/// `expected` is the number of elements the managed side sent, when the
/// count is to be verified.
pub fn element_count(reported: c_int, expected: Option<usize>) -> Result<usize, ProtocolError> {
    let count = usize::try_from(reported).map_err(|_| ProtocolError::NegativeCount(reported))?;
    match expected {
        Some(expected) if expected != count => Err(ProtocolError::CountMismatch {
            expected,
            reported: count,
        }),
        _ => Ok(count),
    }
}

/// Decode a single NUL-terminated string
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
pub unsafe fn decode_c_string(
    ptr: *const c_char,
    loss_level: Option<Level>,
) -> Result<String, ProtocolError> {
    if ptr.is_null() {
        return Err(ProtocolError::NullString);
    }
    Ok(decode_bytes(CStr::from_ptr(ptr).to_bytes(), 0, loss_level))
}

/// Borrow `count` elements, rejecting a null pointer for a non-empty array
///
/// # Safety
///
/// `data` must be null or point to `count` initialised elements.
unsafe fn elements<'a, T>(data: *const T, count: usize) -> Result<&'a [T], ProtocolError> {
    if count == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(ProtocolError::NullData { count });
    }
    Ok(std::slice::from_raw_parts(data, count))
}

/// Decode `count` strings from a pointer table
///
/// Stops at the first null element.
///
/// # Safety
///
/// `data` must be null or point to `count` pointers, each null or pointing
/// to a NUL-terminated string.
pub unsafe fn decode_string_elements(
    data: *const *mut c_char,
    count: usize,
    loss_level: Option<Level>,
) -> Result<Vec<String>, ProtocolError> {
    let table = elements(data, count)?;
    let mut strings = Vec::with_capacity(count);
    for (index, &ptr) in table.iter().enumerate() {
        if ptr.is_null() {
            return Err(ProtocolError::NullElement { index });
        }
        strings.push(decode_bytes(CStr::from_ptr(ptr).to_bytes(), index, loss_level));
    }
    Ok(strings)
}

/// Decode `count` integers, widening to `i64`
///
/// # Safety
///
/// `data` must be null or point to `count` initialised `c_int`s.
pub unsafe fn decode_int_elements(
    data: *const c_int,
    count: usize,
) -> Result<Vec<i64>, ProtocolError> {
    Ok(elements(data, count)?.iter().map(|&i| i64::from(i)).collect())
}

/// Decode `count` floats, widening to `f64`
///
/// # Safety
///
/// `data` must be null or point to `count` initialised `c_float`s.
pub unsafe fn decode_float_elements(
    data: *const c_float,
    count: usize,
) -> Result<Vec<f64>, ProtocolError> {
    Ok(elements(data, count)?.iter().map(|&f| f64::from(f)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::ffi::CString;
    use std::ptr;

    #[rstest]
    #[case(b"plain", 0)]
    #[case(b"caf\xc3\xa9", 0)]
    #[case(b"\xff", 1)]
    #[case(b"a\xffb\xfe", 2)]
    #[case(b"\xe2\x82", 2)]
    fn test_invalid_byte_count(#[case] bytes: &[u8], #[case] expected: usize) {
        assert_eq!(invalid_byte_count(bytes), expected);
    }

    #[test]
    fn test_decode_lossy_reports_loss() {
        let (text, loss) = decode_lossy(b"ok\xff", 3);
        assert_eq!(text, "ok\u{FFFD}");
        assert_eq!(
            loss,
            Some(DecodingLoss {
                index: 3,
                invalid_bytes: 1
            })
        );

        let (text, loss) = decode_lossy(b"fine", 0);
        assert_eq!(text, "fine");
        assert_eq!(loss, None);
    }

    #[rstest]
    #[case(3, None, Ok(3))]
    #[case(3, Some(3), Ok(3))]
    #[case(2, Some(3), Err(ProtocolError::CountMismatch { expected: 3, reported: 2 }))]
    #[case(-1, None, Err(ProtocolError::NegativeCount(-1)))]
    fn test_element_count(
        #[case] reported: c_int,
        #[case] expected: Option<usize>,
        #[case] result: Result<usize, ProtocolError>,
    ) {
        assert_eq!(element_count(reported, expected), result);
    }

    #[test]
    fn test_decode_null_string() {
        let result = unsafe { decode_c_string(ptr::null(), Some(Level::Warn)) };
        assert_eq!(result, Err(ProtocolError::NullString));
    }

    #[test]
    fn test_decode_string_elements() {
        let owned: Vec<CString> = ["a", "", "ç"]
            .iter()
            .map(|s| CString::new(*s).unwrap())
            .collect();
        let table: Vec<*mut c_char> = owned.iter().map(|s| s.as_ptr() as *mut c_char).collect();

        let decoded = unsafe { decode_string_elements(table.as_ptr(), 3, None) }.unwrap();
        assert_eq!(decoded, vec!["a", "", "ç"]);
    }

    #[test]
    fn test_decode_null_element_mid_array() {
        let first = CString::new("first").unwrap();
        let table = [first.as_ptr() as *mut c_char, ptr::null_mut()];
        let result = unsafe { decode_string_elements(table.as_ptr(), 2, None) };
        assert_eq!(result, Err(ProtocolError::NullElement { index: 1 }));
    }

    #[test]
    fn test_null_data() {
        let result = unsafe { decode_int_elements(ptr::null(), 2) };
        assert_eq!(result, Err(ProtocolError::NullData { count: 2 }));

        // Zero elements never dereference the pointer
        let result = unsafe { decode_float_elements(ptr::null(), 0) };
        assert_eq!(result, Ok(vec![]));
    }

    #[test]
    fn test_numbers_widen() {
        let ints = [i32::MIN, 7, i32::MAX];
        let decoded = unsafe { decode_int_elements(ints.as_ptr(), 3) }.unwrap();
        assert_eq!(decoded, vec![i64::from(i32::MIN), 7, i64::from(i32::MAX)]);

        let floats = [0.5f32, -2.25];
        let decoded = unsafe { decode_float_elements(floats.as_ptr(), 2) }.unwrap();
        assert_eq!(decoded, vec![0.5, -2.25]);
    }

    #[test]
    fn test_loss_log_levels() {
        assert_eq!(loss_log_level(LossLevel::Warn), Some(Level::Warn));
        assert_eq!(loss_log_level(LossLevel::Debug), Some(Level::Debug));
        assert_eq!(loss_log_level(LossLevel::Off), None);
    }
}
