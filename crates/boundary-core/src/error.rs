//! Marshaling errors
//!
//! - `EncodingError`: a managed value cannot be laid out for the boundary.
//!   Raised before any native call is made.
//! - `ProtocolError`: the native side returned something that breaks the
//!   envelope contract. Fatal to the current call; never retried.
//! - `LoadError`: the native library could not be bound.
//!
//! `DecodingLoss` is not an error: lossy string decodes are logged and
//! decoding continues.

use crate::types::ElementKind;
use std::fmt;
use std::os::raw::c_int;
use std::path::PathBuf;
use thiserror::Error;

/// Managed value cannot be encoded
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("Element {index}: number {value} out of range for {target}")]
    NumberOutOfRange {
        index: usize,
        value: f64,
        target: &'static str,
    },

    #[error("Element {index}: type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        index: usize,
        expected: ElementKind,
        got: &'static str,
    },

    #[error("Collection of {len} elements exceeds the c_int element count")]
    TooLong { len: usize },
}

/// Native result violates the envelope protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Count mismatch: sent {expected} elements, native side reported {reported}")]
    CountMismatch { expected: usize, reported: usize },

    #[error("Native side reported negative element count {0}")]
    NegativeCount(c_int),

    #[error("Native entry point returned a null envelope")]
    NullEnvelope,

    #[error("Null data pointer for {count} elements")]
    NullData { count: usize },

    #[error("Null string at element {index}")]
    NullElement { index: usize },

    #[error("Native entry point returned a null string")]
    NullString,
}

/// Native library cannot be bound
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load library {}: {source}", path.display())]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Symbol '{symbol}' not found in library {}", path.display())]
    SymbolNotFound { path: PathBuf, symbol: &'static str },
}

/// Any failure of a boundary operation
#[derive(Error, Debug)]
pub enum MarshalError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Result type for boundary operations
pub type MarshalResult<T> = Result<T, MarshalError>;

/// A string element that was not valid UTF-8
///
/// Invalid sequences are replaced with U+FFFD; `invalid_bytes` counts the
/// bytes that were replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodingLoss {
    pub index: usize,
    pub invalid_bytes: usize,
}

impl fmt::Display for DecodingLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "element {}: {} invalid UTF-8 bytes replaced with U+FFFD",
            self.index, self.invalid_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_error_messages() {
        insta::assert_snapshot!(
            EncodingError::NumberOutOfRange { index: 2, value: 3e9, target: "c_int" }.to_string(),
            @"Element 2: number 3000000000 out of range for c_int"
        );
        insta::assert_snapshot!(
            EncodingError::TypeMismatch { index: 0, expected: ElementKind::Int, got: "text" }.to_string(),
            @"Element 0: type mismatch: expected c_int, got text"
        );
    }

    #[test]
    fn test_protocol_error_messages() {
        insta::assert_snapshot!(
            ProtocolError::CountMismatch { expected: 3, reported: 2 }.to_string(),
            @"Count mismatch: sent 3 elements, native side reported 2"
        );
        insta::assert_snapshot!(
            ProtocolError::NullElement { index: 4 }.to_string(),
            @"Null string at element 4"
        );
    }

    #[test]
    fn test_marshal_error_is_transparent() {
        let err = MarshalError::from(ProtocolError::NegativeCount(-1));
        assert_eq!(err.to_string(), "Native side reported negative element count -1");
    }

    #[test]
    fn test_decoding_loss_display() {
        let loss = DecodingLoss {
            index: 1,
            invalid_bytes: 2,
        };
        assert_eq!(
            loss.to_string(),
            "element 1: 2 invalid UTF-8 bytes replaced with U+FFFD"
        );
    }
}
