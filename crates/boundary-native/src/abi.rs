//! Wire layouts shared by both sides of the boundary
//!
//! Defines the result envelopes returned by every entry point that produces a
//! variable-length collection:
//! - `StringArrayResult` → `{ int numberOfElements; char** data; }`
//! - `IntArrayResult` → `{ int numberOfElements; int* data; }`
//! - `FloatArrayResult` → `{ int numberOfElements; float* data; }`
//!
//! The element widths are part of the wire format. A width mismatch between
//! the two sides is a hard protocol failure, so they are pinned at compile
//! time below.

use std::os::raw::{c_char, c_float, c_int};

const _: () = assert!(std::mem::size_of::<c_int>() == 4);
const _: () = assert!(std::mem::size_of::<c_float>() == 4);
const _: () = assert!(std::mem::size_of::<*mut c_char>() == std::mem::size_of::<usize>());

/// Envelope for a natively-allocated array of NUL-terminated strings
///
/// Freed, together with every string and the pointer table, by
/// `boundary_free_string_array_result`.
#[repr(C)]
#[derive(Debug)]
pub struct StringArrayResult {
    /// Number of strings in `data`
    pub number_of_elements: c_int,
    /// Pointer table of `number_of_elements` strings
    pub data: *mut *mut c_char,
}

/// Envelope for a natively-allocated `c_int` array
///
/// Freed by `boundary_free_int_array_result`.
#[repr(C)]
#[derive(Debug)]
pub struct IntArrayResult {
    /// Number of integers in `data`
    pub number_of_elements: c_int,
    /// Contiguous `c_int` buffer
    pub data: *mut c_int,
}

/// Envelope for a natively-allocated `c_float` array
///
/// Freed by `boundary_free_float_array_result`.
#[repr(C)]
#[derive(Debug)]
pub struct FloatArrayResult {
    /// Number of floats in `data`
    pub number_of_elements: c_int,
    /// Contiguous `c_float` buffer
    pub data: *mut c_float,
}
