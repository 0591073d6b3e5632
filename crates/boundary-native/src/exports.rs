//! Exported C-ABI entry points
//!
//! Calling convention:
//! - arrays are passed as pointer + `c_int` element count
//! - single strings are passed as a bare NUL-terminated pointer
//! - collection results are returned as a pointer to a result envelope
//!
//! Every pointer returned here is owned by the caller until handed back to
//! the one `boundary_free_*` function that matches its shape:
//!
//! | Returned by | Free with |
//! |---|---|
//! | `boundary_return_string` | `boundary_free_c_string` |
//! | `boundary_copy_string_array` | `boundary_free_string_array` (same count) |
//! | `boundary_copy_int_array` | `boundary_free_int_array` |
//! | `boundary_copy_float_array` | `boundary_free_float_array` |
//! | `boundary_return_string_array` | `boundary_free_string_array_result` |
//! | `boundary_return_int_array` | `boundary_free_int_array_result` |
//! | `boundary_return_float_array` | `boundary_free_float_array_result` |

use crate::abi::{FloatArrayResult, IntArrayResult, StringArrayResult};
use crate::convert::{
    bytes_to_c_string, c_float_array_to_vec, c_int_array_to_vec, c_string_array_to_vec,
    c_string_bytes, checked_count, copy_to_c_array, floats_to_result, free_string_table,
    ints_to_result, strings_to_c_array, strings_to_result,
};
use crate::heap;
use std::os::raw::{c_char, c_float, c_int};

fn lossy_strings(strings: &[Vec<u8>]) -> Vec<String> {
    strings
        .iter()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

// ========== Debugging entry points ==========

/// Print the native representation of a C string
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn boundary_print_string(ptr: *const c_char) {
    if ptr.is_null() {
        println!("print_string() received null pointer");
        return;
    }
    let bytes = c_string_bytes(ptr);
    println!(
        "print_string() native representation: {}",
        String::from_utf8_lossy(bytes)
    );
}

/// Print the native representation of a string array
///
/// # Safety
///
/// `array` must be null or point to `count` string pointers.
#[no_mangle]
pub unsafe extern "C" fn boundary_print_string_array(
    array: *const *const c_char,
    count: c_int,
) {
    let strings = c_string_array_to_vec(array, count);
    println!(
        "print_string_array() native representation: {:?}",
        lossy_strings(&strings)
    );
}

/// Print the native representation of an int array
///
/// # Safety
///
/// `array` must be null or point to `count` initialised `c_int`s.
#[no_mangle]
pub unsafe extern "C" fn boundary_print_int_array(array: *const c_int, count: c_int) {
    let values = c_int_array_to_vec(array, count);
    println!("print_int_array() native representation: {:?}", values);
}

/// Print the native representation of a float array
///
/// # Safety
///
/// `array` must be null or point to `count` initialised `c_float`s.
#[no_mangle]
pub unsafe extern "C" fn boundary_print_float_array(array: *const c_float, count: c_int) {
    let values = c_float_array_to_vec(array, count);
    println!("print_float_array() native representation: {:?}", values);
}

// ========== Echo entry points ==========

/// Copy a C string into a new natively-allocated string
///
/// Caller frees the result with [`boundary_free_c_string`].
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn boundary_return_string(ptr: *const c_char) -> *mut c_char {
    bytes_to_c_string(c_string_bytes(ptr))
}

/// Copy a string array into a new `StringArrayResult`
///
/// Caller frees the result with [`boundary_free_string_array_result`].
///
/// # Safety
///
/// `array` must be null or point to `count` string pointers.
#[no_mangle]
pub unsafe extern "C" fn boundary_return_string_array(
    array: *const *const c_char,
    count: c_int,
) -> *mut StringArrayResult {
    let strings = c_string_array_to_vec(array, count);
    strings_to_result(&strings)
}

/// Copy an int array into a new `IntArrayResult`
///
/// Caller frees the result with [`boundary_free_int_array_result`].
///
/// # Safety
///
/// `array` must be null or point to `count` initialised `c_int`s.
#[no_mangle]
pub unsafe extern "C" fn boundary_return_int_array(
    array: *const c_int,
    count: c_int,
) -> *mut IntArrayResult {
    ints_to_result(&c_int_array_to_vec(array, count))
}

/// Copy a float array into a new `FloatArrayResult`
///
/// Caller frees the result with [`boundary_free_float_array_result`].
///
/// # Safety
///
/// `array` must be null or point to `count` initialised `c_float`s.
#[no_mangle]
pub unsafe extern "C" fn boundary_return_float_array(
    array: *const c_float,
    count: c_int,
) -> *mut FloatArrayResult {
    floats_to_result(&c_float_array_to_vec(array, count))
}

/// Copy a string array into a bare natively-allocated string table
///
/// Caller frees the result with [`boundary_free_string_array`], passing the
/// same `count`.
///
/// # Safety
///
/// `array` must be null or point to `count` string pointers.
#[no_mangle]
pub unsafe extern "C" fn boundary_copy_string_array(
    array: *const *const c_char,
    count: c_int,
) -> *mut *mut c_char {
    let strings = c_string_array_to_vec(array, count);
    strings_to_c_array(&strings)
}

/// Copy an int array into a bare natively-allocated array
///
/// Caller frees the result with [`boundary_free_int_array`].
///
/// # Safety
///
/// `array` must be null or point to `count` initialised `c_int`s.
#[no_mangle]
pub unsafe extern "C" fn boundary_copy_int_array(array: *const c_int, count: c_int) -> *mut c_int {
    copy_to_c_array(&c_int_array_to_vec(array, count))
}

/// Copy a float array into a bare natively-allocated array
///
/// Caller frees the result with [`boundary_free_float_array`].
///
/// # Safety
///
/// `array` must be null or point to `count` initialised `c_float`s.
#[no_mangle]
pub unsafe extern "C" fn boundary_copy_float_array(
    array: *const c_float,
    count: c_int,
) -> *mut c_float {
    copy_to_c_array(&c_float_array_to_vec(array, count))
}

// ========== Free entry points ==========

/// Free a string returned by [`boundary_return_string`]
///
/// # Safety
///
/// `ptr` must be null or a string allocated by this library and not yet freed.
#[no_mangle]
pub unsafe extern "C" fn boundary_free_c_string(ptr: *mut c_char) {
    heap::release(ptr);
}

/// Free a string table returned by [`boundary_copy_string_array`]
///
/// # Safety
///
/// `array` must be null or a string table allocated by this library with
/// exactly `count` entries, not yet freed.
#[no_mangle]
pub unsafe extern "C" fn boundary_free_string_array(array: *mut *mut c_char, count: c_int) {
    free_string_table(array, checked_count(count));
}

/// Free an int array returned by [`boundary_copy_int_array`]
///
/// # Safety
///
/// `ptr` must be null or an int array allocated by this library, not yet freed.
#[no_mangle]
pub unsafe extern "C" fn boundary_free_int_array(ptr: *mut c_int) {
    heap::release(ptr);
}

/// Free a float array returned by [`boundary_copy_float_array`]
///
/// # Safety
///
/// `ptr` must be null or a float array allocated by this library, not yet freed.
#[no_mangle]
pub unsafe extern "C" fn boundary_free_float_array(ptr: *mut c_float) {
    heap::release(ptr);
}

/// Free a `StringArrayResult`: every string, the table and the struct
///
/// # Safety
///
/// `result` must be null or an envelope returned by
/// [`boundary_return_string_array`], not yet freed.
#[no_mangle]
pub unsafe extern "C" fn boundary_free_string_array_result(result: *mut StringArrayResult) {
    if result.is_null() {
        return;
    }
    let envelope = &*result;
    free_string_table(envelope.data, checked_count(envelope.number_of_elements));
    heap::release(result);
}

/// Free an `IntArrayResult`: the array and the struct
///
/// # Safety
///
/// `result` must be null or an envelope returned by
/// [`boundary_return_int_array`], not yet freed.
#[no_mangle]
pub unsafe extern "C" fn boundary_free_int_array_result(result: *mut IntArrayResult) {
    if result.is_null() {
        return;
    }
    heap::release((*result).data);
    heap::release(result);
}

/// Free a `FloatArrayResult`: the array and the struct
///
/// # Safety
///
/// `result` must be null or an envelope returned by
/// [`boundary_return_float_array`], not yet freed.
#[no_mangle]
pub unsafe extern "C" fn boundary_free_float_array_result(result: *mut FloatArrayResult) {
    if result.is_null() {
        return;
    }
    heap::release((*result).data);
    heap::release(result);
}

// ========== Instrumentation ==========

/// Number of native allocations made by the calling thread and not yet freed
#[no_mangle]
pub extern "C" fn boundary_outstanding_allocations() -> isize {
    heap::outstanding()
}
