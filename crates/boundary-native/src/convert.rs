//! Conversions between C buffers and native-side Rust values
//!
//! Two directions:
//! - Inbound (`c_*_to_*`): read caller-owned C buffers into owned Rust values.
//!   Inputs are never freed here.
//! - Outbound (`*_to_c_*`): copy Rust values into freshly allocated C heap
//!   buffers and envelopes. The caller becomes responsible for the matching
//!   free entry point.
//!
//! Inbound readers are lenient the way the managed side expects: a null
//! string reads as empty, a null array or negative count reads as an empty
//! array.

use crate::abi::{FloatArrayResult, IntArrayResult, StringArrayResult};
use crate::heap;
use std::ffi::CStr;
use std::os::raw::{c_char, c_float, c_int};
use std::ptr;

/// Convert a caller-supplied element count to `usize`
///
/// Negative counts are logged and treated as zero.
pub fn checked_count(count: c_int) -> usize {
    usize::try_from(count).unwrap_or_else(|_| {
        log::warn!("negative element count {} treated as empty", count);
        0
    })
}

/// Borrow the bytes of a NUL-terminated C string, without the terminator
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub unsafe fn c_string_bytes<'a>(ptr: *const c_char) -> &'a [u8] {
    if ptr.is_null() {
        return &[];
    }
    CStr::from_ptr(ptr).to_bytes()
}

/// Borrow `count` elements of a C array
///
/// # Safety
///
/// `array` must be null or point to at least `count` initialised elements
/// that outlive `'a`.
unsafe fn c_array<'a, T>(array: *const T, count: c_int) -> &'a [T] {
    let len = checked_count(count);
    if array.is_null() || len == 0 {
        if array.is_null() && len > 0 {
            log::warn!("null array with {} elements treated as empty", len);
        }
        return &[];
    }
    std::slice::from_raw_parts(array, len)
}

/// Copy an array of C strings into owned byte strings
///
/// Null elements read as empty strings.
///
/// # Safety
///
/// `array` must be null or point to `count` pointers, each null or pointing
/// to a NUL-terminated string.
pub unsafe fn c_string_array_to_vec(array: *const *const c_char, count: c_int) -> Vec<Vec<u8>> {
    c_array(array, count)
        .iter()
        .map(|&item| c_string_bytes(item).to_vec())
        .collect()
}

/// Copy a C `int` array into a vector
///
/// # Safety
///
/// `array` must be null or point to `count` initialised `c_int`s.
pub unsafe fn c_int_array_to_vec(array: *const c_int, count: c_int) -> Vec<c_int> {
    c_array(array, count).to_vec()
}

/// Copy a C `float` array into a vector
///
/// # Safety
///
/// `array` must be null or point to `count` initialised `c_float`s.
pub unsafe fn c_float_array_to_vec(array: *const c_float, count: c_int) -> Vec<c_float> {
    c_array(array, count).to_vec()
}

/// Copy bytes into a new NUL-terminated C string
///
/// The bytes are copied verbatim; an embedded NUL truncates the string as
/// seen by C. Returns null if allocation fails.
/// Free with `boundary_free_c_string`.
pub fn bytes_to_c_string(bytes: &[u8]) -> *mut c_char {
    let ptr = heap::alloc_array::<c_char>(bytes.len() + 1);
    if ptr.is_null() {
        return ptr;
    }
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, ptr, bytes.len());
        ptr.add(bytes.len()).write(0);
    }
    ptr
}

/// Copy byte strings into a new C array of C strings
///
/// Returns null if any allocation fails; nothing is leaked in that case.
/// Free with `boundary_free_string_array(ptr, items.len())`.
pub fn strings_to_c_array<S: AsRef<[u8]>>(items: &[S]) -> *mut *mut c_char {
    let table = heap::alloc_array::<*mut c_char>(items.len());
    if table.is_null() {
        return table;
    }

    for (index, item) in items.iter().enumerate() {
        let string = bytes_to_c_string(item.as_ref());
        if string.is_null() {
            unsafe { free_string_table(table, index) };
            return ptr::null_mut();
        }
        unsafe { table.add(index).write(string) };
    }
    table
}

/// Copy values into a new C array
///
/// Free with the matching bare-array free entry point.
pub fn copy_to_c_array<T: Copy>(values: &[T]) -> *mut T {
    let ptr = heap::alloc_array::<T>(values.len());
    if !ptr.is_null() {
        unsafe { ptr::copy_nonoverlapping(values.as_ptr(), ptr, values.len()) };
    }
    ptr
}

/// Build a `StringArrayResult` envelope holding copies of `items`
///
/// Free with `boundary_free_string_array_result`.
pub fn strings_to_result<S: AsRef<[u8]>>(items: &[S]) -> *mut StringArrayResult {
    let Ok(count) = c_int::try_from(items.len()) else {
        log::warn!("{} strings do not fit in a c_int count", items.len());
        return ptr::null_mut();
    };
    let data = strings_to_c_array(items);
    if data.is_null() {
        return ptr::null_mut();
    }

    let result = heap::alloc_value(StringArrayResult {
        number_of_elements: count,
        data,
    });
    if result.is_null() {
        unsafe { free_string_table(data, items.len()) };
    }
    result
}

/// Build an `IntArrayResult` envelope holding a copy of `values`
///
/// Free with `boundary_free_int_array_result`.
pub fn ints_to_result(values: &[c_int]) -> *mut IntArrayResult {
    let Ok(count) = c_int::try_from(values.len()) else {
        return ptr::null_mut();
    };
    let data = copy_to_c_array(values);
    if data.is_null() {
        return ptr::null_mut();
    }

    let result = heap::alloc_value(IntArrayResult {
        number_of_elements: count,
        data,
    });
    if result.is_null() {
        unsafe { heap::release(data) };
    }
    result
}

/// Build a `FloatArrayResult` envelope holding a copy of `values`
///
/// Free with `boundary_free_float_array_result`.
pub fn floats_to_result(values: &[c_float]) -> *mut FloatArrayResult {
    let Ok(count) = c_int::try_from(values.len()) else {
        return ptr::null_mut();
    };
    let data = copy_to_c_array(values);
    if data.is_null() {
        return ptr::null_mut();
    }

    let result = heap::alloc_value(FloatArrayResult {
        number_of_elements: count,
        data,
    });
    if result.is_null() {
        unsafe { heap::release(data) };
    }
    result
}

/// Free the first `count` strings of a string table, then the table itself
///
/// # Safety
///
/// `table` must be null or come from [`strings_to_c_array`] with at least
/// `count` initialised entries, none of them freed yet.
pub unsafe fn free_string_table(table: *mut *mut c_char, count: usize) {
    if table.is_null() {
        return;
    }
    for index in 0..count {
        heap::release(*table.add(index));
    }
    heap::release(table);
}
