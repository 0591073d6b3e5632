//! Shared test utilities
//!
//! `FaultyNative` wraps the linked native counterpart, counts allocating and
//! freeing calls made by the managed side, and can corrupt results the way a
//! misbehaving native library would.

#![allow(dead_code)]

use boundary_core::{Linked, NativeApi};
use boundary_native::{FloatArrayResult, IntArrayResult, StringArrayResult};
use std::cell::Cell;
use std::os::raw::{c_char, c_float, c_int};
use std::ptr;

// Re-export testing utilities
pub use pretty_assertions::assert_eq;

/// Fault-injecting test double over [`Linked`]
#[derive(Debug, Default)]
pub struct FaultyNative {
    inner: Linked,
    null_element_at: Option<usize>,
    int_count_override: Option<c_int>,
    null_envelopes: bool,
    allocations: Cell<usize>,
    frees: Cell<usize>,
}

impl FaultyNative {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace string envelope element `index` with a null pointer
    pub fn with_null_element_at(mut self, index: usize) -> Self {
        self.null_element_at = Some(index);
        self
    }

    /// Report `count` in every int envelope instead of the real count
    pub fn with_int_count(mut self, count: c_int) -> Self {
        self.int_count_override = Some(count);
        self
    }

    /// Return null instead of every envelope
    pub fn with_null_envelopes(mut self) -> Self {
        self.null_envelopes = true;
        self
    }

    /// Non-null results handed to the managed side
    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    /// Free calls made by the managed side with a non-null pointer
    pub fn frees(&self) -> usize {
        self.frees.get()
    }

    fn allocated<T>(&self, ptr: *mut T) -> *mut T {
        if !ptr.is_null() {
            self.allocations.set(self.allocations.get() + 1);
        }
        ptr
    }

    fn freeing<T>(&self, ptr: *mut T) {
        if !ptr.is_null() {
            self.frees.set(self.frees.get() + 1);
        }
    }
}

// SAFETY: faults stay within the `NativeApi` contract. Elements are nulled
// (and freed) rather than dangling, int envelope counts may be misreported but
// `data` still holds everything that was sent, and a null envelope is only
// returned after the real one has been freed.
unsafe impl NativeApi for FaultyNative {
    unsafe fn print_string(&self, ptr: *const c_char) {
        self.inner.print_string(ptr)
    }

    unsafe fn print_string_array(&self, array: *const *const c_char, count: c_int) {
        self.inner.print_string_array(array, count)
    }

    unsafe fn print_int_array(&self, array: *const c_int, count: c_int) {
        self.inner.print_int_array(array, count)
    }

    unsafe fn print_float_array(&self, array: *const c_float, count: c_int) {
        self.inner.print_float_array(array, count)
    }

    unsafe fn return_string(&self, ptr: *const c_char) -> *mut c_char {
        self.allocated(self.inner.return_string(ptr))
    }

    unsafe fn return_string_array(
        &self,
        array: *const *const c_char,
        count: c_int,
    ) -> *mut StringArrayResult {
        let result = self.inner.return_string_array(array, count);
        if self.null_envelopes {
            self.inner.free_string_array_result(result);
            return ptr::null_mut();
        }
        if let Some(index) = self.null_element_at {
            let envelope = &mut *result;
            if index < envelope.number_of_elements as usize {
                let slot = envelope.data.add(index);
                self.inner.free_c_string(*slot);
                *slot = ptr::null_mut();
            }
        }
        self.allocated(result)
    }

    unsafe fn return_int_array(&self, array: *const c_int, count: c_int) -> *mut IntArrayResult {
        let result = self.inner.return_int_array(array, count);
        if self.null_envelopes {
            self.inner.free_int_array_result(result);
            return ptr::null_mut();
        }
        if let Some(reported) = self.int_count_override {
            (*result).number_of_elements = reported;
        }
        self.allocated(result)
    }

    unsafe fn return_float_array(
        &self,
        array: *const c_float,
        count: c_int,
    ) -> *mut FloatArrayResult {
        let result = self.inner.return_float_array(array, count);
        if self.null_envelopes {
            self.inner.free_float_array_result(result);
            return ptr::null_mut();
        }
        self.allocated(result)
    }

    unsafe fn copy_string_array(
        &self,
        array: *const *const c_char,
        count: c_int,
    ) -> *mut *mut c_char {
        self.allocated(self.inner.copy_string_array(array, count))
    }

    unsafe fn copy_int_array(&self, array: *const c_int, count: c_int) -> *mut c_int {
        self.allocated(self.inner.copy_int_array(array, count))
    }

    unsafe fn copy_float_array(&self, array: *const c_float, count: c_int) -> *mut c_float {
        self.allocated(self.inner.copy_float_array(array, count))
    }

    unsafe fn free_c_string(&self, ptr: *mut c_char) {
        self.freeing(ptr);
        self.inner.free_c_string(ptr)
    }

    unsafe fn free_string_array(&self, array: *mut *mut c_char, count: c_int) {
        self.freeing(array);
        self.inner.free_string_array(array, count)
    }

    unsafe fn free_int_array(&self, ptr: *mut c_int) {
        self.freeing(ptr);
        self.inner.free_int_array(ptr)
    }

    unsafe fn free_float_array(&self, ptr: *mut c_float) {
        self.freeing(ptr);
        self.inner.free_float_array(ptr)
    }

    unsafe fn free_string_array_result(&self, result: *mut StringArrayResult) {
        self.freeing(result);
        self.inner.free_string_array_result(result)
    }

    unsafe fn free_int_array_result(&self, result: *mut IntArrayResult) {
        self.freeing(result);
        self.inner.free_int_array_result(result)
    }

    unsafe fn free_float_array_result(&self, result: *mut FloatArrayResult) {
        self.freeing(result);
        self.inner.free_float_array_result(result)
    }

    fn outstanding_allocations(&self) -> isize {
        self.inner.outstanding_allocations()
    }
}

/// Assert two float sequences agree within `tolerance`
pub fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "element {}: expected {} ± {}, got {}",
            index,
            e,
            tolerance,
            a
        );
    }
}
