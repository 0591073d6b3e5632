//! The native entry-point set
//!
//! `NativeApi` lists every C-ABI entry point the managed side calls. It is
//! the injection point for the native counterpart:
//! - `Linked`: the `boundary-native` crate linked into this binary
//! - `NativeLibrary` (see `library`): the same entry points resolved from a
//!   shared library at an explicit path
//! - test doubles wrapping either of the above
//!
//! Every method forwards to the identically-named `boundary_*` symbol and has
//! that symbol's contract.

use boundary_native::{FloatArrayResult, IntArrayResult, StringArrayResult};
use std::os::raw::{c_char, c_float, c_int};

/// Fixed set of native entry points
///
/// Callers of each method must meet the contract of the C function it
/// forwards to, and must release every returned pointer exactly once with
/// the one matching free method.
///
/// # Safety
///
/// Safe handles dereference what an implementation returns, so an
/// implementation must guarantee, for inputs that meet the C contract:
///
/// - every non-null pointer it returns is a live allocation of the
///   documented shape that stays valid until passed to its free method
/// - `return_string` yields a NUL-terminated string
/// - `copy_*_array` yields at least `count` initialised elements, and the
///   string table's entries are each null or NUL-terminated
/// - a non-null envelope's `data` holds at least as many initialised
///   elements as were sent, string entries each null or NUL-terminated; its
///   count field may disagree, since the managed side rejects any count
///   other than the one it sent before reading `data`
/// - free methods accept exactly the pointers above, and nothing else is freed
pub unsafe trait NativeApi {
    unsafe fn print_string(&self, ptr: *const c_char);
    unsafe fn print_string_array(&self, array: *const *const c_char, count: c_int);
    unsafe fn print_int_array(&self, array: *const c_int, count: c_int);
    unsafe fn print_float_array(&self, array: *const c_float, count: c_int);

    unsafe fn return_string(&self, ptr: *const c_char) -> *mut c_char;
    unsafe fn return_string_array(
        &self,
        array: *const *const c_char,
        count: c_int,
    ) -> *mut StringArrayResult;
    unsafe fn return_int_array(&self, array: *const c_int, count: c_int) -> *mut IntArrayResult;
    unsafe fn return_float_array(
        &self,
        array: *const c_float,
        count: c_int,
    ) -> *mut FloatArrayResult;

    unsafe fn copy_string_array(&self, array: *const *const c_char, count: c_int)
        -> *mut *mut c_char;
    unsafe fn copy_int_array(&self, array: *const c_int, count: c_int) -> *mut c_int;
    unsafe fn copy_float_array(&self, array: *const c_float, count: c_int) -> *mut c_float;

    unsafe fn free_c_string(&self, ptr: *mut c_char);
    unsafe fn free_string_array(&self, array: *mut *mut c_char, count: c_int);
    unsafe fn free_int_array(&self, ptr: *mut c_int);
    unsafe fn free_float_array(&self, ptr: *mut c_float);
    unsafe fn free_string_array_result(&self, result: *mut StringArrayResult);
    unsafe fn free_int_array_result(&self, result: *mut IntArrayResult);
    unsafe fn free_float_array_result(&self, result: *mut FloatArrayResult);

    /// Native allocations made by the calling thread and not yet freed
    fn outstanding_allocations(&self) -> isize;
}

/// The native counterpart linked into this binary
#[derive(Debug, Clone, Copy, Default)]
pub struct Linked;

unsafe impl NativeApi for Linked {
    unsafe fn print_string(&self, ptr: *const c_char) {
        boundary_native::boundary_print_string(ptr)
    }

    unsafe fn print_string_array(&self, array: *const *const c_char, count: c_int) {
        boundary_native::boundary_print_string_array(array, count)
    }

    unsafe fn print_int_array(&self, array: *const c_int, count: c_int) {
        boundary_native::boundary_print_int_array(array, count)
    }

    unsafe fn print_float_array(&self, array: *const c_float, count: c_int) {
        boundary_native::boundary_print_float_array(array, count)
    }

    unsafe fn return_string(&self, ptr: *const c_char) -> *mut c_char {
        boundary_native::boundary_return_string(ptr)
    }

    unsafe fn return_string_array(
        &self,
        array: *const *const c_char,
        count: c_int,
    ) -> *mut StringArrayResult {
        boundary_native::boundary_return_string_array(array, count)
    }

    unsafe fn return_int_array(&self, array: *const c_int, count: c_int) -> *mut IntArrayResult {
        boundary_native::boundary_return_int_array(array, count)
    }

    unsafe fn return_float_array(
        &self,
        array: *const c_float,
        count: c_int,
    ) -> *mut FloatArrayResult {
        boundary_native::boundary_return_float_array(array, count)
    }

    unsafe fn copy_string_array(
        &self,
        array: *const *const c_char,
        count: c_int,
    ) -> *mut *mut c_char {
        boundary_native::boundary_copy_string_array(array, count)
    }

    unsafe fn copy_int_array(&self, array: *const c_int, count: c_int) -> *mut c_int {
        boundary_native::boundary_copy_int_array(array, count)
    }

    unsafe fn copy_float_array(&self, array: *const c_float, count: c_int) -> *mut c_float {
        boundary_native::boundary_copy_float_array(array, count)
    }

    unsafe fn free_c_string(&self, ptr: *mut c_char) {
        boundary_native::boundary_free_c_string(ptr)
    }

    unsafe fn free_string_array(&self, array: *mut *mut c_char, count: c_int) {
        boundary_native::boundary_free_string_array(array, count)
    }

    unsafe fn free_int_array(&self, ptr: *mut c_int) {
        boundary_native::boundary_free_int_array(ptr)
    }

    unsafe fn free_float_array(&self, ptr: *mut c_float) {
        boundary_native::boundary_free_float_array(ptr)
    }

    unsafe fn free_string_array_result(&self, result: *mut StringArrayResult) {
        boundary_native::boundary_free_string_array_result(result)
    }

    unsafe fn free_int_array_result(&self, result: *mut IntArrayResult) {
        boundary_native::boundary_free_int_array_result(result)
    }

    unsafe fn free_float_array_result(&self, result: *mut FloatArrayResult) {
        boundary_native::boundary_free_float_array_result(result)
    }

    fn outstanding_allocations(&self) -> isize {
        boundary_native::boundary_outstanding_allocations()
    }
}

/// Shared references forward to the referenced implementation
unsafe impl<N: NativeApi + ?Sized> NativeApi for &N {
    unsafe fn print_string(&self, ptr: *const c_char) {
        (**self).print_string(ptr)
    }

    unsafe fn print_string_array(&self, array: *const *const c_char, count: c_int) {
        (**self).print_string_array(array, count)
    }

    unsafe fn print_int_array(&self, array: *const c_int, count: c_int) {
        (**self).print_int_array(array, count)
    }

    unsafe fn print_float_array(&self, array: *const c_float, count: c_int) {
        (**self).print_float_array(array, count)
    }

    unsafe fn return_string(&self, ptr: *const c_char) -> *mut c_char {
        (**self).return_string(ptr)
    }

    unsafe fn return_string_array(
        &self,
        array: *const *const c_char,
        count: c_int,
    ) -> *mut StringArrayResult {
        (**self).return_string_array(array, count)
    }

    unsafe fn return_int_array(&self, array: *const c_int, count: c_int) -> *mut IntArrayResult {
        (**self).return_int_array(array, count)
    }

    unsafe fn return_float_array(
        &self,
        array: *const c_float,
        count: c_int,
    ) -> *mut FloatArrayResult {
        (**self).return_float_array(array, count)
    }

    unsafe fn copy_string_array(
        &self,
        array: *const *const c_char,
        count: c_int,
    ) -> *mut *mut c_char {
        (**self).copy_string_array(array, count)
    }

    unsafe fn copy_int_array(&self, array: *const c_int, count: c_int) -> *mut c_int {
        (**self).copy_int_array(array, count)
    }

    unsafe fn copy_float_array(&self, array: *const c_float, count: c_int) -> *mut c_float {
        (**self).copy_float_array(array, count)
    }

    unsafe fn free_c_string(&self, ptr: *mut c_char) {
        (**self).free_c_string(ptr)
    }

    unsafe fn free_string_array(&self, array: *mut *mut c_char, count: c_int) {
        (**self).free_string_array(array, count)
    }

    unsafe fn free_int_array(&self, ptr: *mut c_int) {
        (**self).free_int_array(ptr)
    }

    unsafe fn free_float_array(&self, ptr: *mut c_float) {
        (**self).free_float_array(ptr)
    }

    unsafe fn free_string_array_result(&self, result: *mut StringArrayResult) {
        (**self).free_string_array_result(result)
    }

    unsafe fn free_int_array_result(&self, result: *mut IntArrayResult) {
        (**self).free_int_array_result(result)
    }

    unsafe fn free_float_array_result(&self, result: *mut FloatArrayResult) {
        (**self).free_float_array_result(result)
    }

    fn outstanding_allocations(&self) -> isize {
        (**self).outstanding_allocations()
    }
}
