//! C heap allocation with live-allocation accounting
//!
//! Every allocation the native side hands across the boundary goes through
//! [`alloc_array`] / [`alloc_value`] and is returned through [`release`].
//!
//! Accounting is per thread: a buffer or envelope is only ever allocated and
//! freed by the thread that received it, so a thread's balance returns to its
//! starting value once everything it was handed has been freed. The counter
//! is for leak checks only and drives no ownership decision.

use std::cell::Cell;
use std::os::raw::c_void;

thread_local! {
    static OUTSTANDING: Cell<isize> = const { Cell::new(0) };
}

/// Allocate an uninitialised C array of `len` elements
///
/// Zero-length requests still allocate one slot so the returned pointer is
/// never null on success and can always be handed back to a free function.
/// Returns null if the size overflows or `malloc` fails.
pub fn alloc_array<T>(len: usize) -> *mut T {
    let slots = len.max(1);
    let Some(bytes) = slots.checked_mul(std::mem::size_of::<T>()) else {
        log::warn!("native allocation of {} elements overflows", len);
        return std::ptr::null_mut();
    };

    // malloc's alignment covers every element type that crosses the boundary
    let ptr = unsafe { libc::malloc(bytes) } as *mut T;
    if ptr.is_null() {
        log::warn!("native allocation of {} bytes failed", bytes);
    } else {
        OUTSTANDING.with(|count| count.set(count.get() + 1));
        log::trace!("native alloc {:p} ({} bytes)", ptr, bytes);
    }
    ptr
}

/// Allocate a single value on the C heap
pub fn alloc_value<T>(value: T) -> *mut T {
    let ptr = alloc_array::<T>(1);
    if !ptr.is_null() {
        unsafe { ptr.write(value) };
    }
    ptr
}

/// Return an allocation to the C heap
///
/// Null pointers are ignored.
///
/// # Safety
///
/// `ptr` must be null or come from [`alloc_array`] / [`alloc_value`] and must
/// not have been released already.
pub unsafe fn release<T>(ptr: *mut T) {
    if ptr.is_null() {
        return;
    }
    log::trace!("native free {:p}", ptr);
    libc::free(ptr as *mut c_void);
    OUTSTANDING.with(|count| count.set(count.get() - 1));
}

/// Number of native allocations made by the calling thread and not yet released
pub fn outstanding() -> isize {
    OUTSTANDING.with(Cell::get)
}
