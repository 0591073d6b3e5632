//! Native counterpart of the boundary marshaling protocol
//!
//! Exposes a fixed set of C-ABI entry points that a managed caller uses to
//! exchange strings, `c_int` arrays and `c_float` arrays:
//! - Print entry points (`boundary_print_*`) that show the native view of a buffer
//! - Echo entry points (`boundary_return_*`) that copy a buffer into a
//!   natively-allocated result envelope
//! - Raw copy entry points (`boundary_copy_*`) that return bare native arrays
//! - Exactly one free entry point per allocation shape (`boundary_free_*`)
//!
//! # Ownership
//!
//! Everything returned by this library is allocated on the C heap and must be
//! released by the matching `boundary_free_*` function, never by another free
//! function and never twice. Buffers passed *into* this library stay owned by
//! the caller; no entry point frees its inputs.
//!
//! # Instrumentation
//!
//! [`heap`] counts live allocations so tests can verify that every allocation
//! was paired with exactly one free (`boundary_outstanding_allocations`).

pub mod abi;
pub mod convert;
pub mod exports;
pub mod heap;

pub use abi::{FloatArrayResult, IntArrayResult, StringArrayResult};
pub use exports::*;
