//! Boundary: marshaling primitive collections across a C ABI
//!
//! The managed side of the boundary protocol. Managed strings, integers and
//! floats are encoded into flat buffers, handed to a native counterpart, and
//! any natively-allocated results are decoded back and released exactly once.
//!
//! - [`encode`]: managed values → boundary-safe buffers
//! - [`decode`]: native buffers → managed values
//! - [`envelope`]: ownership handles, one per native allocation shape
//! - [`native`] / [`library`]: the native entry-point set and its bindings
//! - [`boundary`]: the `Boundary` context and round-trip helpers
//!
//! # Ownership
//!
//! Buffers built by the encoders belong to the managed side and are only
//! borrowed by native calls. Everything the native side allocates is wrapped
//! in a handle that frees it with the one matching free function, on drop or
//! when consumed.
//!
//! # Example
//!
//! ```
//! use boundary_core::{Boundary, Linked};
//!
//! let boundary = Boundary::new(Linked);
//! let echoed = boundary.round_trip_strings(["alpha", "", "gamma"]).unwrap();
//! assert_eq!(echoed, vec!["alpha", "", "gamma"]);
//! ```

pub mod boundary;
pub mod decode;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod library;
pub mod native;
pub mod types;

pub use boundary::{Boundary, MarshalOptions};
pub use encode::{
    prepare_float_array, prepare_int_array, prepare_string, prepare_string_array, CStringBuffer,
    EncodedArray, FloatArrayBuffer, IntArrayBuffer, MarshalContext, StringArrayBuffer,
};
pub use envelope::{
    Envelope, EnvelopeKind, FloatElements, IntElements, NativeFloatArray, NativeIntArray,
    NativeString, NativeStringArray, StringElements,
};
pub use error::{
    DecodingLoss, EncodingError, LoadError, MarshalError, MarshalResult, ProtocolError,
};
pub use library::NativeLibrary;
pub use native::{Linked, NativeApi};
pub use types::{ElementKind, TextLike, Value};
