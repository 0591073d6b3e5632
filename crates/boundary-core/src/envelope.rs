//! Ownership handles for natively-allocated memory
//!
//! | Native allocation | Handle | Released by |
//! |---|---|---|
//! | single string | `NativeString` | `boundary_free_c_string` |
//! | bare string table + count | `NativeStringArray` | `boundary_free_string_array` |
//! | bare `c_int` array | `NativeIntArray` | `boundary_free_int_array` |
//! | bare `c_float` array | `NativeFloatArray` | `boundary_free_float_array` |
//! | result envelope | `Envelope<StringElements / IntElements / FloatElements>` | `boundary_free_*_array_result` |
//!
//! Each handle owns exactly one allocation and knows its one free function.
//! It frees on `Drop` unless consumed first; consuming decoders (`into_vec`,
//! `into_string`) and `free` take the handle by value, and handles are
//! neither `Clone` nor `Copy`, so a second free does not compile:
//!
//! ```compile_fail
//! use boundary_core::{prepare_int_array, Boundary, Linked};
//!
//! let boundary = Boundary::new(Linked);
//! let input = prepare_int_array(&[1, 2, 3]).unwrap();
//! let copy = boundary.copy_int_array(&input).unwrap();
//! copy.free();
//! copy.free();
//! ```
//!
//! Handles borrow the native implementation, so they cannot outlive the
//! library that allocated them. They hold raw pointers and are therefore
//! neither `Send` nor `Sync`.

use crate::decode::{
    decode_c_string, decode_float_elements, decode_int_elements, decode_string_elements,
    element_count,
};
use crate::error::ProtocolError;
use crate::native::NativeApi;
use boundary_native::{FloatArrayResult, IntArrayResult, StringArrayResult};
use log::Level;
use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_float, c_int};
use std::ptr::NonNull;

const DEFAULT_LOSS_LEVEL: Option<Level> = Some(Level::Warn);

/// Natively-allocated NUL-terminated string
pub struct NativeString<'n, N: NativeApi + ?Sized> {
    native: &'n N,
    ptr: NonNull<c_char>,
    loss_level: Option<Level>,
}

impl<'n, N: NativeApi + ?Sized> NativeString<'n, N> {
    /// Take ownership of a string returned by a native entry point
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a string allocated by `native` that nobody else
    /// will free.
    pub unsafe fn from_raw(native: &'n N, ptr: *mut c_char) -> Result<Self, ProtocolError> {
        let ptr = NonNull::new(ptr).ok_or(ProtocolError::NullString)?;
        Ok(Self {
            native,
            ptr,
            loss_level: DEFAULT_LOSS_LEVEL,
        })
    }

    /// Level at which lossy decodes are logged (`None` silences them)
    pub fn with_loss_level(mut self, level: Option<Level>) -> Self {
        self.loss_level = level;
        self
    }

    /// Bytes up to the terminator
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }.to_bytes()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode into a managed string and free the native one
    pub fn into_string(self) -> Result<String, ProtocolError> {
        unsafe { decode_c_string(self.ptr.as_ptr(), self.loss_level) }
    }

    /// Free now rather than at the end of scope
    pub fn free(self) {}
}

impl<N: NativeApi + ?Sized> Drop for NativeString<'_, N> {
    fn drop(&mut self) {
        unsafe { self.native.free_c_string(self.ptr.as_ptr()) }
    }
}

impl<N: NativeApi + ?Sized> fmt::Debug for NativeString<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeString")
            .field(&self.to_string_lossy())
            .finish()
    }
}

/// Natively-allocated table of `count` strings
///
/// The count is part of the free call, so the handle keeps it.
pub struct NativeStringArray<'n, N: NativeApi + ?Sized> {
    native: &'n N,
    ptr: NonNull<*mut c_char>,
    count: c_int,
    loss_level: Option<Level>,
}

impl<'n, N: NativeApi + ?Sized> NativeStringArray<'n, N> {
    /// Take ownership of a string table returned by a native entry point
    ///
    /// A non-null table is owned (and freed) even when the count is rejected.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a table of `count` strings allocated by `native`
    /// that nobody else will free.
    pub unsafe fn from_raw(
        native: &'n N,
        ptr: *mut *mut c_char,
        count: c_int,
    ) -> Result<Self, ProtocolError> {
        let len = usize::try_from(count).unwrap_or(0);
        let ptr = NonNull::new(ptr).ok_or(ProtocolError::NullData { count: len })?;
        let handle = Self {
            native,
            ptr,
            count,
            loss_level: DEFAULT_LOSS_LEVEL,
        };
        element_count(count, None)?;
        Ok(handle)
    }

    pub fn with_loss_level(mut self, level: Option<Level>) -> Self {
        self.loss_level = level;
        self
    }

    pub fn len(&self) -> usize {
        usize::try_from(self.count).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of element `index`; `None` past the end or for a null element
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len() {
            return None;
        }
        let element = unsafe { *self.ptr.as_ptr().add(index) };
        if element.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(element) }.to_bytes())
    }

    /// Decode every string and free the table
    pub fn into_vec(self) -> Result<Vec<String>, ProtocolError> {
        unsafe { decode_string_elements(self.ptr.as_ptr(), self.len(), self.loss_level) }
    }

    pub fn free(self) {}
}

impl<N: NativeApi + ?Sized> Drop for NativeStringArray<'_, N> {
    fn drop(&mut self) {
        unsafe { self.native.free_string_array(self.ptr.as_ptr(), self.count) }
    }
}

impl<N: NativeApi + ?Sized> fmt::Debug for NativeStringArray<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeStringArray")
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

/// Natively-allocated bare `c_int` array
pub struct NativeIntArray<'n, N: NativeApi + ?Sized> {
    native: &'n N,
    ptr: NonNull<c_int>,
    len: usize,
}

impl<'n, N: NativeApi + ?Sized> NativeIntArray<'n, N> {
    /// Take ownership of an int array returned by a native entry point
    ///
    /// # Safety
    ///
    /// `ptr` must be null or an array of at least `len` initialised `c_int`s
    /// allocated by `native` that nobody else will free.
    pub unsafe fn from_raw(
        native: &'n N,
        ptr: *mut c_int,
        len: usize,
    ) -> Result<Self, ProtocolError> {
        let ptr = NonNull::new(ptr).ok_or(ProtocolError::NullData { count: len })?;
        Ok(Self { native, ptr, len })
    }

    pub fn as_slice(&self) -> &[c_int] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Widen to `i64` and free the native array
    pub fn into_vec(self) -> Vec<i64> {
        self.as_slice().iter().map(|&i| i64::from(i)).collect()
    }

    pub fn free(self) {}
}

impl<N: NativeApi + ?Sized> Drop for NativeIntArray<'_, N> {
    fn drop(&mut self) {
        unsafe { self.native.free_int_array(self.ptr.as_ptr()) }
    }
}

impl<N: NativeApi + ?Sized> fmt::Debug for NativeIntArray<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeIntArray").field(&self.as_slice()).finish()
    }
}

/// Natively-allocated bare `c_float` array
pub struct NativeFloatArray<'n, N: NativeApi + ?Sized> {
    native: &'n N,
    ptr: NonNull<c_float>,
    len: usize,
}

impl<'n, N: NativeApi + ?Sized> NativeFloatArray<'n, N> {
    /// Take ownership of a float array returned by a native entry point
    ///
    /// # Safety
    ///
    /// `ptr` must be null or an array of at least `len` initialised
    /// `c_float`s allocated by `native` that nobody else will free.
    pub unsafe fn from_raw(
        native: &'n N,
        ptr: *mut c_float,
        len: usize,
    ) -> Result<Self, ProtocolError> {
        let ptr = NonNull::new(ptr).ok_or(ProtocolError::NullData { count: len })?;
        Ok(Self { native, ptr, len })
    }

    pub fn as_slice(&self) -> &[c_float] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Widen to `f64` and free the native array
    pub fn into_vec(self) -> Vec<f64> {
        self.as_slice().iter().map(|&f| f64::from(f)).collect()
    }

    pub fn free(self) {}
}

impl<N: NativeApi + ?Sized> Drop for NativeFloatArray<'_, N> {
    fn drop(&mut self) {
        unsafe { self.native.free_float_array(self.ptr.as_ptr()) }
    }
}

impl<N: NativeApi + ?Sized> fmt::Debug for NativeFloatArray<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeFloatArray").field(&self.as_slice()).finish()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Element kind of a result envelope
///
/// Ties each envelope layout to its decoder and its one free function.
pub trait EnvelopeKind: sealed::Sealed {
    /// `#[repr(C)]` envelope layout
    type Raw;
    /// Managed element type
    type Element;

    #[doc(hidden)]
    fn reported_count(raw: &Self::Raw) -> c_int;

    #[doc(hidden)]
    unsafe fn decode(
        raw: &Self::Raw,
        count: usize,
        loss_level: Option<Level>,
    ) -> Result<Vec<Self::Element>, ProtocolError>;

    #[doc(hidden)]
    unsafe fn free<N: NativeApi + ?Sized>(native: &N, raw: *mut Self::Raw);
}

/// Envelope of strings (`StringArrayResult`)
#[derive(Debug)]
pub enum StringElements {}

/// Envelope of integers (`IntArrayResult`)
#[derive(Debug)]
pub enum IntElements {}

/// Envelope of floats (`FloatArrayResult`)
#[derive(Debug)]
pub enum FloatElements {}

impl sealed::Sealed for StringElements {}
impl sealed::Sealed for IntElements {}
impl sealed::Sealed for FloatElements {}

impl EnvelopeKind for StringElements {
    type Raw = StringArrayResult;
    type Element = String;

    fn reported_count(raw: &StringArrayResult) -> c_int {
        raw.number_of_elements
    }

    unsafe fn decode(
        raw: &StringArrayResult,
        count: usize,
        loss_level: Option<Level>,
    ) -> Result<Vec<String>, ProtocolError> {
        decode_string_elements(raw.data, count, loss_level)
    }

    unsafe fn free<N: NativeApi + ?Sized>(native: &N, raw: *mut StringArrayResult) {
        native.free_string_array_result(raw)
    }
}

impl EnvelopeKind for IntElements {
    type Raw = IntArrayResult;
    type Element = i64;

    fn reported_count(raw: &IntArrayResult) -> c_int {
        raw.number_of_elements
    }

    unsafe fn decode(
        raw: &IntArrayResult,
        count: usize,
        _loss_level: Option<Level>,
    ) -> Result<Vec<i64>, ProtocolError> {
        decode_int_elements(raw.data, count)
    }

    unsafe fn free<N: NativeApi + ?Sized>(native: &N, raw: *mut IntArrayResult) {
        native.free_int_array_result(raw)
    }
}

impl EnvelopeKind for FloatElements {
    type Raw = FloatArrayResult;
    type Element = f64;

    fn reported_count(raw: &FloatArrayResult) -> c_int {
        raw.number_of_elements
    }

    unsafe fn decode(
        raw: &FloatArrayResult,
        count: usize,
        _loss_level: Option<Level>,
    ) -> Result<Vec<f64>, ProtocolError> {
        decode_float_elements(raw.data, count)
    }

    unsafe fn free<N: NativeApi + ?Sized>(native: &N, raw: *mut FloatArrayResult) {
        native.free_float_array_result(raw)
    }
}

/// Natively-allocated result envelope
///
/// Envelope and data are released together by the kind's single free
/// function, once, whether decoding succeeds or fails. The envelope keeps the
/// number of elements that was sent; `data` is never read under any other
/// count.
pub struct Envelope<'n, N: NativeApi + ?Sized, K: EnvelopeKind> {
    native: &'n N,
    raw: NonNull<K::Raw>,
    sent: usize,
    loss_level: Option<Level>,
    _kind: PhantomData<K>,
}

impl<'n, N: NativeApi + ?Sized, K: EnvelopeKind> Envelope<'n, N, K> {
    /// Take ownership of an envelope returned by a native entry point that
    /// was sent `sent` elements
    ///
    /// # Safety
    ///
    /// `raw` must be null or an envelope of kind `K` allocated by `native`
    /// that nobody else will free, whose data holds at least `sent`
    /// initialised elements.
    pub unsafe fn from_raw(
        native: &'n N,
        raw: *mut K::Raw,
        sent: usize,
    ) -> Result<Self, ProtocolError> {
        let raw = NonNull::new(raw).ok_or(ProtocolError::NullEnvelope)?;
        Ok(Self {
            native,
            raw,
            sent,
            loss_level: DEFAULT_LOSS_LEVEL,
            _kind: PhantomData,
        })
    }

    pub fn with_loss_level(mut self, level: Option<Level>) -> Self {
        self.loss_level = level;
        self
    }

    /// Count as reported by the native side, unvalidated
    pub fn reported_count(&self) -> c_int {
        K::reported_count(self.raw())
    }

    /// Number of elements sent to the entry point that produced this envelope
    pub fn sent_count(&self) -> usize {
        self.sent
    }

    /// Decode the elements and free the envelope
    ///
    /// A reported count other than the number of elements sent is a
    /// `CountMismatch`. The envelope is freed on every path.
    pub fn into_vec(self) -> Result<Vec<K::Element>, ProtocolError> {
        let count = element_count(self.reported_count(), Some(self.sent))?;
        unsafe { K::decode(self.raw(), count, self.loss_level) }
    }

    pub fn free(self) {}

    fn raw(&self) -> &K::Raw {
        unsafe { self.raw.as_ref() }
    }
}

impl<N: NativeApi + ?Sized, K: EnvelopeKind> Drop for Envelope<'_, N, K> {
    fn drop(&mut self) {
        unsafe { K::free(self.native, self.raw.as_ptr()) }
    }
}

impl<N: NativeApi + ?Sized, K: EnvelopeKind> fmt::Debug for Envelope<'_, N, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("sent", &self.sent)
            .field("reported_count", &self.reported_count())
            .finish_non_exhaustive()
    }
}
