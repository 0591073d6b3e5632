//! Boundary context and round-trip helpers
//!
//! `Boundary` owns the native implementation and the marshaling options;
//! every boundary operation goes through it. Helpers compose
//! encode → native entry point → decode → free:
//! - `echo_*`: call the envelope-returning echo and decode the result
//! - `round_trip_*`: encode managed values, then echo them
//! - `print_*`: hand a buffer to the native printer; nothing comes back
//! - `return_*` / `copy_*`: return the native-owned handle itself
//!
//! Inputs are always borrowed. No helper frees, or can free, a buffer the
//! caller owns.

use crate::decode::loss_log_level;
use crate::encode::{
    prepare_float_array, prepare_int_array, prepare_string, prepare_string_array, CStringBuffer,
    EncodedArray, FloatArrayBuffer, IntArrayBuffer, MarshalContext, StringArrayBuffer,
};
use crate::envelope::{
    Envelope, FloatElements, IntElements, NativeFloatArray, NativeIntArray, NativeString,
    NativeStringArray, StringElements,
};
use crate::error::MarshalResult;
use crate::native::NativeApi;
use crate::types::{ElementKind, TextLike, Value};
use boundary_config::{LossLevel, Settings};
use log::Level;

/// Marshaling behaviour
///
/// Envelope counts are always checked against the count sent; that is not
/// an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarshalOptions {
    /// How lossy string decodes are reported
    pub decode_loss: LossLevel,
}

impl MarshalOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            decode_loss: settings.decode_loss,
        }
    }

    pub fn loss_level(&self) -> Option<Level> {
        loss_log_level(self.decode_loss)
    }
}

/// Marshaling context bound to one native implementation
///
/// # Example
///
/// ```
/// use boundary_core::{prepare_int_array, Boundary, Linked};
///
/// let boundary = Boundary::new(Linked);
///
/// assert_eq!(boundary.echo_string("hello").unwrap(), "hello");
///
/// let input = prepare_int_array(&[1, 2, 3]).unwrap();
/// assert_eq!(boundary.echo_int_array(&input).unwrap(), vec![1, 2, 3]);
///
/// // Every native allocation has been released
/// assert_eq!(boundary.outstanding_allocations(), 0);
/// ```
#[derive(Debug)]
pub struct Boundary<N: NativeApi> {
    native: N,
    options: MarshalOptions,
}

impl<N: NativeApi> Boundary<N> {
    pub fn new(native: N) -> Self {
        Self::with_options(native, MarshalOptions::default())
    }

    pub fn with_options(native: N, options: MarshalOptions) -> Self {
        Self { native, options }
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    pub fn options(&self) -> &MarshalOptions {
        &self.options
    }

    /// Native allocations made by this thread and not yet freed
    pub fn outstanding_allocations(&self) -> isize {
        self.native.outstanding_allocations()
    }

    // ========== Echo ==========

    /// Send a string to the native side and read back its copy
    ///
    /// Bytes after an embedded NUL are not seen by the native side and do
    /// not come back.
    pub fn echo_string<'a>(&self, text: impl Into<TextLike<'a>>) -> MarshalResult<String> {
        let buffer = prepare_string(text);
        Ok(self.return_string(&buffer)?.into_string()?)
    }

    pub fn echo_string_array(&self, buffer: &StringArrayBuffer) -> MarshalResult<Vec<String>> {
        let envelope = self.return_string_array(buffer)?;
        Ok(envelope.into_vec()?)
    }

    /// Echo an int array through its result envelope
    ///
    /// Only `c_int` buffers are accepted:
    ///
    /// ```compile_fail
    /// use boundary_core::{prepare_string_array, Boundary, Linked};
    ///
    /// let boundary = Boundary::new(Linked);
    /// let strings = prepare_string_array(["1", "2"]).unwrap();
    /// boundary.echo_int_array(&strings).unwrap();
    /// ```
    pub fn echo_int_array(&self, buffer: &IntArrayBuffer) -> MarshalResult<Vec<i64>> {
        let envelope = self.return_int_array(buffer)?;
        Ok(envelope.into_vec()?)
    }

    pub fn echo_float_array(&self, buffer: &FloatArrayBuffer) -> MarshalResult<Vec<f64>> {
        let envelope = self.return_float_array(buffer)?;
        Ok(envelope.into_vec()?)
    }

    // ========== Round trips ==========

    pub fn round_trip_strings<'a, I>(&self, items: I) -> MarshalResult<Vec<String>>
    where
        I: IntoIterator,
        I::Item: Into<TextLike<'a>>,
    {
        self.echo_string_array(&prepare_string_array(items)?)
    }

    pub fn round_trip_ints(&self, values: &[i64]) -> MarshalResult<Vec<i64>> {
        self.echo_int_array(&prepare_int_array(values)?)
    }

    /// Floats come back at single precision
    pub fn round_trip_floats(&self, values: &[f64]) -> MarshalResult<Vec<f64>> {
        self.echo_float_array(&prepare_float_array(values)?)
    }

    /// Encode values of a runtime-chosen kind and echo them
    ///
    /// Text and bytes both come back as `Value::Text`.
    pub fn round_trip_values(
        &self,
        values: &[Value],
        kind: ElementKind,
    ) -> MarshalResult<Vec<Value>> {
        let echoed = match MarshalContext::new().encode(values, kind)? {
            EncodedArray::Text(buffer) => self
                .echo_string_array(&buffer)?
                .into_iter()
                .map(Value::Text)
                .collect(),
            EncodedArray::Int(buffer) => self
                .echo_int_array(&buffer)?
                .into_iter()
                .map(Value::Int)
                .collect(),
            EncodedArray::Float(buffer) => self
                .echo_float_array(&buffer)?
                .into_iter()
                .map(Value::Float)
                .collect(),
        };
        Ok(echoed)
    }

    // ========== Print ==========

    pub fn print_string<'a>(&self, text: impl Into<TextLike<'a>>) {
        let buffer = prepare_string(text);
        log::debug!("boundary_print_string({} bytes)", buffer.len());
        unsafe { self.native.print_string(buffer.as_ptr()) }
    }

    pub fn print_string_array(&self, buffer: &StringArrayBuffer) {
        log::debug!("boundary_print_string_array({} elements)", buffer.count());
        unsafe { self.native.print_string_array(buffer.as_ptr(), buffer.count()) }
    }

    pub fn print_int_array(&self, buffer: &IntArrayBuffer) {
        log::debug!("boundary_print_int_array({} elements)", buffer.count());
        unsafe { self.native.print_int_array(buffer.as_ptr(), buffer.count()) }
    }

    pub fn print_float_array(&self, buffer: &FloatArrayBuffer) {
        log::debug!("boundary_print_float_array({} elements)", buffer.count());
        unsafe { self.native.print_float_array(buffer.as_ptr(), buffer.count()) }
    }

    // ========== Native-owned results ==========

    /// Natively-allocated copy of `buffer`
    pub fn return_string(&self, buffer: &CStringBuffer) -> MarshalResult<NativeString<'_, N>> {
        log::debug!("boundary_return_string({} bytes)", buffer.len());
        let string = unsafe {
            let ptr = self.native.return_string(buffer.as_ptr());
            NativeString::from_raw(&self.native, ptr)?
        };
        Ok(string.with_loss_level(self.options.loss_level()))
    }

    pub fn return_string_array(
        &self,
        buffer: &StringArrayBuffer,
    ) -> MarshalResult<Envelope<'_, N, StringElements>> {
        log::debug!("boundary_return_string_array({} elements)", buffer.count());
        let envelope = unsafe {
            let raw = self
                .native
                .return_string_array(buffer.as_ptr(), buffer.count());
            Envelope::<N, StringElements>::from_raw(&self.native, raw, buffer.len())?
        };
        Ok(envelope.with_loss_level(self.options.loss_level()))
    }

    pub fn return_int_array(
        &self,
        buffer: &IntArrayBuffer,
    ) -> MarshalResult<Envelope<'_, N, IntElements>> {
        log::debug!("boundary_return_int_array({} elements)", buffer.count());
        Ok(unsafe {
            let raw = self.native.return_int_array(buffer.as_ptr(), buffer.count());
            Envelope::<N, IntElements>::from_raw(&self.native, raw, buffer.len())?
        })
    }

    pub fn return_float_array(
        &self,
        buffer: &FloatArrayBuffer,
    ) -> MarshalResult<Envelope<'_, N, FloatElements>> {
        log::debug!("boundary_return_float_array({} elements)", buffer.count());
        Ok(unsafe {
            let raw = self
                .native
                .return_float_array(buffer.as_ptr(), buffer.count());
            Envelope::<N, FloatElements>::from_raw(&self.native, raw, buffer.len())?
        })
    }

    /// Natively-allocated bare copy of a string array
    pub fn copy_string_array(
        &self,
        buffer: &StringArrayBuffer,
    ) -> MarshalResult<NativeStringArray<'_, N>> {
        log::debug!("boundary_copy_string_array({} elements)", buffer.count());
        let array = unsafe {
            let ptr = self
                .native
                .copy_string_array(buffer.as_ptr(), buffer.count());
            NativeStringArray::from_raw(&self.native, ptr, buffer.count())?
        };
        Ok(array.with_loss_level(self.options.loss_level()))
    }

    pub fn copy_int_array(&self, buffer: &IntArrayBuffer) -> MarshalResult<NativeIntArray<'_, N>> {
        log::debug!("boundary_copy_int_array({} elements)", buffer.count());
        Ok(unsafe {
            let ptr = self.native.copy_int_array(buffer.as_ptr(), buffer.count());
            NativeIntArray::from_raw(&self.native, ptr, buffer.len())?
        })
    }

    pub fn copy_float_array(
        &self,
        buffer: &FloatArrayBuffer,
    ) -> MarshalResult<NativeFloatArray<'_, N>> {
        log::debug!("boundary_copy_float_array({} elements)", buffer.count());
        Ok(unsafe {
            let ptr = self.native.copy_float_array(buffer.as_ptr(), buffer.count());
            NativeFloatArray::from_raw(&self.native, ptr, buffer.len())?
        })
    }
}
