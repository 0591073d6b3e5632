//! Binding the native counterpart from a shared library
//!
//! `NativeLibrary` opens a library at an explicit path with `libloading` and
//! resolves the whole entry-point set up front. A library missing any symbol
//! is rejected at load time rather than at first call.
//!
//! No search is performed: the caller (configuration or CLI flag) supplies
//! the path.

use crate::error::LoadError;
use crate::native::NativeApi;
use boundary_native::{FloatArrayResult, IntArrayResult, StringArrayResult};
use libloading::Library;
use std::fmt;
use std::os::raw::{c_char, c_float, c_int};
use std::path::{Path, PathBuf};

type PrintStringFn = unsafe extern "C" fn(*const c_char);
type PrintStringArrayFn = unsafe extern "C" fn(*const *const c_char, c_int);
type PrintIntArrayFn = unsafe extern "C" fn(*const c_int, c_int);
type PrintFloatArrayFn = unsafe extern "C" fn(*const c_float, c_int);
type ReturnStringFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;
type ReturnStringArrayFn =
    unsafe extern "C" fn(*const *const c_char, c_int) -> *mut StringArrayResult;
type ReturnIntArrayFn = unsafe extern "C" fn(*const c_int, c_int) -> *mut IntArrayResult;
type ReturnFloatArrayFn = unsafe extern "C" fn(*const c_float, c_int) -> *mut FloatArrayResult;
type CopyStringArrayFn = unsafe extern "C" fn(*const *const c_char, c_int) -> *mut *mut c_char;
type CopyIntArrayFn = unsafe extern "C" fn(*const c_int, c_int) -> *mut c_int;
type CopyFloatArrayFn = unsafe extern "C" fn(*const c_float, c_int) -> *mut c_float;
type FreeCStringFn = unsafe extern "C" fn(*mut c_char);
type FreeStringArrayFn = unsafe extern "C" fn(*mut *mut c_char, c_int);
type FreeIntArrayFn = unsafe extern "C" fn(*mut c_int);
type FreeFloatArrayFn = unsafe extern "C" fn(*mut c_float);
type FreeStringArrayResultFn = unsafe extern "C" fn(*mut StringArrayResult);
type FreeIntArrayResultFn = unsafe extern "C" fn(*mut IntArrayResult);
type FreeFloatArrayResultFn = unsafe extern "C" fn(*mut FloatArrayResult);
type OutstandingAllocationsFn = unsafe extern "C" fn() -> isize;

/// Every symbol a native counterpart must export
pub const ENTRY_POINTS: [&str; 19] = [
    "boundary_print_string",
    "boundary_print_string_array",
    "boundary_print_int_array",
    "boundary_print_float_array",
    "boundary_return_string",
    "boundary_return_string_array",
    "boundary_return_int_array",
    "boundary_return_float_array",
    "boundary_copy_string_array",
    "boundary_copy_int_array",
    "boundary_copy_float_array",
    "boundary_free_c_string",
    "boundary_free_string_array",
    "boundary_free_int_array",
    "boundary_free_float_array",
    "boundary_free_string_array_result",
    "boundary_free_int_array_result",
    "boundary_free_float_array_result",
    "boundary_outstanding_allocations",
];

/// Resolved entry points; only valid while the owning `Library` is loaded
struct Symbols {
    print_string: PrintStringFn,
    print_string_array: PrintStringArrayFn,
    print_int_array: PrintIntArrayFn,
    print_float_array: PrintFloatArrayFn,
    return_string: ReturnStringFn,
    return_string_array: ReturnStringArrayFn,
    return_int_array: ReturnIntArrayFn,
    return_float_array: ReturnFloatArrayFn,
    copy_string_array: CopyStringArrayFn,
    copy_int_array: CopyIntArrayFn,
    copy_float_array: CopyFloatArrayFn,
    free_c_string: FreeCStringFn,
    free_string_array: FreeStringArrayFn,
    free_int_array: FreeIntArrayFn,
    free_float_array: FreeFloatArrayFn,
    free_string_array_result: FreeStringArrayResultFn,
    free_int_array_result: FreeIntArrayResultFn,
    free_float_array_result: FreeFloatArrayResultFn,
    outstanding_allocations: OutstandingAllocationsFn,
}

impl Symbols {
    /// # Safety
    ///
    /// The library's symbols must have the signatures declared above.
    unsafe fn resolve(library: &Library, path: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            print_string: symbol(library, path, "boundary_print_string")?,
            print_string_array: symbol(library, path, "boundary_print_string_array")?,
            print_int_array: symbol(library, path, "boundary_print_int_array")?,
            print_float_array: symbol(library, path, "boundary_print_float_array")?,
            return_string: symbol(library, path, "boundary_return_string")?,
            return_string_array: symbol(library, path, "boundary_return_string_array")?,
            return_int_array: symbol(library, path, "boundary_return_int_array")?,
            return_float_array: symbol(library, path, "boundary_return_float_array")?,
            copy_string_array: symbol(library, path, "boundary_copy_string_array")?,
            copy_int_array: symbol(library, path, "boundary_copy_int_array")?,
            copy_float_array: symbol(library, path, "boundary_copy_float_array")?,
            free_c_string: symbol(library, path, "boundary_free_c_string")?,
            free_string_array: symbol(library, path, "boundary_free_string_array")?,
            free_int_array: symbol(library, path, "boundary_free_int_array")?,
            free_float_array: symbol(library, path, "boundary_free_float_array")?,
            free_string_array_result: symbol(library, path, "boundary_free_string_array_result")?,
            free_int_array_result: symbol(library, path, "boundary_free_int_array_result")?,
            free_float_array_result: symbol(library, path, "boundary_free_float_array_result")?,
            outstanding_allocations: symbol(library, path, "boundary_outstanding_allocations")?,
        })
    }
}

/// Look up one function symbol and copy out its pointer
///
/// # Safety
///
/// `T` must match the symbol's actual signature.
unsafe fn symbol<T: Copy>(
    library: &Library,
    path: &Path,
    name: &'static str,
) -> Result<T, LoadError> {
    library
        .get::<T>(name.as_bytes())
        .map(|symbol| *symbol)
        .map_err(|_| LoadError::SymbolNotFound {
            path: path.to_path_buf(),
            symbol: name,
        })
}

/// Native counterpart loaded from a shared library
///
/// Handles returned through a `Boundary<NativeLibrary>` borrow it, so the
/// library cannot be unloaded while native memory is still outstanding.
pub struct NativeLibrary {
    symbols: Symbols,
    path: PathBuf,
    // Unloaded last; the function pointers above point into it
    _library: Library,
}

impl NativeLibrary {
    /// Load the library at `path` and resolve every entry point
    ///
    /// # Safety
    ///
    /// Loading runs the library's initialisers, and the library's exports
    /// named in [`ENTRY_POINTS`] must have the signatures of the
    /// `boundary-native` crate. Only load trusted builds of the counterpart.
    pub unsafe fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let library = Library::new(&path).map_err(|source| LoadError::LoadFailed {
            path: path.clone(),
            source,
        })?;
        let symbols = Symbols::resolve(&library, &path)?;

        log::debug!(
            "bound {} native entry points from {}",
            ENTRY_POINTS.len(),
            path.display()
        );
        Ok(Self {
            symbols,
            path,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// SAFETY: `open` requires the library to be a build of `boundary-native`
unsafe impl NativeApi for NativeLibrary {
    unsafe fn print_string(&self, ptr: *const c_char) {
        (self.symbols.print_string)(ptr)
    }

    unsafe fn print_string_array(&self, array: *const *const c_char, count: c_int) {
        (self.symbols.print_string_array)(array, count)
    }

    unsafe fn print_int_array(&self, array: *const c_int, count: c_int) {
        (self.symbols.print_int_array)(array, count)
    }

    unsafe fn print_float_array(&self, array: *const c_float, count: c_int) {
        (self.symbols.print_float_array)(array, count)
    }

    unsafe fn return_string(&self, ptr: *const c_char) -> *mut c_char {
        (self.symbols.return_string)(ptr)
    }

    unsafe fn return_string_array(
        &self,
        array: *const *const c_char,
        count: c_int,
    ) -> *mut StringArrayResult {
        (self.symbols.return_string_array)(array, count)
    }

    unsafe fn return_int_array(&self, array: *const c_int, count: c_int) -> *mut IntArrayResult {
        (self.symbols.return_int_array)(array, count)
    }

    unsafe fn return_float_array(
        &self,
        array: *const c_float,
        count: c_int,
    ) -> *mut FloatArrayResult {
        (self.symbols.return_float_array)(array, count)
    }

    unsafe fn copy_string_array(
        &self,
        array: *const *const c_char,
        count: c_int,
    ) -> *mut *mut c_char {
        (self.symbols.copy_string_array)(array, count)
    }

    unsafe fn copy_int_array(&self, array: *const c_int, count: c_int) -> *mut c_int {
        (self.symbols.copy_int_array)(array, count)
    }

    unsafe fn copy_float_array(&self, array: *const c_float, count: c_int) -> *mut c_float {
        (self.symbols.copy_float_array)(array, count)
    }

    unsafe fn free_c_string(&self, ptr: *mut c_char) {
        (self.symbols.free_c_string)(ptr)
    }

    unsafe fn free_string_array(&self, array: *mut *mut c_char, count: c_int) {
        (self.symbols.free_string_array)(array, count)
    }

    unsafe fn free_int_array(&self, ptr: *mut c_int) {
        (self.symbols.free_int_array)(ptr)
    }

    unsafe fn free_float_array(&self, ptr: *mut c_float) {
        (self.symbols.free_float_array)(ptr)
    }

    unsafe fn free_string_array_result(&self, result: *mut StringArrayResult) {
        (self.symbols.free_string_array_result)(result)
    }

    unsafe fn free_int_array_result(&self, result: *mut IntArrayResult) {
        (self.symbols.free_int_array_result)(result)
    }

    unsafe fn free_float_array_result(&self, result: *mut FloatArrayResult) {
        (self.symbols.free_float_array_result)(result)
    }

    fn outstanding_allocations(&self) -> isize {
        unsafe { (self.symbols.outstanding_allocations)() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library() {
        let result = unsafe { NativeLibrary::open("/nonexistent/libboundary_native_xyz.so") };
        match result {
            Err(LoadError::LoadFailed { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/libboundary_native_xyz.so"));
            }
            other => panic!("Expected LoadFailed, got {:?}", other),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_library_without_entry_points() {
        // libc loads fine but exports none of the boundary symbols
        let result = unsafe { NativeLibrary::open("libc.so.6") };
        match result {
            Err(LoadError::SymbolNotFound { symbol, .. }) => {
                assert_eq!(symbol, "boundary_print_string");
            }
            other => panic!("Expected SymbolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_points_unique() {
        let mut names = ENTRY_POINTS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ENTRY_POINTS.len());
    }
}
