//! Print commands - the native side writes its own view of the input

use anyhow::{Context, Result};
use boundary_core::{
    prepare_float_array, prepare_int_array, prepare_string_array, Boundary, NativeApi,
};

pub fn string<N: NativeApi>(boundary: &Boundary<N>, text: &str) {
    boundary.print_string(text);
}

pub fn strings<N: NativeApi>(boundary: &Boundary<N>, items: &[String]) -> Result<()> {
    let buffer = prepare_string_array(items).context("Failed to encode string array")?;
    boundary.print_string_array(&buffer);
    Ok(())
}

pub fn ints<N: NativeApi>(boundary: &Boundary<N>, values: &[i64]) -> Result<()> {
    let buffer = prepare_int_array(values).context("Failed to encode int array")?;
    boundary.print_int_array(&buffer);
    Ok(())
}

pub fn floats<N: NativeApi>(boundary: &Boundary<N>, values: &[f64]) -> Result<()> {
    let buffer = prepare_float_array(values).context("Failed to encode float array")?;
    boundary.print_float_array(&buffer);
    Ok(())
}
