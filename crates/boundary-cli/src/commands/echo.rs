//! Echo commands - round-trip values through the native side

use anyhow::{Context, Result};
use boundary_core::{Boundary, NativeApi};

pub fn string<N: NativeApi>(boundary: &Boundary<N>, text: &str) -> Result<()> {
    let echoed = boundary.echo_string(text).context("String echo failed")?;
    println!("{}", echoed);
    Ok(())
}

pub fn strings<N: NativeApi>(boundary: &Boundary<N>, items: &[String]) -> Result<()> {
    let echoed = boundary
        .round_trip_strings(items)
        .context("String array echo failed")?;
    for item in echoed {
        println!("{}", item);
    }
    Ok(())
}

pub fn ints<N: NativeApi>(boundary: &Boundary<N>, values: &[i64]) -> Result<()> {
    let echoed = boundary
        .round_trip_ints(values)
        .context("Int array echo failed")?;
    for value in echoed {
        println!("{}", value);
    }
    Ok(())
}

pub fn floats<N: NativeApi>(boundary: &Boundary<N>, values: &[f64]) -> Result<()> {
    let echoed = boundary
        .round_trip_floats(values)
        .context("Float array echo failed")?;
    for value in echoed {
        // Widened from c_float; print at the precision that crossed
        println!("{}", value as f32);
    }
    Ok(())
}
