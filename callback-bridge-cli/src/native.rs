//! Native callbacks loaded from dynamic libraries
//!
//! The library must export a C ABI function:
//!
//! ```c
//! int32_t on_numbers(const int32_t *values, size_t len);
//! ```
//!
//! A return value of 0 means success; anything else is reported as a callback
//! failure carrying the status code.

use crate::callbacks::integer_args;
use anyhow::{Context, Result};
use callback_bridge::{HostException, HostFunction, HostValue};
use libloading::Library;
use std::path::Path;
use std::sync::Arc;

type RawCallback = unsafe extern "C" fn(values: *const i32, len: usize) -> i32;

/// A resolved native function together with the library that owns it
struct NativeCallback {
    // Must outlive `func`
    _library: Library,
    func: RawCallback,
}

impl NativeCallback {
    fn call(&self, values: &[i32]) -> i32 {
        // SAFETY: the pointer and length describe a live slice for the
        // duration of the call, and `_library` keeps the code mapped.
        unsafe { (self.func)(values.as_ptr(), values.len()) }
    }
}

/// Load `symbol` from the library at `path` as a host function
pub fn load_native_callback(path: &Path, symbol: &str) -> Result<HostFunction> {
    log::info!("Loading native callback '{}' from {:?}", symbol, path);

    // SAFETY: loading runs the library's initializers; the path comes from
    // the user's own configuration.
    let library = unsafe { Library::new(path) }
        .with_context(|| format!("Failed to load callback library: {:?}", path))?;

    // SAFETY: the exported symbol is required to have the `RawCallback`
    // signature documented above.
    let func: RawCallback = unsafe {
        let sym = library
            .get::<RawCallback>(symbol.as_bytes())
            .with_context(|| format!("Symbol '{}' not found in {:?}", symbol, path))?;
        *sym
    };

    let native = Arc::new(NativeCallback {
        _library: library,
        func,
    });

    Ok(HostFunction::new(symbol, move |_, args| {
        let values = integer_args(args)?
            .into_iter()
            .map(i32::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| HostException::new("RangeError: value does not fit in 32 bits"))?;

        match native.call(&values) {
            0 => Ok(HostValue::Int32(0)),
            status => Err(HostException::new(format!(
                "native callback returned status {}",
                status
            ))),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library() {
        let err = load_native_callback(Path::new("/nonexistent/libcb.so"), "on_numbers")
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load callback library"));
    }
}
