//! Callback construction
//!
//! Turns the `[callback]` configuration into a host function the bridge can
//! register: the built-in solver, a plain echo, or a native function loaded
//! from a dynamic library.

use crate::config::CallbackConfig;
use crate::native;
use crate::solver;
use anyhow::Result;
use callback_bridge::utils::print_array;
use callback_bridge::{HostException, HostFunction, HostValue};

/// Build the host function described by `config`
pub fn build_callback(config: &CallbackConfig) -> Result<HostFunction> {
    match config {
        CallbackConfig::Solver { target } => Ok(solver_callback(*target)),
        CallbackConfig::Echo => Ok(echo_callback()),
        CallbackConfig::Native { library, function } => {
            native::load_native_callback(library, function)
        }
    }
}

/// Callback that searches for an expression equal to `target`
pub fn solver_callback(target: i64) -> HostFunction {
    HostFunction::new("onNumbersReceived", move |_, args| {
        let numbers = integer_args(args)?;
        if numbers.len() > solver::MAX_NUMBERS {
            return Err(HostException::new(format!(
                "RangeError: the solver takes at most {} numbers, got {}",
                solver::MAX_NUMBERS,
                numbers.len()
            )));
        }
        println!("Callback invoked with {:?}", numbers);

        match solver::solve(&numbers, target) {
            Some(expr) => {
                println!("  Found: {} = {}", expr, target);
                Ok(HostValue::String(expr))
            }
            None => {
                println!("  No expression equals {}", target);
                Ok(HostValue::Null)
            }
        }
    })
}

/// Callback that prints the numbers it receives
pub fn echo_callback() -> HostFunction {
    HostFunction::new("echo", |_, args| {
        let numbers = integer_args(args)?;
        let narrowed: Vec<i32> = numbers
            .iter()
            .map(|&n| i32::try_from(n))
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| HostException::new("RangeError: value does not fit in 32 bits"))?;
        print_array(&narrowed);
        Ok(HostValue::Undefined)
    })
}

/// Read the single array-of-integers argument the bridge passes
pub fn integer_args(args: &[HostValue]) -> std::result::Result<Vec<i64>, HostException> {
    let array = args
        .first()
        .and_then(HostValue::as_array)
        .ok_or_else(|| HostException::new("TypeError: expected an array argument"))?;

    array
        .iter()
        .map(|v| {
            v.as_i64().ok_or_else(|| {
                HostException::new(format!("TypeError: expected an integer, got {}", v.type_name()))
            })
        })
        .collect()
}
