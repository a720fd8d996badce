//! Integer utilities used by the demo program

use crate::types::{BridgeError, Result};
use std::io::{self, Write};

/// Sum of two integers, wrapping on overflow
pub fn add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

/// Product of two integers, wrapping on overflow
pub fn multiply(a: i32, b: i32) -> i32 {
    a.wrapping_mul(b)
}

/// `n!` for `0 <= n <= 12`
///
/// Negative input is rejected with [`BridgeError::InvalidArgument`]; results
/// that do not fit an `i32` (n >= 13) with [`BridgeError::ArithmeticOverflow`].
pub fn factorial(n: i32) -> Result<i32> {
    if n < 0 {
        return Err(BridgeError::InvalidArgument(format!(
            "factorial of negative number {}",
            n
        )));
    }

    (2..=n).try_fold(1i32, |acc, k| {
        acc.checked_mul(k)
            .ok_or_else(|| BridgeError::ArithmeticOverflow(format!("{}! does not fit in i32", n)))
    })
}

/// Render integers as `[a, b, c]`
pub fn format_array(values: &[i32]) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Print integers as `[a, b, c]` followed by a newline
pub fn print_array(values: &[i32]) {
    println!("{}", format_array(values));
}

/// Program banner as a string
pub fn program_info(program_name: &str) -> String {
    let profile = if cfg!(debug_assertions) { "debug" } else { "release" };
    let rule = "=".repeat(40);
    format!(
        "{rule}\n  Program: {}\n  Library: {} v{}\n  Build:   {}\n{rule}\n",
        program_name,
        env!("CARGO_PKG_NAME"),
        crate::VERSION,
        profile,
        rule = rule,
    )
}

/// Write the program banner to `out`
pub fn write_program_info(out: &mut impl Write, program_name: &str) -> io::Result<()> {
    out.write_all(program_info(program_name).as_bytes())
}
