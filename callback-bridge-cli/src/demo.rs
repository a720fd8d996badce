//! Utility showcase
//!
//! Exercises the integer and statistics helpers from the library and echoes
//! the command line it was started with.

use callback_bridge::stats::{calculate_average, find_max, find_min};
use callback_bridge::utils::{add, factorial, format_array, multiply, write_program_info};
use std::io::{self, Write};

const SAMPLES: [f64; 5] = [1.5, 2.5, 3.5, 4.5, 5.5];

/// Write the showcase to `out`
pub fn run_demo(out: &mut impl Write, program: &str, args: &[String]) -> io::Result<()> {
    write_program_info(out, program)?;

    writeln!(out, "\n=== Utility functions ===")?;
    let (a, b) = (10, 25);
    writeln!(out, "add({}, {}) = {}", a, b, add(a, b))?;
    writeln!(out, "multiply({}, {}) = {}", a, b, multiply(a, b))?;
    for n in [0, 1, 5, 12, 13, -1] {
        match factorial(n) {
            Ok(value) => writeln!(out, "factorial({}) = {}", n, value)?,
            Err(e) => writeln!(out, "factorial({}) -> {}", n, e)?,
        }
    }

    writeln!(out, "\n=== Statistics ===")?;
    writeln!(out, "values: {:?}", SAMPLES)?;
    writeln!(out, "average: {:.2}", calculate_average(&SAMPLES))?;
    writeln!(out, "max: {:.2}", find_max(&SAMPLES))?;
    writeln!(out, "min: {:.2}", find_min(&SAMPLES))?;
    writeln!(out, "empty average: {:.2}", calculate_average(&[]))?;

    writeln!(out, "\n=== Arrays ===")?;
    writeln!(out, "{}", format_array(&[1, 2, 3, 4, 5]))?;

    writeln!(out, "\n=== Command line arguments ===")?;
    writeln!(out, "count: {}", args.len())?;
    for (i, arg) in args.iter().enumerate() {
        writeln!(out, "arg {}: {}", i, arg)?;
    }

    writeln!(out, "\nDone.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_output() {
        let mut buf = Vec::new();
        let args = vec!["--flag".to_string(), "value".to_string()];
        run_demo(&mut buf, "Callback Bridge Demo", &args).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Program: Callback Bridge Demo"));
        assert!(text.contains("add(10, 25) = 35"));
        assert!(text.contains("multiply(10, 25) = 250"));
        assert!(text.contains("factorial(5) = 120"));
        assert!(text.contains("factorial(-1) -> Invalid argument"));
        assert!(text.contains("average: 3.50"));
        assert!(text.contains("max: 5.50"));
        assert!(text.contains("min: 1.50"));
        assert!(text.contains("[1, 2, 3, 4, 5]"));
        assert!(text.contains("arg 1: value"));
    }
}
