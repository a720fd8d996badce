//! Marshalling of parsed input into host values
//!
//! Converts a [`ParsedInput`] into the host's native array representation,
//! preserving order and exact values. Integers that the chosen representation
//! cannot hold are reported, never truncated.

use crate::config::IntegerRepr;
use crate::host::HostValue;
use crate::types::{BridgeError, ParsedInput, Result};

/// Largest integer a double can represent exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Convert a single integer into a host value
pub fn marshal_integer(index: usize, value: i64, repr: IntegerRepr) -> Result<HostValue> {
    match repr {
        IntegerRepr::Int32 => i32::try_from(value)
            .map(HostValue::Int32)
            .map_err(|_| BridgeError::IntegerRangeError { index, value }),
        IntegerRepr::SafeNumber => {
            if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value) {
                Ok(HostValue::Number(value as f64))
            } else {
                Err(BridgeError::IntegerRangeError { index, value })
            }
        }
    }
}

/// Convert parsed input into a host array
pub fn marshal_input(input: &ParsedInput, repr: IntegerRepr) -> Result<HostValue> {
    let items = input
        .values()
        .iter()
        .enumerate()
        .map(|(index, &value)| marshal_integer(index, value, repr))
        .collect::<Result<Vec<_>>>()?;

    Ok(HostValue::Array(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_int32_preserves_order() {
        let input = ParsedInput::new(vec![10, -20, 30, 40]);
        let value = marshal_input(&input, IntegerRepr::Int32).unwrap();
        assert_eq!(
            value,
            HostValue::Array(vec![
                HostValue::Int32(10),
                HostValue::Int32(-20),
                HostValue::Int32(30),
                HostValue::Int32(40),
            ])
        );
    }

    #[test]
    fn test_marshal_int32_range_error() {
        let input = ParsedInput::new(vec![1, 2, i32::MAX as i64 + 1, 4]);
        let err = marshal_input(&input, IntegerRepr::Int32).unwrap_err();
        match err {
            BridgeError::IntegerRangeError { index, value } => {
                assert_eq!(index, 2);
                assert_eq!(value, 2_147_483_648);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_marshal_int32_bounds() {
        assert!(marshal_integer(0, i32::MIN as i64, IntegerRepr::Int32).is_ok());
        assert!(marshal_integer(0, i32::MIN as i64 - 1, IntegerRepr::Int32).is_err());
    }

    #[test]
    fn test_marshal_safe_number() {
        let input = ParsedInput::new(vec![3_000_000_000, MAX_SAFE_INTEGER]);
        let value = marshal_input(&input, IntegerRepr::SafeNumber).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items[0].as_i64(), Some(3_000_000_000));
        assert_eq!(items[1].as_i64(), Some(MAX_SAFE_INTEGER));

        assert!(marshal_integer(0, MAX_SAFE_INTEGER + 1, IntegerRepr::SafeNumber).is_err());
        assert!(marshal_integer(0, -MAX_SAFE_INTEGER - 1, IntegerRepr::SafeNumber).is_err());
    }
}
