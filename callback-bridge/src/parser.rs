//! Line parser
//!
//! Splits a raw input line on whitespace and reads each token as a base-10
//! integer. The default policy is best-effort: tokens that do not parse are
//! dropped and the remaining integers are kept in order.

use crate::config::ParsePolicy;
use crate::types::{BridgeError, ParsedInput, Result};

/// Parse a line, dropping tokens that are not integers
///
/// Never fails. An empty or fully malformed line yields an empty input.
///
/// # Example
/// ```
/// use callback_bridge::parser::parse;
///
/// assert_eq!(parse("1 two 3 4").values(), &[1, 3, 4]);
/// ```
pub fn parse(raw: &str) -> ParsedInput {
    let values = raw
        .split_whitespace()
        .filter_map(|token| match token.parse::<i64>() {
            Ok(value) => Some(value),
            Err(_) => {
                log::trace!("Dropping non-integer token: {:?}", token);
                None
            }
        })
        .collect();

    ParsedInput::new(values)
}

/// Parse a line, rejecting it on the first token that is not an integer
pub fn parse_strict(raw: &str) -> Result<ParsedInput> {
    let values = raw
        .split_whitespace()
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|e| BridgeError::InvalidInput(format!("{:?}: {}", token, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ParsedInput::new(values))
}

/// Parse a line under the given policy
pub fn parse_with_policy(raw: &str, policy: ParsePolicy) -> Result<ParsedInput> {
    match policy {
        ParsePolicy::Lossy => Ok(parse(raw)),
        ParsePolicy::Strict => parse_strict(raw),
    }
}
