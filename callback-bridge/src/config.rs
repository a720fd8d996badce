//! Bridge configuration types
//!
//! This module defines the knobs the bridge needs: how many integers make a
//! complete input, which line ends the ingestion loop, how strictly lines are
//! parsed and how integers are represented on the host side.

use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::Bridge`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Number of integers required before an input can drive an invocation
    #[serde(default = "default_arity")]
    pub arity: usize,

    /// Input line that terminates the ingestion loop
    #[serde(default = "default_quit_command")]
    pub quit_command: String,

    /// Token handling policy for the line parser
    #[serde(default)]
    pub parse_policy: ParsePolicy,

    /// Host-side representation integers are marshalled into
    #[serde(default)]
    pub integer_repr: IntegerRepr,
}

fn default_arity() -> usize {
    4
}

fn default_quit_command() -> String {
    "quit".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            arity: default_arity(),
            quit_command: default_quit_command(),
            parse_policy: ParsePolicy::default(),
            integer_repr: IntegerRepr::default(),
        }
    }
}

/// How the parser treats tokens that are not base-10 integers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Drop bad tokens and keep the rest
    #[default]
    Lossy,
    /// Reject the whole line on the first bad token
    Strict,
}

/// Host-side integer representation used during marshalling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegerRepr {
    /// 32-bit signed integers
    #[default]
    Int32,
    /// Double-precision numbers, exact up to 2^53 - 1
    SafeNumber,
}

impl BridgeConfig {
    /// Create a new bridge configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the required arity
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    /// Builder method: set the termination command
    pub fn with_quit_command(mut self, command: impl Into<String>) -> Self {
        self.quit_command = command.into();
        self
    }

    /// Builder method: set the parse policy
    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    /// Builder method: set the host integer representation
    pub fn with_integer_repr(mut self, repr: IntegerRepr) -> Self {
        self.integer_repr = repr;
        self
    }

    /// Check if a trimmed input line is the termination command
    pub fn is_quit(&self, line: &str) -> bool {
        line == self.quit_command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_config_defaults() {
        let config = BridgeConfig::new();
        assert_eq!(config.arity, 4);
        assert_eq!(config.quit_command, "quit");
        assert_eq!(config.parse_policy, ParsePolicy::Lossy);
        assert_eq!(config.integer_repr, IntegerRepr::Int32);
    }

    #[test]
    fn test_bridge_config_builder() {
        let config = BridgeConfig::new()
            .with_arity(3)
            .with_quit_command("exit")
            .with_parse_policy(ParsePolicy::Strict)
            .with_integer_repr(IntegerRepr::SafeNumber);

        assert_eq!(config.arity, 3);
        assert!(config.is_quit("exit"));
        assert!(!config.is_quit("quit"));
        assert_eq!(config.parse_policy, ParsePolicy::Strict);
        assert_eq!(config.integer_repr, IntegerRepr::SafeNumber);
    }
}
