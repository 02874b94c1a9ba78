//! Integer literal parsing for schema and config YAML.
//!
//! Field values and fixed-field constants accept decimal, `0x…` hex,
//! and `0b…` binary forms, matching the original tool's literal syntax.

use crate::error::{MutatorError, Result};

/// Parse an integer literal in decimal, `0x` hex, or `0b` binary form.
pub fn parse_integer(path: &str, text: &str) -> Result<u64> {
    let t = text.trim();
    if let Some(rest) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        u64::from_str_radix(rest, 16)
            .map_err(|_| MutatorError::config(path, format!("invalid hex literal: {text:?}")))
    } else if let Some(rest) = t.strip_prefix("0b").or_else(|| t.strip_prefix("0B")) {
        u64::from_str_radix(rest, 2)
            .map_err(|_| MutatorError::config(path, format!("invalid binary literal: {text:?}")))
    } else {
        t.parse::<u64>()
            .map_err(|_| MutatorError::config(path, format!("invalid integer literal: {text:?}")))
    }
}

/// Parse a `serde_yaml::Value` scalar (string or number) as an integer,
/// accepting the same three bases as [`parse_integer`]. A null/missing
/// node yields 0, matching the original loader's behavior.
pub fn parse_integer_value(path: &str, node: &serde_yaml::Value) -> Result<u64> {
    match node {
        serde_yaml::Value::Null => Ok(0),
        serde_yaml::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|v| v as u64))
            .ok_or_else(|| MutatorError::config(path, format!("integer out of range: {n:?}"))),
        serde_yaml::Value::String(s) => parse_integer(path, s),
        other => Err(MutatorError::config(
            path,
            format!("expected an integer literal, found {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal() {
        assert_eq!(parse_integer("t", "42").unwrap(), 42);
    }

    #[test]
    fn hex() {
        assert_eq!(parse_integer("t", "0x13").unwrap(), 0x13);
        assert_eq!(parse_integer("t", "0X1A").unwrap(), 0x1A);
    }

    #[test]
    fn binary() {
        assert_eq!(parse_integer("t", "0b101").unwrap(), 5);
    }

    #[test]
    fn invalid_literal_is_config_error() {
        assert!(parse_integer("t", "not_a_number").is_err());
        assert!(parse_integer("t", "0xZZ").is_err());
    }
}
