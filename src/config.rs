//! Mutator configuration: `MUTATOR_CONFIG` YAML plus defaults.

use std::path::Path;

use serde::Deserialize;

use crate::error::{MutatorError, Result};
use crate::schema::integer::parse_integer_value;

/// Per-site mutation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Raw,
    Ir,
    Hybrid,
    /// Identical to [`Strategy::Hybrid`] in this revision; kept as a
    /// distinct variant so config files that name it keep working if a
    /// future revision gives it its own behavior.
    Auto,
}

impl Strategy {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "RAW" => Ok(Strategy::Raw),
            "IR" => Ok(Strategy::Ir),
            "HYBRID" => Ok(Strategy::Hybrid),
            "AUTO" => Ok(Strategy::Auto),
            other => Err(MutatorError::config(
                "strategy",
                format!("unknown strategy {other:?}, expected RAW|IR|HYBRID|AUTO"),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    verbose: Option<bool>,
    #[serde(default)]
    decode_prob: Option<serde_yaml::Value>,
    #[serde(default)]
    imm_random_prob: Option<serde_yaml::Value>,
    #[serde(default)]
    r_weight_base_alu: Option<serde_yaml::Value>,
    #[serde(default)]
    r_weight_m: Option<serde_yaml::Value>,
    #[serde(default)]
    schemas: Option<RawSchemas>,
}

#[derive(Debug, Deserialize)]
struct RawSchemas {
    isa: String,
}

/// Resolved mutator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub strategy: Strategy,
    pub verbose: bool,
    pub decode_prob: u32,
    pub imm_random_prob: u32,
    pub r_weight_base_alu: u32,
    pub r_weight_m: u32,
    pub isa_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strategy: Strategy::Ir,
            verbose: false,
            decode_prob: 60,
            imm_random_prob: 25,
            r_weight_base_alu: 70,
            r_weight_m: 30,
            isa_name: "rv32im".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the path named by `MUTATOR_CONFIG`.
    pub fn load_from_env() -> Result<Self> {
        let path = std::env::var("MUTATOR_CONFIG")
            .map_err(|_| MutatorError::Env { var: "MUTATOR_CONFIG" })?;
        Config::load_from_file(Path::new(&path))
    }

    /// Load and validate configuration from an explicit file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MutatorError::config(path.display().to_string(), format!("cannot read config: {e}"))
        })?;
        Config::parse(&path.display().to_string(), &text)
    }

    fn parse(path: &str, text: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(text)
            .map_err(|e| MutatorError::config(path, format!("YAML parse error: {e}")))?;

        let defaults = Config::default();
        let strategy = match raw.strategy {
            Some(s) => Strategy::parse(&s)?,
            None => defaults.strategy,
        };
        let decode_prob = parse_percent(path, "decode_prob", raw.decode_prob, defaults.decode_prob)?;
        let imm_random_prob =
            parse_percent(path, "imm_random_prob", raw.imm_random_prob, defaults.imm_random_prob)?;
        let r_weight_base_alu = raw
            .r_weight_base_alu
            .map(|v| parse_integer_value(path, &v))
            .transpose()?
            .map(|v| v as u32)
            .unwrap_or(defaults.r_weight_base_alu);
        let r_weight_m = raw
            .r_weight_m
            .map(|v| parse_integer_value(path, &v))
            .transpose()?
            .map(|v| v as u32)
            .unwrap_or(defaults.r_weight_m);
        let isa_name = raw
            .schemas
            .map(|s| s.isa)
            .unwrap_or(defaults.isa_name);

        Ok(Config {
            strategy,
            verbose: raw.verbose.unwrap_or(defaults.verbose),
            decode_prob,
            imm_random_prob,
            r_weight_base_alu,
            r_weight_m,
            isa_name,
        })
    }
}

fn parse_percent(
    path: &str,
    key: &str,
    node: Option<serde_yaml::Value>,
    default: u32,
) -> Result<u32> {
    let value = match node {
        Some(v) => parse_integer_value(path, &v)? as u32,
        None => return Ok(default),
    };
    if value > 100 {
        return Err(MutatorError::config(path, format!("{key} must be in 0..=100, got {value}")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_config_is_empty() {
        let cfg = Config::parse("t", "{}").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn parses_full_config() {
        let text = "strategy: RAW\nverbose: true\ndecode_prob: 80\nimm_random_prob: 10\nr_weight_base_alu: 50\nr_weight_m: 50\nschemas:\n  isa: rv32i\n";
        let cfg = Config::parse("t", text).unwrap();
        assert_eq!(cfg.strategy, Strategy::Raw);
        assert!(cfg.verbose);
        assert_eq!(cfg.decode_prob, 80);
        assert_eq!(cfg.isa_name, "rv32i");
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let text = "decode_prob: 150\n";
        assert!(Config::parse("t", text).is_err());
    }

    #[test]
    fn rejects_unknown_strategy() {
        let text = "strategy: QUANTUM\n";
        assert!(Config::parse("t", text).is_err());
    }
}
