//! Runtime configuration.

use serde::{Deserialize, Serialize};

use crate::artifact::ValidateOptions;
use crate::qgl::CompileOptions;
use crate::score::ScoreWeights;
use crate::telemetry::DEFAULT_CAPACITY;
use crate::{Error, Result};

/// Knobs for the compile, score and validate entry points plus the
/// telemetry buffer size. Defaults match the stock behaviour.
///
/// The JSON form uses camelCase keys throughout:
///
/// ```json
/// {
///   "compile": { "allowDuplicateIds": false },
///   "scoring": { "goalMatch": 1, "evidence": 2 },
///   "validation": { "failOpen": false },
///   "telemetryCapacity": 200
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub compile: CompileOptions,
    pub scoring: ScoreWeights,
    pub validation: ValidateOptions,
    pub telemetry_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compile: CompileOptions::default(),
            scoring: ScoreWeights::default(),
            validation: ValidateOptions::default(),
            telemetry_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to defaults.
    ///
    /// | Env Var                    | Default           |
    /// |----------------------------|-------------------|
    /// | `QEVA_ALLOW_DUPLICATE_IDS` | `false`           |
    /// | `QEVA_RULES_FAIL_OPEN`     | `false`           |
    /// | `TELEMETRY_BUFFER_SIZE`    | `200`             |
    /// | `QEVA_SCORE_WEIGHTS`       | `1,1,1,1,1,1`     |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("QEVA_ALLOW_DUPLICATE_IDS") {
            config.compile.allow_duplicate_ids = parse_flag("QEVA_ALLOW_DUPLICATE_IDS", &raw)?;
        }
        if let Some(raw) = lookup("QEVA_RULES_FAIL_OPEN") {
            config.validation.fail_open = parse_flag("QEVA_RULES_FAIL_OPEN", &raw)?;
        }
        if let Some(raw) = lookup("TELEMETRY_BUFFER_SIZE") {
            config.telemetry_capacity = raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("TELEMETRY_BUFFER_SIZE must be a positive integer, got {raw:?}")))?;
        }
        if let Some(raw) = lookup("QEVA_SCORE_WEIGHTS") {
            config.scoring = parse_weights(&raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON document. Missing fields take defaults.
    pub fn from_json_str(src: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.telemetry_capacity == 0 {
            return Err(Error::Config("telemetry capacity must be at least 1".into()));
        }
        let total = self.scoring.total();
        if !(total.is_finite() && total > 0.0) {
            return Err(Error::Config(format!("score weights must sum to a positive number, got {total}")));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::Config(format!("{key} must be a boolean, got {raw:?}"))),
    }
}

fn parse_weights(raw: &str) -> Result<ScoreWeights> {
    let values = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|_| Error::Config(format!("QEVA_SCORE_WEIGHTS must be numbers, got {raw:?}")))?;
    let weights: [f64; 6] = values
        .try_into()
        .map_err(|v: Vec<f64>| Error::Config(format!("QEVA_SCORE_WEIGHTS needs 6 values, got {}", v.len())))?;
    Ok(ScoreWeights::from_array(weights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.telemetry_capacity, 200);
        assert!(!config.compile.allow_duplicate_ids);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("QEVA_ALLOW_DUPLICATE_IDS", "true"),
            ("QEVA_RULES_FAIL_OPEN", "1"),
            ("TELEMETRY_BUFFER_SIZE", "16"),
            ("QEVA_SCORE_WEIGHTS", "2, 1, 1, 1, 1, 0"),
        ]))
        .unwrap();
        assert!(config.compile.allow_duplicate_ids);
        assert!(config.validation.fail_open);
        assert_eq!(config.telemetry_capacity, 16);
        assert_eq!(config.scoring.goal_match, 2.0);
        assert_eq!(config.scoring.humanity, 0.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        for vars in [
            [("TELEMETRY_BUFFER_SIZE", "0")],
            [("TELEMETRY_BUFFER_SIZE", "lots")],
            [("QEVA_SCORE_WEIGHTS", "1,1,1")],
            [("QEVA_SCORE_WEIGHTS", "0,0,0,0,0,0")],
            [("QEVA_RULES_FAIL_OPEN", "maybe")],
        ] {
            assert!(matches!(Config::from_lookup(lookup(&vars)), Err(Error::Config(_))), "{vars:?}");
        }
    }

    #[test]
    fn test_from_json_partial() {
        let config = Config::from_json_str(r#"{"scoring": {"evidence": 3}, "telemetryCapacity": 5}"#).unwrap();
        assert_eq!(config.scoring.evidence, 3.0);
        assert_eq!(config.scoring.goal_match, 1.0);
        assert_eq!(config.telemetry_capacity, 5);
        assert!(matches!(Config::from_json_str("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_json_keys_are_camel_case() {
        let config = Config::from_json_str(
            r#"{
                "compile": {"allowDuplicateIds": true},
                "scoring": {"goalMatch": 2, "structureCompleteness": 0.5},
                "validation": {"failOpen": true},
                "telemetryCapacity": 8
            }"#,
        )
        .unwrap();
        assert!(config.compile.allow_duplicate_ids);
        assert!(config.validation.fail_open);
        assert_eq!(config.scoring.goal_match, 2.0);
        assert_eq!(config.scoring.structure_completeness, 0.5);
        assert_eq!(config.telemetry_capacity, 8);

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["compile"]["allowDuplicateIds"], serde_json::json!(true));
        assert_eq!(value["validation"]["failOpen"], serde_json::json!(true));
        assert_eq!(value["telemetryCapacity"], serde_json::json!(8));
        assert!(value.get("telemetry_capacity").is_none());
        assert_eq!(Config::from_json_str(&value.to_string()).unwrap(), config);
    }
}
