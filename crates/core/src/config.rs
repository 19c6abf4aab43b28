//! Game configuration and its validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{
    is_block_value, DEFAULT_HEIGHT, DEFAULT_WIDTH, FAST_DELAY_MS, MAX_DIMENSION, MAX_START_VALUE,
    START_VALUES,
};

/// Construction-time parameters of a [`Game`](crate::Game).
///
/// Missing fields take their defaults when deserialized, so a JSON file only
/// needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: u8,
    pub height: u8,
    /// Seed for spawn value selection
    pub seed: u32,
    /// Tick interval during merge chains and after a drop
    pub fast_delay_ms: u32,
    /// Values new blocks are drawn from, uniformly
    pub start_values: Vec<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: 1,
            fast_delay_ms: FAST_DELAY_MS,
            start_values: START_VALUES.to_vec(),
        }
    }
}

impl GameConfig {
    pub fn with_size(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_start_values(mut self, values: &[u64]) -> Self {
        self.start_values = values.to_vec();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dim_ok = |d: u8| (1..=MAX_DIMENSION).contains(&d);
        if !dim_ok(self.width) || !dim_ok(self.height) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.start_values.is_empty() {
            return Err(ConfigError::EmptyStartValues);
        }
        let value_ok = |v: u64| is_block_value(v) && v <= MAX_START_VALUE;
        if let Some(&bad) = self.start_values.iter().find(|&&v| !value_ok(v)) {
            return Err(ConfigError::InvalidStartValue(bad));
        }
        Ok(())
    }
}

/// Rejected configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidDimensions { width: u8, height: u8 },
    EmptyStartValues,
    InvalidStartValue(u64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDimensions { width, height } => write!(
                f,
                "grid size {}x{} is invalid (each side must be 1..={})",
                width, height, MAX_DIMENSION
            ),
            ConfigError::EmptyStartValues => write!(f, "start values must not be empty"),
            ConfigError::InvalidStartValue(v) => {
                write!(
                    f,
                    "start value {} must be a power of two in 2..={}",
                    v, MAX_START_VALUE
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!((config.width, config.height), (5, 7));
        assert_eq!(config.fast_delay_ms, 175);
    }

    #[test]
    fn test_rejects_zero_and_oversized_dimensions() {
        assert!(matches!(
            GameConfig::with_size(0, 7).validate(),
            Err(ConfigError::InvalidDimensions { width: 0, height: 7 })
        ));
        assert!(GameConfig::with_size(5, 0).validate().is_err());
        assert!(GameConfig::with_size(MAX_DIMENSION + 1, 7).validate().is_err());
        assert!(GameConfig::with_size(MAX_DIMENSION, MAX_DIMENSION).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_start_values() {
        let empty = GameConfig::default().with_start_values(&[]);
        assert_eq!(empty.validate(), Err(ConfigError::EmptyStartValues));

        let odd = GameConfig::default().with_start_values(&[2, 6]);
        assert_eq!(odd.validate(), Err(ConfigError::InvalidStartValue(6)));

        let one = GameConfig::default().with_start_values(&[1]);
        assert_eq!(one.validate(), Err(ConfigError::InvalidStartValue(1)));
    }

    #[test]
    fn test_caps_start_values() {
        let top = GameConfig::default().with_start_values(&[2, MAX_START_VALUE]);
        assert_eq!(top.validate(), Ok(()));

        let huge = GameConfig::default().with_start_values(&[1 << 63]);
        assert_eq!(huge.validate(), Err(ConfigError::InvalidStartValue(1 << 63)));
        assert_eq!(
            huge.validate().unwrap_err().to_string(),
            "start value 9223372036854775808 must be a power of two in 2..=4294967296"
        );
    }

    #[test]
    fn test_json_start_value_over_cap_is_rejected() {
        let config: GameConfig =
            serde_json::from_str(r#"{"start_values": [2, 8589934592]}"#).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::InvalidStartValue(1 << 33)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"width": 6, "seed": 42}"#).unwrap();
        assert_eq!(config.width, 6);
        assert_eq!(config.height, 7);
        assert_eq!(config.seed, 42);
        assert_eq!(config.start_values, START_VALUES.to_vec());
    }

    #[test]
    fn test_error_messages() {
        let err = GameConfig::with_size(0, 0).validate().unwrap_err();
        assert_eq!(err.to_string(), "grid size 0x0 is invalid (each side must be 1..=32)");
    }
}
