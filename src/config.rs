//! Configuration system for the automata.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::choice::TieBreak;
use crate::error::{ensure_dimension, ensure_positive, ensure_probability, SimError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ocean: OceanConfig,
    #[serde(default)]
    pub highway: HighwayConfig,
    #[serde(default)]
    pub motorway: MotorwayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Predator-prey ocean configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanConfig {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Fish move only on generations divisible by this
    pub fish_cycle: u32,
    /// Sharks breed only on generations divisible by this
    pub shark_cycle: u32,
    /// Fraction of cells seeded with fish by a random fill (0.0 - 1.0)
    pub initial_fish: f64,
    /// Fraction of cells seeded with sharks by a random fill (0.0 - 1.0)
    pub initial_sharks: f64,
    /// Selector used when several neighbour cells qualify
    pub tie_break: TieBreak,
}

/// Single-lane highway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighwayConfig {
    /// Number of road positions
    pub length: usize,
    /// Probability that a car slows down by one each tick
    pub car_linger: f64,
    /// Probability that a green light turns red each tick
    pub red_probability: f64,
    /// Ticks a light stays red
    pub red_duration: u32,
    /// Per-position probability of a car in a random fill
    pub initial_cars: f64,
    /// Per-position probability of a traffic light in a random fill
    pub initial_lights: f64,
}

/// Two-lane motorway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorwayConfig {
    /// Number of positions per lane
    pub length: usize,
    /// Probability that a car slows down by one each tick
    pub linger: f64,
    /// Per-cell probability of a car in a random fill
    pub initial_cars: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Steps between printed summaries
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            width: 42,
            height: 42,
            fish_cycle: 2,
            shark_cycle: 3,
            initial_fish: 0.1,
            initial_sharks: 0.05,
            tie_break: TieBreak::Biased,
        }
    }
}

impl Default for HighwayConfig {
    fn default() -> Self {
        Self {
            length: 42,
            car_linger: 0.15,
            red_probability: 0.25,
            red_duration: 2,
            initial_cars: 0.3,
            initial_lights: 0.05,
        }
    }
}

impl Default for MotorwayConfig {
    fn default() -> Self {
        Self {
            length: 42,
            linger: 0.15,
            initial_cars: 0.2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10,
            log_level: "info".to_string(),
        }
    }
}

impl OceanConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        ensure_dimension("width", self.width, 1)?;
        ensure_dimension("height", self.height, 1)?;
        ensure_positive("fish_cycle", self.fish_cycle)?;
        ensure_positive("shark_cycle", self.shark_cycle)?;
        ensure_probability("initial_fish", self.initial_fish)?;
        ensure_probability("initial_sharks", self.initial_sharks)?;
        Ok(())
    }
}

impl HighwayConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        ensure_dimension("length", self.length, 2)?;
        ensure_probability("car_linger", self.car_linger)?;
        ensure_probability("red_probability", self.red_probability)?;
        ensure_positive("red_duration", self.red_duration)?;
        ensure_probability("initial_cars", self.initial_cars)?;
        ensure_probability("initial_lights", self.initial_lights)?;
        Ok(())
    }
}

impl MotorwayConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        ensure_dimension("length", self.length, 2)?;
        ensure_probability("linger", self.linger)?;
        ensure_probability("initial_cars", self.initial_cars)?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), SimError> {
        self.ocean.validate()?;
        self.highway.validate()?;
        self.motorway.validate()?;
        if self.logging.stats_interval == 0 {
            return Err(SimError::InvalidParameter {
                name: "stats_interval",
                value: "0".to_string(),
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.ocean.width, loaded.ocean.width);
        assert_eq!(config.highway.red_duration, loaded.highway.red_duration);
        assert_eq!(config.ocean.tie_break, loaded.ocean.tie_break);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "ocean:\n  width: 10\n  tie_break: uniform\nmotorway:\n  linger: 0.0\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.ocean.width, 10);
        assert_eq!(config.ocean.height, 42);
        assert_eq!(config.ocean.tie_break, TieBreak::Uniform);
        assert_eq!(config.motorway.linger, 0.0);
        assert_eq!(config.highway.length, 42);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.highway.length = 1;
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidDimension { name: "length", .. })
        ));

        let mut config = Config::default();
        config.ocean.shark_cycle = 0;
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidParameter { name: "shark_cycle", .. })
        ));

        let mut config = Config::default();
        config.motorway.linger = 1.2;
        assert!(config.validate().is_err());
    }
}
