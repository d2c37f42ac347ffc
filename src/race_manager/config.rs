//! Config - Startup layout and entry list
//!
//! Defaults reproduce the stock event: a four-turn, 975 m circuit and six
//! drivers. A JSON file may override any subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::race_manager::error::Result;

/// Seeded segment `from -> to` (0-based turn indices)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    pub from: usize,
    pub to: usize,
    pub length: f64,
}

/// Seeded driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub name: String,
    pub car_number: u32,
}

/// Race configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Turns on the track at startup
    pub initial_turns: usize,
    /// Segments added at startup, in order
    pub segments: Vec<SegmentConfig>,
    /// Length of the new closing segment when a turn is added to a track
    /// that has no closing segment yet (meters)
    pub closing_straight: f64,
    /// Drivers entered at startup, IDs issued from 1 in this order
    pub drivers: Vec<DriverConfig>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        let segment = |from, to, length| SegmentConfig { from, to, length };
        let driver = |name: &str, car_number| DriverConfig {
            name: name.to_string(),
            car_number,
        };

        Self {
            initial_turns: 4,
            segments: vec![
                segment(0, 1, 300.0),
                segment(1, 2, 150.0),
                segment(2, 3, 25.0),
                segment(3, 0, 500.0),
            ],
            closing_straight: 500.0,
            drivers: vec![
                driver("Alice", 11),
                driver("Bob", 22),
                driver("Charlie", 33),
                driver("Diana", 44),
                driver("Eve", 55),
                driver("Frank", 66),
            ],
        }
    }
}

impl RaceConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        log::info!("Loaded race config from {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_stock_event() {
        let config = RaceConfig::default();
        assert_eq!(config.initial_turns, 4);
        assert_eq!(config.segments.iter().map(|s| s.length).sum::<f64>(), 975.0);
        assert_eq!(config.drivers.len(), 6);
        assert_eq!(config.drivers[4].name, "Eve");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RaceConfig::from_json_str(
            r#"{ "drivers": [{ "name": "Zed", "car_number": 9 }], "closing_straight": 250.0 }"#,
        )
        .unwrap();
        assert_eq!(config.drivers.len(), 1);
        assert_eq!(config.closing_straight, 250.0);
        assert_eq!(config.initial_turns, 4);
        assert_eq!(config.segments.len(), 4);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            RaceConfig::from_json_str("{ \"initial_turns\": -1 }"),
            Err(crate::race_manager::error::Error::Json(_))
        ));
    }
}
