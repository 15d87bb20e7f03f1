//! Data-driven cycle, spawn, deviation and heat parameters
//!
//! Defaults reproduce the stock board. A JSON file may override any subset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Cycle ===
    /// Balls released per collection cycle
    pub batch_size: u32,
    /// Time to hold a full batch on the bar before releasing (ms)
    pub holding_time_ms: f64,
    /// Give up waiting for a full batch after this long (ms)
    pub collection_timeout_ms: f64,
    /// Bar narrow/widen animation length (ms)
    pub bar_transition_ms: f64,

    // === Spawner ===
    /// Interval between spawn attempts (ms)
    pub spawn_interval_ms: f64,
    /// Spawn jitter half-range (pixels)
    pub spawn_jitter: f32,

    // === Statistics ===
    /// Flag a slot when empirical share deviates more than this (percentage points)
    pub deviation_threshold_pct: f64,
    /// Probability of bouncing right at each peg
    pub peg_right_probability: f64,

    // === Heat map ===
    /// Only balls with y in [heat_y_min, heat_y_max] are sampled
    pub heat_y_min: f32,
    pub heat_y_max: f32,
    /// Grid cell size (pixels)
    pub heat_cell_size: f32,
    /// Saturation value for a cell
    pub heat_max: f64,
    /// Multiplicative decay per tick
    pub heat_decay: f64,
    /// Cells below this value are dropped
    pub heat_epsilon: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            batch_size: 100,
            holding_time_ms: 1000.0,
            collection_timeout_ms: 15_000.0,
            bar_transition_ms: 500.0,

            spawn_interval_ms: 50.0,
            spawn_jitter: 10.0,

            deviation_threshold_pct: 5.0,
            peg_right_probability: 0.5,

            heat_y_min: 205.0,
            heat_y_max: 455.0,
            heat_cell_size: 3.0,
            heat_max: 100.0,
            heat_decay: 0.9995,
            heat_epsilon: 0.1,
        }
    }
}

impl Tuning {
    /// Load tuning from a JSON file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning: Tuning = serde_json::from_str(&json)?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        }

        if self.batch_size == 0 {
            return invalid("batch_size", "must be at least 1");
        }
        if !(self.holding_time_ms >= 0.0) {
            return invalid("holding_time_ms", "must be non-negative");
        }
        if !(self.collection_timeout_ms > 0.0) {
            return invalid("collection_timeout_ms", "must be positive");
        }
        if !(self.bar_transition_ms > 0.0) {
            return invalid("bar_transition_ms", "must be positive");
        }
        if !(self.spawn_interval_ms > 0.0) {
            return invalid("spawn_interval_ms", "must be positive");
        }
        if !(self.spawn_jitter >= 0.0) {
            return invalid("spawn_jitter", "must be non-negative");
        }
        if !(self.deviation_threshold_pct >= 0.0) {
            return invalid("deviation_threshold_pct", "must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.peg_right_probability) {
            return invalid("peg_right_probability", "must be within [0, 1]");
        }
        if !(self.heat_y_min <= self.heat_y_max) {
            return invalid("heat_y_min", "must not exceed heat_y_max");
        }
        if !(self.heat_cell_size > 0.0) {
            return invalid("heat_cell_size", "must be positive");
        }
        if !(self.heat_max > 0.0) {
            return invalid("heat_max", "must be positive");
        }
        if !(self.heat_decay > 0.0 && self.heat_decay < 1.0) {
            return invalid("heat_decay", "must be within (0, 1)");
        }
        if !(self.heat_epsilon >= 0.0) {
            return invalid("heat_epsilon", "must be non-negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let tuning: Tuning = serde_json::from_str(r#"{ "batch_size": 40 }"#).unwrap();
        assert_eq!(tuning.batch_size, 40);
        assert_eq!(tuning.holding_time_ms, 1000.0);
        assert_eq!(tuning.heat_decay, 0.9995);
    }

    #[test]
    fn test_rejects_bad_values() {
        let tuning = Tuning {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Invalid {
                field: "batch_size",
                ..
            })
        ));

        let tuning = Tuning {
            heat_decay: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Invalid {
                field: "heat_decay",
                ..
            })
        ));

        let tuning = Tuning {
            heat_y_min: 500.0,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!("plinko-tuning-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "batch_size": 0 }"#).unwrap();
        let result = Tuning::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            result,
            Err(TuningError::Invalid {
                field: "batch_size",
                ..
            })
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Tuning::load("/nonexistent/plinko-tuning.json");
        assert!(matches!(result, Err(TuningError::Io(_))));
    }
}
