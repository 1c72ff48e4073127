use crate::json::{self, JsonObject};
use serde_json::{json, Value};

/// Bounds and thresholds of one quality level
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelConfig {
    pub min: f64,
    pub max: f64,
    pub threshold: f64,
    pub second_threshold: f64,
}

impl LevelConfig {
    pub fn to_json(&self) -> Value {
        json!({
            "min": self.min,
            "max": self.max,
            "threshold": self.threshold,
            "secondThreshold": self.second_threshold,
        })
    }

    pub fn from_json(object: &JsonObject) -> LevelConfig {
        LevelConfig {
            min: json::read_f64(object, json::MIN, 0.0),
            max: json::read_f64(object, json::MAX, 0.0),
            threshold: json::read_f64(object, json::THRESHOLD, 0.0),
            second_threshold: json::read_f64(object, json::SECOND_THRESHOLD, 0.0),
        }
    }
}
