//! Named color maps stored with a product

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SIGNAL_QUALITY: &str = "Signal Quality";
pub const ERROR_LEVELS: &str = "Error Levels";

/// One stop of a color map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub value: f64,
    pub color: String,
}

/// Ordered list of color stops
///
/// The name is not persisted; it is fixed by the product slot the map
/// occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    name: String,
    stops: Vec<ColorStop>,
}

impl ColorMap {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stops: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn set_stops(&mut self, stops: Vec<ColorStop>) {
        self.stops = stops;
    }

    pub fn push(&mut self, value: f64, color: &str) {
        self.stops.push(ColorStop {
            value,
            color: color.to_string(),
        });
    }

    /// Take over the stops of `other`, keeping this map's name
    pub fn copy_from(&mut self, other: &ColorMap) {
        self.stops = other.stops.clone();
    }

    pub fn to_json(&self) -> Value {
        Value::Array(
            self.stops
                .iter()
                .filter_map(|stop| serde_json::to_value(stop).ok())
                .collect(),
        )
    }

    /// Entries that are not `{value, color}` objects are skipped
    pub fn read_json(&mut self, value: &Value) {
        self.stops = value
            .as_array()
            .map(|stops| {
                stops
                    .iter()
                    .filter_map(|stop| serde_json::from_value(stop.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip_keeps_name() {
        let mut map = ColorMap::new(SIGNAL_QUALITY);
        map.push(0.0, "#ff0000");
        map.push(100.0, "#00ff00");
        let value = map.to_json();
        assert_eq!(value, json!([{"value": 0.0, "color": "#ff0000"}, {"value": 100.0, "color": "#00ff00"}]));

        let mut parsed = ColorMap::new(SIGNAL_QUALITY);
        parsed.read_json(&value);
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_invalid_stops_skipped() {
        let mut map = ColorMap::new(ERROR_LEVELS);
        map.read_json(&json!([{"value": 1}, {"value": 2.5, "color": "red"}, 3]));
        assert_eq!(map.stops().len(), 1);
        assert_eq!(map.stops()[0].color, "red");
        assert_eq!(map.name(), "Error Levels");
    }

    #[test]
    fn test_copy_from() {
        let mut source = ColorMap::new(ERROR_LEVELS);
        source.push(1.0, "white");
        let mut target = ColorMap::new(SIGNAL_QUALITY);
        target.copy_from(&source);
        assert_eq!(target.stops(), source.stops());
        assert_eq!(target.name(), SIGNAL_QUALITY);
    }
}
