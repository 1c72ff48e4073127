//! Per-entity change logs
//!
//! Every entity owns a [`ChangeLog`]. Recording is a no-op unless the log is
//! enabled; the flag is inherited from the parent when an entity is created
//! or attached and toggled recursively from the product.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// One logged modification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "description")]
pub enum Change {
    /// A named property changed value
    #[serde(rename = "PropertyChange", rename_all = "camelCase")]
    Property {
        property_name: String,
        old_value: Value,
        new_value: Value,
    },

    #[serde(rename = "SeamSeriesCreatedChange")]
    SeamSeriesCreated { uuid: Uuid, number: i32 },

    #[serde(rename = "SeamSeriesRemovedChange")]
    SeamSeriesRemoved { uuid: Uuid, number: i32 },

    #[serde(rename = "SeamCreatedChange")]
    SeamCreated { uuid: Uuid, number: i32 },

    #[serde(rename = "SeamRemovedChange")]
    SeamRemoved { uuid: Uuid, number: i32 },

    #[serde(rename = "LinkedSeamCreatedChange")]
    LinkedSeamCreated { uuid: Uuid, label: String },

    #[serde(rename = "SeamIntervalCreatedChange")]
    SeamIntervalCreated { uuid: Uuid, number: i32 },

    #[serde(rename = "SeamIntervalRemovedChange")]
    SeamIntervalRemoved { uuid: Uuid, number: i32 },

    #[serde(rename = "ErrorCreatedChange", rename_all = "camelCase")]
    ErrorCreated { uuid: Uuid, variant_id: Uuid },

    #[serde(rename = "ErrorRemovedChange", rename_all = "camelCase")]
    ErrorRemoved { uuid: Uuid, variant_id: Uuid },

    #[serde(rename = "HardwareParametersCreatedChange")]
    HardwareParametersCreated { uuid: Uuid },

    #[serde(rename = "ParameterSetAddedChange")]
    ParameterSetAdded { uuid: Uuid },

    #[serde(rename = "ParameterSetReplacedChange")]
    ParameterSetReplaced { uuid: Uuid },

    #[serde(rename = "ParameterSetRemovedChange")]
    ParameterSetRemoved { uuid: Uuid },

    #[serde(rename = "ParameterCreatedChange")]
    ParameterCreated { uuid: Uuid, name: String },

    #[serde(rename = "ReferenceCurveCreatedChange")]
    ReferenceCurveCreated { uuid: Uuid },

    #[serde(rename = "ReferenceCurveRemovedChange")]
    ReferenceCurveRemoved { uuid: Uuid },
}

impl Change {
    /// Property name for [`Change::Property`] entries
    pub fn property_name(&self) -> Option<&str> {
        match self {
            Change::Property { property_name, .. } => Some(property_name),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Ordered log of changes, recording only while enabled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeLog {
    enabled: bool,
    entries: Vec<Change>,
}

impl ChangeLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn record(&mut self, change: Change) {
        if self.enabled {
            self.entries.push(change);
        }
    }

    /// Record a [`Change::Property`] entry
    pub fn property(&mut self, name: &str, old_value: impl Into<Value>, new_value: impl Into<Value>) {
        if self.enabled {
            self.entries.push(Change::Property {
                property_name: name.to_string(),
                old_value: old_value.into(),
                new_value: new_value.into(),
            });
        }
    }

    pub fn entries(&self) -> &[Change] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_json(&self) -> Vec<Value> {
        self.entries.iter().map(Change::to_json).collect()
    }
}
