//! Filter parameter export for the processing pipeline
//!
//! Seam and interval errors are handed to the pipeline as a flat list of
//! typed parameters, one group of thirteen per error instance.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Int(i32),
    Double(f64),
    String(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParameter {
    pub uuid: Uuid,
    pub name: String,
    pub value: FilterValue,
    pub filter_id: Uuid,
    pub type_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Int,
    Double,
    String,
    Bool,
}

/// Parameters emitted per error instance, in name order
pub(crate) const ERROR_PARAMETERS: [(&str, ValueKind); 13] = [
    ("Error", ValueKind::Int),
    ("LwmSignalThreshold", ValueKind::Double),
    ("Max", ValueKind::Double),
    ("MiddleReference", ValueKind::Bool),
    ("Min", ValueKind::Double),
    ("Reference", ValueKind::String),
    ("Result", ValueKind::Int),
    ("Scope", ValueKind::String),
    ("Seam", ValueKind::Int),
    ("SeamInterval", ValueKind::Int),
    ("SeamSeries", ValueKind::Int),
    ("SecondThreshold", ValueKind::Double),
    ("Threshold", ValueKind::Double),
];

/// Named values of one error instance
pub(crate) trait ErrorValues {
    fn int_value(&self, name: &str) -> i32;
    fn double_value(&self, name: &str) -> f64;
    fn string_value(&self, name: &str) -> String;
    fn bool_value(&self, name: &str) -> bool;
}

pub(crate) fn error_parameters(
    values: &impl ErrorValues,
    filter_id: Uuid,
    type_id: Uuid,
) -> Vec<FilterParameter> {
    ERROR_PARAMETERS
        .iter()
        .map(|(name, kind)| FilterParameter {
            uuid: Uuid::new_v4(),
            name: (*name).to_string(),
            value: match kind {
                ValueKind::Int => FilterValue::Int(values.int_value(name)),
                ValueKind::Double => FilterValue::Double(values.double_value(name)),
                ValueKind::String => FilterValue::String(values.string_value(name)),
                ValueKind::Bool => FilterValue::Bool(values.bool_value(name)),
            },
            filter_id,
            type_id,
        })
        .collect()
}
