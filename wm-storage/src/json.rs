//! Document keys and lenient field readers
//!
//! Readers never fail: a missing or mistyped field yields the supplied
//! default. Numbers are accepted in string form as older documents wrote
//! some numeric fields as strings.

use crate::uuid_utils;
use serde_json::{Map, Value};
use uuid::Uuid;

pub type JsonObject = Map<String, Value>;

pub const UUID: &str = "uuid";
pub const NAME: &str = "name";
pub const NUMBER: &str = "number";
pub const TYPE: &str = "type";
pub const TYPE_ID: &str = "typeId";
pub const VALUE: &str = "value";
pub const DEFAULT: &str = "default";
pub const FILTER_ID: &str = "filterId";
pub const PARAMETERS: &str = "parameters";
pub const PARAMETERS_GROUPED_BY_FILTER: &str = "parametersGroupedByFilter";

pub const GRAPH: &str = "graph";
pub const SUB_GRAPHS: &str = "subgraphs";
pub const LINKED_GRAPH: &str = "linkedGraph";
pub const GRAPH_PARAM_SET: &str = "graphParamSet";
pub const HARDWARE: &str = "hardware";
pub const PARAMETER_SET: &str = "parameterSet";
pub const PRESET_ID: &str = "presetId";
pub const SUM_ERROR: &str = "sumError";

pub const LENGTH_UNIT: &str = "lengthUnit";
pub const ASSEMBLY_IMAGE: &str = "assemblyImage";
pub const ENDLESS: &str = "endless";
pub const START_POS_Y_AXIS: &str = "startPosYAxis";
pub const TRIGGER: &str = "trigger";
pub const SOURCE: &str = "source";
pub const MODE: &str = "mode";
pub const FILTER_PARAMETER_SETS: &str = "filterParameterSets";
pub const SEAM_SERIES: &str = "seamSeries";
pub const OVERLYING_ERROR: &str = "overlyingError";
pub const QUALITY_NORM: &str = "qualityNorm";
pub const LWM_TRIGGER_SIGNAL_TYPE: &str = "lwmTriggerSignalType";
pub const LWM_TRIGGER_SIGNAL_THRESHOLD: &str = "lwmTriggerSignalThreshold";
pub const SIGNAL_QUALITY: &str = "signalQuality";
pub const ERROR_LEVELS: &str = "errorLevels";

pub const SEAMS: &str = "seams";
pub const SEAM_INTERVALS: &str = "seamIntervals";
pub const LINKED_SEAMS: &str = "linkedSeams";
pub const LABEL: &str = "label";
pub const POSITION_IN_ASSEMBLY_IMAGE: &str = "positionInAssemblyImage";
pub const ROI: &str = "roi";
pub const X: &str = "X";
pub const Y: &str = "Y";
pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const TRIGGER_DELTA: &str = "triggerDelta";
pub const VELOCITY: &str = "velocity";
pub const THICKNESS_LEFT: &str = "thicknessLeft";
pub const THICKNESS_RIGHT: &str = "thicknessRight";
pub const TARGET_DIFFERENCE: &str = "targetDifference";
pub const MOVING_DIRECTION: &str = "movingDirection";
pub const INTERVAL_SUM_ERROR: &str = "intervalSumError";
pub const LENGTH: &str = "length";
pub const LEVEL: &str = "level";

pub const VARIANT_ID: &str = "variantId";
pub const RESULT_VALUE: &str = "resultValue";
pub const ERROR_TYPE: &str = "errorType";
pub const SHIFT: &str = "shift";
pub const MIN_LIMIT: &str = "minLimit";
pub const MAX_LIMIT: &str = "maxLimit";
pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const THRESHOLD: &str = "threshold";
pub const SECOND_THRESHOLD: &str = "secondThreshold";
pub const ENVELOPE: &str = "envelope";
pub const USE_MIDDLE_CURVE_AS_REFERENCE: &str = "useMiddleCurveAsReference";
pub const INTERVAL_LEVELS: &str = "intervalLevels";
pub const INTERVAL_IDS: &str = "intervalIds";
pub const INTERVAL: &str = "interval";
pub const ERROR: &str = "error";

pub const REFERENCE_CURVES: &str = "referenceCurves";
pub const REFERENCE_CURVE_SET: &str = "referenceCurveSet";
pub const REFERENCE_TYPE: &str = "referenceType";
pub const JITTER: &str = "jitter";
pub const UPPER: &str = "upper";
pub const MIDDLE: &str = "middle";
pub const LOWER: &str = "lower";

pub fn uuid_value(id: &Uuid) -> Value {
    Value::String(uuid_utils::to_string(id))
}

pub fn read_uuid(object: &JsonObject, key: &str) -> Uuid {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(uuid_utils::parse_or_nil)
        .unwrap_or_else(Uuid::nil)
}

/// UUID field, `None` when missing or unparsable
pub fn read_optional_uuid(object: &JsonObject, key: &str) -> Option<Uuid> {
    object
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| uuid_utils::parse(s).ok())
}

pub fn read_string(object: &JsonObject, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

pub fn read_i32(object: &JsonObject, key: &str, default: i32) -> i32 {
    match object.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(|v| v as i32)
            .unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(|v| v as i32).unwrap_or(default),
        Some(Value::Bool(b)) => i32::from(*b),
        _ => default,
    }
}

pub fn read_f64(object: &JsonObject, key: &str, default: f64) -> f64 {
    match object.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(default),
        _ => default,
    }
}

pub fn read_bool(object: &JsonObject, key: &str, default: bool) -> bool {
    match object.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().map(|v| v != 0).unwrap_or(default),
        _ => default,
    }
}

pub fn read_array<'a>(object: &'a JsonObject, key: &str) -> &'a [Value] {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub fn read_object<'a>(object: &'a JsonObject, key: &str) -> Option<&'a JsonObject> {
    object.get(key).and_then(Value::as_object)
}

/// Array of UUID strings, skipping entries that do not parse
pub fn read_uuid_list(object: &JsonObject, key: &str) -> Vec<Uuid> {
    read_array(object, key)
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|s| uuid_utils::parse(s).ok())
        .collect()
}

/// Iterate the objects of an array field, skipping non-object entries
pub fn objects<'a>(object: &'a JsonObject, key: &str) -> impl Iterator<Item = &'a JsonObject> {
    read_array(object, key).iter().filter_map(Value::as_object)
}
