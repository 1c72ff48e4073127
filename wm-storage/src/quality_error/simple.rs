//! Fields shared by every error definition

use super::{boundary_type_for, shows_second_threshold, BoundaryType, ErrorScope, TaskContext};
use crate::change_tracker::{Change, ChangeLog};
use crate::copy_mode::CopyMode;
use crate::json::{self, JsonObject};
use crate::uuid_utils;
use serde_json::Value;
use uuid::Uuid;

pub(crate) const DEFAULT_MIN_LIMIT: f64 = -100000.0;
pub(crate) const DEFAULT_MAX_LIMIT: f64 = 100000.0;

/// Identity, variant and limits of an error definition
///
/// Limit setters here only store and log; the reconciling setters live on
/// the error types that own bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleError {
    uuid: Uuid,
    name: String,
    variant_id: Uuid,
    result_value: i32,
    error_type: i32,
    shift: f64,
    min_limit: f64,
    max_limit: f64,
    pub(crate) changes: ChangeLog,
}

impl Default for SimpleError {
    fn default() -> Self {
        Self::new(uuid_utils::generate())
    }
}

impl SimpleError {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            name: String::new(),
            variant_id: Uuid::nil(),
            result_value: 0,
            error_type: 0,
            shift: 0.0,
            min_limit: DEFAULT_MIN_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            changes: ChangeLog::default(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        if self.name == name {
            return;
        }
        self.changes.property("name", self.name.as_str(), name);
        self.name = name.to_string();
    }

    pub fn variant_id(&self) -> Uuid {
        self.variant_id
    }

    pub fn set_variant_id(&mut self, variant_id: Uuid) {
        if self.variant_id == variant_id {
            return;
        }
        self.changes.property(
            "variantId",
            uuid_utils::to_string(&self.variant_id),
            uuid_utils::to_string(&variant_id),
        );
        self.variant_id = variant_id;
    }

    pub fn result_value(&self) -> i32 {
        self.result_value
    }

    pub fn set_result_value(&mut self, value: i32) {
        if self.result_value == value {
            return;
        }
        self.changes.property("resultValue", self.result_value, value);
        self.result_value = value;
    }

    pub fn error_type(&self) -> i32 {
        self.error_type
    }

    pub fn set_error_type(&mut self, value: i32) {
        if self.error_type == value {
            return;
        }
        self.changes.property("errorType", self.error_type, value);
        self.error_type = value;
    }

    pub fn shift(&self) -> f64 {
        self.shift
    }

    pub fn set_shift(&mut self, shift: f64) {
        if self.shift == shift {
            return;
        }
        self.changes.property("shift", self.shift, shift);
        self.shift = shift;
    }

    pub fn min_limit(&self) -> f64 {
        self.min_limit
    }

    /// Returns false when the value is unchanged
    pub(crate) fn store_min_limit(&mut self, value: f64) -> bool {
        if self.min_limit == value {
            return false;
        }
        self.changes.property("minLimit", self.min_limit, value);
        self.min_limit = value;
        true
    }

    pub fn max_limit(&self) -> f64 {
        self.max_limit
    }

    /// Returns false when the value is unchanged
    pub(crate) fn store_max_limit(&mut self, value: f64) -> bool {
        if self.max_limit == value {
            return false;
        }
        self.changes.property("maxLimit", self.max_limit, value);
        self.max_limit = value;
        true
    }

    pub fn boundary_type(&self) -> BoundaryType {
        boundary_type_for(&self.variant_id)
    }

    pub fn show_second_threshold(&self) -> bool {
        shows_second_threshold(&self.variant_id)
    }

    pub fn changes(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.changes.set_enabled(enabled);
    }

    /// Result and error codes, or the owning task's numbers
    pub fn get_int_value(&self, name: &str, context: &TaskContext) -> i32 {
        match name {
            "Result" => self.result_value,
            "Error" => self.error_type,
            "SeamSeries" => context.series.unwrap_or(0),
            "Seam" => context.seam.unwrap_or(0),
            "SeamInterval" => context.interval.unwrap_or(0),
            _ => -1,
        }
    }

    /// Scope name for `"Scope"`, the nil uuid string otherwise
    pub fn get_string_value(&self, name: &str, scope: ErrorScope) -> String {
        if name == "Scope" {
            return scope.as_str().to_string();
        }
        uuid_utils::to_string(&Uuid::nil())
    }

    pub fn duplicate(&self, mode: CopyMode) -> SimpleError {
        SimpleError {
            uuid: uuid_utils::duplicate_uuid(mode, self.uuid),
            name: self.name.clone(),
            variant_id: self.variant_id,
            result_value: self.result_value,
            error_type: self.error_type,
            shift: self.shift,
            min_limit: self.min_limit,
            max_limit: self.max_limit,
            changes: ChangeLog::new(self.changes.is_enabled()),
        }
    }

    pub(crate) fn created_change(&self) -> Change {
        Change::ErrorCreated {
            uuid: self.uuid,
            variant_id: self.variant_id,
        }
    }

    pub(crate) fn removed_change(&self) -> Change {
        Change::ErrorRemoved {
            uuid: self.uuid,
            variant_id: self.variant_id,
        }
    }

    /// Identity fields; `with_limits` adds shift and limits
    pub(crate) fn write_json(&self, object: &mut JsonObject, with_limits: bool) {
        object.insert(json::UUID.into(), json::uuid_value(&self.uuid));
        object.insert(json::NAME.into(), Value::String(self.name.clone()));
        object.insert(json::VARIANT_ID.into(), json::uuid_value(&self.variant_id));
        object.insert(json::RESULT_VALUE.into(), Value::from(self.result_value));
        object.insert(json::ERROR_TYPE.into(), Value::from(self.error_type));
        if with_limits {
            object.insert(json::SHIFT.into(), Value::from(self.shift));
            object.insert(json::MIN_LIMIT.into(), Value::from(self.min_limit));
            object.insert(json::MAX_LIMIT.into(), Value::from(self.max_limit));
        }
    }

    pub(crate) fn read_json(object: &JsonObject) -> SimpleError {
        let uuid = json::read_optional_uuid(object, json::UUID).unwrap_or_else(uuid_utils::generate);
        SimpleError {
            uuid,
            name: json::read_string(object, json::NAME),
            variant_id: json::read_uuid(object, json::VARIANT_ID),
            result_value: json::read_i32(object, json::RESULT_VALUE, 0),
            error_type: json::read_i32(object, json::ERROR_TYPE, 0),
            shift: json::read_f64(object, json::SHIFT, 0.0),
            min_limit: json::read_f64(object, json::MIN_LIMIT, DEFAULT_MIN_LIMIT),
            max_limit: json::read_f64(object, json::MAX_LIMIT, DEFAULT_MAX_LIMIT),
            changes: ChangeLog::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let error = SimpleError::default();
        assert!(!error.uuid().is_nil());
        assert_eq!(error.shift(), 0.0);
        assert_eq!(error.min_limit(), -100000.0);
        assert_eq!(error.max_limit(), 100000.0);
        assert_eq!(error.result_value(), 0);
        assert_eq!(error.error_type(), 0);
        assert_eq!(error.name(), "");
        assert_eq!(error.boundary_type(), BoundaryType::Static);
    }

    #[test]
    fn test_int_value() {
        let mut error = SimpleError::default();
        error.set_result_value(105);
        error.set_error_type(64);
        let context = TaskContext {
            series: Some(2),
            seam: Some(4),
            ..Default::default()
        };

        assert_eq!(error.get_int_value("Result", &context), 105);
        assert_eq!(error.get_int_value("Error", &context), 64);
        assert_eq!(error.get_int_value("SeamSeries", &context), 2);
        assert_eq!(error.get_int_value("Seam", &context), 4);
        assert_eq!(error.get_int_value("SeamInterval", &context), 0);
        assert_eq!(error.get_int_value("Something", &context), -1);
    }

    #[test]
    fn test_string_value() {
        let error = SimpleError::default();
        assert_eq!(error.get_string_value("Scope", ErrorScope::Product), "Product");
        assert_eq!(
            error.get_string_value("Other", ErrorScope::Seam),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_setters_log_only_real_changes() {
        let mut error = SimpleError::default();
        error.set_change_tracking_enabled(true);
        error.set_name("");
        error.set_shift(0.0);
        assert!(error.changes().is_empty());

        error.set_name("Length");
        error.set_shift(1.5);
        assert_eq!(error.changes().len(), 2);
    }
}
