//! Error evaluated over a whole measure task

use super::{BoundaryType, ErrorScope, SimpleError, TaskContext};
use crate::attributes::AttributeCatalog;
use crate::copy_mode::CopyMode;
use crate::filter_parameter::{self, ErrorValues, FilterParameter};
use crate::json::{self, JsonObject};
use crate::uuid_utils;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Scalar bounds error ("sum error") of a seam or seam series
///
/// Reference boundary variants compare against an envelope curve and do not
/// apply the shift to min and max.
#[derive(Debug, Clone, PartialEq)]
pub struct SeamError {
    base: SimpleError,
    threshold: f64,
    min: f64,
    max: f64,
    second_threshold: f64,
    envelope: Uuid,
    use_middle_curve_as_reference: bool,
}

impl Default for SeamError {
    fn default() -> Self {
        Self::new(uuid_utils::generate())
    }
}

impl SeamError {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            base: SimpleError::new(uuid),
            threshold: 0.0,
            min: 0.0,
            max: 0.0,
            second_threshold: 0.0,
            envelope: Uuid::nil(),
            use_middle_curve_as_reference: false,
        }
    }

    pub fn base(&self) -> &SimpleError {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SimpleError {
        &mut self.base
    }

    pub fn uuid(&self) -> Uuid {
        self.base.uuid()
    }

    pub fn variant_id(&self) -> Uuid {
        self.base.variant_id()
    }

    pub fn boundary_type(&self) -> BoundaryType {
        self.base.boundary_type()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, value: f64) {
        if self.threshold == value {
            return;
        }
        self.base.changes.property("Threshold", self.threshold, value);
        self.threshold = value;
    }

    pub fn second_threshold(&self) -> f64 {
        self.second_threshold
    }

    pub fn set_second_threshold(&mut self, value: f64) {
        if self.second_threshold == value {
            return;
        }
        self.base
            .changes
            .property("SecondThreshold", self.second_threshold, value);
        self.second_threshold = value;
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn set_min(&mut self, value: f64) {
        if self.min == value {
            return;
        }
        self.base.changes.property("Min", self.min, value);
        self.min = value;
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn set_max(&mut self, value: f64) {
        if self.max == value {
            return;
        }
        self.base.changes.property("Max", self.max, value);
        self.max = value;
    }

    pub fn shift(&self) -> f64 {
        self.base.shift()
    }

    pub fn set_shift(&mut self, shift: f64) {
        self.base.set_shift(shift);
    }

    pub fn min_limit(&self) -> f64 {
        self.base.min_limit()
    }

    pub fn max_limit(&self) -> f64 {
        self.base.max_limit()
    }

    pub fn set_min_limit(&mut self, value: f64) {
        if self.base.store_min_limit(value) {
            self.update_lower_bounds();
        }
    }

    pub fn set_max_limit(&mut self, value: f64) {
        if self.base.store_max_limit(value) {
            self.update_upper_bounds();
        }
    }

    pub fn envelope(&self) -> Uuid {
        self.envelope
    }

    pub fn set_envelope(&mut self, envelope: Uuid) {
        if self.envelope == envelope {
            return;
        }
        self.base.changes.property(
            "envelope",
            uuid_utils::to_string(&self.envelope),
            uuid_utils::to_string(&envelope),
        );
        self.envelope = envelope;
    }

    /// Point the envelope at the copied curve after a task copy
    ///
    /// An envelope without a copied curve is cleared for fresh ids and
    /// kept for identical copies.
    pub(crate) fn remap_envelope(&mut self, mode: CopyMode, curves: &HashMap<Uuid, Uuid>) {
        match curves.get(&self.envelope) {
            Some(copy) => self.envelope = *copy,
            None if mode == CopyMode::WithDifferentIds => self.envelope = Uuid::nil(),
            None => {}
        }
    }

    pub fn use_middle_curve_as_reference(&self) -> bool {
        self.use_middle_curve_as_reference
    }

    pub fn set_use_middle_curve_as_reference(&mut self, value: bool) {
        if self.use_middle_curve_as_reference == value {
            return;
        }
        self.base.changes.property(
            "useMiddleCurveAsReference",
            self.use_middle_curve_as_reference,
            value,
        );
        self.use_middle_curve_as_reference = value;
    }

    pub fn update_lower_bounds(&mut self) {
        let min_limit = self.min_limit();
        if self.min + self.shift() < min_limit {
            self.set_shift(0.0);
        }
        if self.min < min_limit {
            self.set_min(min_limit);
        }
        if self.min > self.max {
            self.set_max(min_limit);
        }
        if self.max > self.max_limit() {
            self.set_max_limit(min_limit);
        }
    }

    pub fn update_upper_bounds(&mut self) {
        let max_limit = self.max_limit();
        if self.max + self.shift() > max_limit {
            self.set_shift(0.0);
        }
        if self.max > max_limit {
            self.set_max(max_limit);
        }
        if self.max < self.min {
            self.set_min(max_limit);
        }
        if self.min < self.min_limit() {
            self.set_min_limit(max_limit);
        }
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.base.set_change_tracking_enabled(enabled);
    }

    pub fn duplicate(&self, mode: CopyMode) -> SeamError {
        SeamError {
            base: self.base.duplicate(mode),
            ..self.clone()
        }
    }

    /// Min/Max/Length defaults from the catalog
    pub fn init_from_attributes(&mut self, catalog: &dyn AttributeCatalog) {
        for attribute in catalog.find_attributes_by_variant_id(&self.variant_id()) {
            match attribute.name.as_str() {
                "Min" => self.set_min(attribute.default_f64()),
                "Max" => self.set_max(attribute.default_f64()),
                "Length" => self.set_threshold(attribute.default_f64()),
                _ => {}
            }
        }
    }

    pub fn get_int_value(&self, name: &str, context: &TaskContext) -> i32 {
        self.base.get_int_value(name, context)
    }

    /// Min and Max include the shift for static boundaries only
    pub fn get_double_value(&self, name: &str, context: &TaskContext) -> f64 {
        let shift = match self.boundary_type() {
            BoundaryType::Static => self.shift(),
            BoundaryType::Reference => 0.0,
        };
        match name {
            "Min" => self.min + shift,
            "Max" => self.max + shift,
            "Threshold" => self.threshold,
            "SecondThreshold" => self.second_threshold,
            "LwmSignalThreshold" => context.lwm_signal_threshold,
            _ => 0.0,
        }
    }

    /// `"Reference"` yields the envelope id
    pub fn get_string_value(&self, name: &str, scope: ErrorScope) -> String {
        if name == "Reference" {
            return uuid_utils::to_string(&self.envelope);
        }
        self.base.get_string_value(name, scope)
    }

    /// Thirteen pipeline parameters keyed by this error's uuid
    pub fn to_parameter_list(&self, scope: ErrorScope, context: &TaskContext) -> Vec<FilterParameter> {
        let values = SeamErrorValues {
            error: self,
            scope,
            context: *context,
        };
        filter_parameter::error_parameters(&values, self.uuid(), self.variant_id())
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        self.base.write_json(&mut object, true);
        object.insert(json::THRESHOLD.into(), Value::from(self.threshold));
        object.insert(json::MIN.into(), Value::from(self.min));
        object.insert(json::MAX.into(), Value::from(self.max));
        if self.boundary_type() == BoundaryType::Reference {
            object.insert(json::ENVELOPE.into(), json::uuid_value(&self.envelope));
            object.insert(
                json::USE_MIDDLE_CURVE_AS_REFERENCE.into(),
                Value::Bool(self.use_middle_curve_as_reference),
            );
        }
        object.insert(json::SECOND_THRESHOLD.into(), Value::from(self.second_threshold));
        Value::Object(object)
    }

    /// Legacy `length` overrides `threshold`. Returns `None` for an empty
    /// object.
    pub fn from_json(object: &JsonObject) -> Option<SeamError> {
        if object.is_empty() {
            return None;
        }
        let mut error = SeamError {
            base: SimpleError::read_json(object),
            threshold: json::read_f64(object, json::THRESHOLD, 0.0),
            min: json::read_f64(object, json::MIN, 0.0),
            max: json::read_f64(object, json::MAX, 0.0),
            second_threshold: json::read_f64(object, json::SECOND_THRESHOLD, 0.0),
            envelope: Uuid::nil(),
            use_middle_curve_as_reference: false,
        };
        if error.boundary_type() == BoundaryType::Reference {
            error.envelope = json::read_uuid(object, json::ENVELOPE);
            error.use_middle_curve_as_reference =
                json::read_bool(object, json::USE_MIDDLE_CURVE_AS_REFERENCE, false);
        }
        if object.contains_key(json::LENGTH) {
            error.threshold = json::read_f64(object, json::LENGTH, 0.0);
        }
        error.update_lower_bounds();
        error.update_upper_bounds();
        Some(error)
    }
}

struct SeamErrorValues<'a> {
    error: &'a SeamError,
    scope: ErrorScope,
    context: TaskContext,
}

impl ErrorValues for SeamErrorValues<'_> {
    fn int_value(&self, name: &str) -> i32 {
        self.error.get_int_value(name, &self.context)
    }

    fn double_value(&self, name: &str) -> f64 {
        self.error.get_double_value(name, &self.context)
    }

    fn string_value(&self, name: &str) -> String {
        self.error.get_string_value(name, self.scope)
    }

    fn bool_value(&self, _name: &str) -> bool {
        self.error.use_middle_curve_as_reference
    }
}
