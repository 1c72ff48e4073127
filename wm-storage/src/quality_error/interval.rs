//! Per-interval error definition with tiered levels

use super::{ErrorScope, LevelConfig, SimpleError, TaskContext, MAX_LEVEL};
use crate::attributes::AttributeCatalog;
use crate::copy_mode::CopyMode;
use crate::filter_parameter::{self, ErrorValues, FilterParameter};
use crate::json::{self, JsonObject};
use crate::uuid_utils;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Error evaluated on every interval of a seam
///
/// Each interval is bound to one of [`MAX_LEVEL`] tiers and gets its own
/// error instance id, kept in `error_ids` keyed by interval uuid.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalError {
    base: SimpleError,
    levels: [LevelConfig; MAX_LEVEL],
    error_ids: BTreeMap<Uuid, Uuid>,
}

impl Default for IntervalError {
    fn default() -> Self {
        Self::new(uuid_utils::generate())
    }
}

impl IntervalError {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            base: SimpleError::new(uuid),
            levels: [LevelConfig::default(); MAX_LEVEL],
            error_ids: BTreeMap::new(),
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

    pub fn levels(&self) -> &[LevelConfig; MAX_LEVEL] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> Option<&LevelConfig> {
        self.levels.get(index)
    }

    pub fn min(&self, level: usize) -> f64 {
        self.levels.get(level).map(|l| l.min).unwrap_or(0.0)
    }

    pub fn max(&self, level: usize) -> f64 {
        self.levels.get(level).map(|l| l.max).unwrap_or(0.0)
    }

    pub fn threshold(&self, level: usize) -> f64 {
        self.levels.get(level).map(|l| l.threshold).unwrap_or(0.0)
    }

    pub fn second_threshold(&self, level: usize) -> f64 {
        self.levels.get(level).map(|l| l.second_threshold).unwrap_or(0.0)
    }

    pub fn set_min(&mut self, level: usize, value: f64) {
        self.set_level_value(level, "Min", value, |l| &mut l.min);
    }

    pub fn set_max(&mut self, level: usize, value: f64) {
        self.set_level_value(level, "Max", value, |l| &mut l.max);
    }

    pub fn set_threshold(&mut self, level: usize, value: f64) {
        self.set_level_value(level, "Threshold", value, |l| &mut l.threshold);
    }

    pub fn set_second_threshold(&mut self, level: usize, value: f64) {
        self.set_level_value(level, "SecondThreshold", value, |l| &mut l.second_threshold);
    }

    fn set_level_value(
        &mut self,
        level: usize,
        field: &str,
        value: f64,
        select: impl Fn(&mut LevelConfig) -> &mut f64,
    ) {
        let Some(config) = self.levels.get_mut(level) else {
            return;
        };
        let slot = select(config);
        if *slot == value {
            return;
        }
        let old = *slot;
        *slot = value;
        self.base
            .changes
            .property(&format!("Level {} {}", level, field), old, value);
    }

    pub fn lowest_min(&self) -> f64 {
        self.levels.iter().map(|l| l.min).fold(f64::INFINITY, f64::min)
    }

    pub fn highest_max(&self) -> f64 {
        self.levels.iter().map(|l| l.max).fold(f64::NEG_INFINITY, f64::max)
    }

    /// Pull every level back inside a raised lower limit
    pub fn update_lower_bounds(&mut self) {
        for i in 0..MAX_LEVEL {
            let min_limit = self.min_limit();
            if self.min(i) + self.shift() < min_limit {
                self.set_shift(0.0);
            }
            if self.min(i) < min_limit {
                self.set_min(i, min_limit);
            }
            if self.min(i) > self.max(i) {
                self.set_max(i, min_limit);
            }
            if self.max(i) > self.max_limit() {
                self.set_max_limit(min_limit);
            }
        }
    }

    /// Pull every level back inside a lowered upper limit
    pub fn update_upper_bounds(&mut self) {
        for i in 0..MAX_LEVEL {
            let max_limit = self.max_limit();
            if self.max(i) + self.shift() > max_limit {
                self.set_shift(0.0);
            }
            if self.max(i) > max_limit {
                self.set_max(i, max_limit);
            }
            if self.max(i) < self.min(i) {
                self.set_min(i, max_limit);
            }
            if self.min(i) < self.min_limit() {
                self.set_min_limit(max_limit);
            }
        }
    }

    pub fn error_ids(&self) -> &BTreeMap<Uuid, Uuid> {
        &self.error_ids
    }

    /// Error instance id for an interval
    pub fn error_id(&self, interval: &Uuid) -> Option<Uuid> {
        self.error_ids.get(interval).copied()
    }

    pub fn add_interval(&mut self, interval: Uuid) {
        self.error_ids.entry(interval).or_insert_with(uuid_utils::generate);
    }

    pub fn remove_interval(&mut self, interval: &Uuid) {
        self.error_ids.remove(interval);
    }

    /// Copy for a duplicated seam whose intervals are `intervals`
    ///
    /// Identical copies keep the id map; otherwise every new interval gets
    /// a fresh error instance id.
    pub fn duplicate(&self, mode: CopyMode, intervals: &[Uuid]) -> IntervalError {
        let error_ids = match mode {
            CopyMode::Identical => self.error_ids.clone(),
            CopyMode::WithDifferentIds => intervals
                .iter()
                .map(|interval| (*interval, uuid_utils::generate()))
                .collect(),
        };
        IntervalError {
            base: self.base.duplicate(mode),
            levels: self.levels,
            error_ids,
        }
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.base.set_change_tracking_enabled(enabled);
    }

    /// Min/Max/Length/SecondThreshold defaults applied to every level
    pub fn init_from_attributes(&mut self, catalog: &dyn AttributeCatalog) {
        for attribute in catalog.find_attributes_by_variant_id(&self.variant_id()) {
            let value = attribute.default_f64();
            for level in 0..MAX_LEVEL {
                match attribute.name.as_str() {
                    "Min" => self.set_min(level, value),
                    "Max" => self.set_max(level, value),
                    "Length" => self.set_threshold(level, value),
                    "SecondThreshold" => self.set_second_threshold(level, value),
                    _ => {}
                }
            }
        }
    }

    pub fn get_int_value(&self, name: &str, context: &TaskContext) -> i32 {
        self.base.get_int_value(name, context)
    }

    /// Min and Max include the shift
    pub fn get_double_value(&self, name: &str, level: usize, context: &TaskContext) -> f64 {
        match name {
            "Min" => self.min(level) + self.shift(),
            "Max" => self.max(level) + self.shift(),
            "Threshold" => self.threshold(level),
            "SecondThreshold" => self.second_threshold(level),
            "LwmSignalThreshold" => context.lwm_signal_threshold,
            _ => 0.0,
        }
    }

    pub fn get_string_value(&self, name: &str) -> String {
        self.base.get_string_value(name, ErrorScope::SeamInterval)
    }

    /// Pipeline parameters for every interval `(uuid, number, level)`
    ///
    /// Intervals without an error instance id get a fresh one.
    pub fn to_parameter_list(
        &self,
        intervals: &[(Uuid, i32, usize)],
        context: &TaskContext,
    ) -> Vec<FilterParameter> {
        let mut list = Vec::with_capacity(filter_parameter::ERROR_PARAMETERS.len() * intervals.len());
        for (uuid, number, level) in intervals {
            let filter_id = self.error_id(uuid).unwrap_or_else(uuid_utils::generate);
            let values = IntervalValues {
                error: self,
                level: *level,
                context: TaskContext {
                    interval: Some(*number),
                    ..*context
                },
            };
            list.extend(filter_parameter::error_parameters(&values, filter_id, self.variant_id()));
        }
        list
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        self.base.write_json(&mut object, true);

        let mut levels = JsonObject::new();
        for (i, level) in self.levels.iter().enumerate() {
            levels.insert(format!("level {}", i + 1), level.to_json());
        }
        object.insert(json::INTERVAL_LEVELS.into(), Value::Object(levels));

        let ids: Vec<Value> = self
            .error_ids
            .iter()
            .map(|(interval, error)| {
                json!({
                    "interval": json::uuid_value(interval),
                    "error": json::uuid_value(error),
                })
            })
            .collect();
        object.insert(json::INTERVAL_IDS.into(), Value::Array(ids));
        Value::Object(object)
    }

    /// Reads `intervalLevels` and the legacy `levelOne*`/`levelTwo*` keys,
    /// then reconciles bounds. Returns `None` for an empty object.
    pub fn from_json(object: &JsonObject) -> Option<IntervalError> {
        if object.is_empty() {
            return None;
        }
        let mut error = IntervalError {
            base: SimpleError::read_json(object),
            levels: [LevelConfig::default(); MAX_LEVEL],
            error_ids: BTreeMap::new(),
        };

        for entry in json::objects(object, json::INTERVAL_IDS) {
            let interval = json::read_optional_uuid(entry, json::INTERVAL);
            let id = json::read_optional_uuid(entry, json::ERROR);
            if let (Some(interval), Some(id)) = (interval, id) {
                error.error_ids.insert(interval, id);
            }
        }

        if let Some(levels) = json::read_object(object, json::INTERVAL_LEVELS) {
            for (i, level) in error.levels.iter_mut().enumerate() {
                if let Some(config) = json::read_object(levels, &format!("level {}", i + 1)) {
                    *level = LevelConfig::from_json(config);
                }
            }
        }

        let legacy: [(&str, usize, fn(&mut IntervalError, usize, f64)); 6] = [
            ("levelOneLength", 0, IntervalError::set_threshold),
            ("levelTwoLength", 1, IntervalError::set_threshold),
            ("levelOneMin", 0, IntervalError::set_min),
            ("levelTwoMin", 1, IntervalError::set_min),
            ("levelOneMax", 0, IntervalError::set_max),
            ("levelTwoMax", 1, IntervalError::set_max),
        ];
        for (key, level, apply) in legacy {
            if object.contains_key(key) {
                let value = json::read_f64(object, key, 0.0);
                apply(&mut error, level, value);
            }
        }

        error.update_lower_bounds();
        error.update_upper_bounds();
        Some(error)
    }
}

struct IntervalValues<'a> {
    error: &'a IntervalError,
    level: usize,
    context: TaskContext,
}

impl ErrorValues for IntervalValues<'_> {
    fn int_value(&self, name: &str) -> i32 {
        self.error.get_int_value(name, &self.context)
    }

    fn double_value(&self, name: &str) -> f64 {
        self.error.get_double_value(name, self.level, &self.context)
    }

    fn string_value(&self, name: &str) -> String {
        self.error.get_string_value(name)
    }

    fn bool_value(&self, _name: &str) -> bool {
        false
    }
}
