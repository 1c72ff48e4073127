//! Reference curves of a measure task
//!
//! A curve names the upper, middle and lower sample series that reference
//! boundary seam errors compare against (their `envelope`). Only the sample
//! series ids are kept here; the recorded samples are stored outside the
//! product document.

use crate::change_tracker::ChangeLog;
use crate::copy_mode::CopyMode;
use crate::json::{self, JsonObject};
use crate::uuid_utils;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCurve {
    uuid: Uuid,
    name: String,
    result_type: i32,
    reference_type: String,
    jitter: f64,
    upper: Uuid,
    middle: Uuid,
    lower: Uuid,
    changes: ChangeLog,
}

impl ReferenceCurve {
    /// New curve with fresh sample series ids
    pub fn new(uuid: Uuid, result_type: i32) -> Self {
        Self {
            uuid,
            name: String::new(),
            result_type,
            reference_type: String::new(),
            jitter: 0.0,
            upper: uuid_utils::generate(),
            middle: uuid_utils::generate(),
            lower: uuid_utils::generate(),
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

    /// Result type the curve was recorded for
    pub fn result_type(&self) -> i32 {
        self.result_type
    }

    pub fn set_result_type(&mut self, result_type: i32) {
        if self.result_type == result_type {
            return;
        }
        self.changes.property("resultType", self.result_type, result_type);
        self.result_type = result_type;
    }

    pub fn reference_type(&self) -> &str {
        &self.reference_type
    }

    pub fn set_reference_type(&mut self, reference_type: &str) {
        if self.reference_type == reference_type {
            return;
        }
        self.changes
            .property("referenceType", self.reference_type.as_str(), reference_type);
        self.reference_type = reference_type.to_string();
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn set_jitter(&mut self, jitter: f64) {
        if self.jitter == jitter {
            return;
        }
        self.changes.property("jitter", self.jitter, jitter);
        self.jitter = jitter;
    }

    pub fn upper(&self) -> Uuid {
        self.upper
    }

    pub fn middle(&self) -> Uuid {
        self.middle
    }

    pub fn lower(&self) -> Uuid {
        self.lower
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.changes.set_enabled(enabled);
    }

    /// Copy with the curve and its sample series ids following `mode`
    ///
    /// Nil sample ids stay nil.
    pub fn duplicate(&self, mode: CopyMode) -> ReferenceCurve {
        let sample = |id: Uuid| {
            if id.is_nil() {
                id
            } else {
                uuid_utils::duplicate_uuid(mode, id)
            }
        };
        ReferenceCurve {
            uuid: uuid_utils::duplicate_uuid(mode, self.uuid),
            name: self.name.clone(),
            result_type: self.result_type,
            reference_type: self.reference_type.clone(),
            jitter: self.jitter,
            upper: sample(self.upper),
            middle: sample(self.middle),
            lower: sample(self.lower),
            changes: ChangeLog::new(self.changes.is_enabled()),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        object.insert(json::UUID.into(), json::uuid_value(&self.uuid));
        object.insert(json::NAME.into(), Value::String(self.name.clone()));
        object.insert(json::TYPE.into(), Value::from(self.result_type));
        object.insert(json::REFERENCE_TYPE.into(), Value::String(self.reference_type.clone()));
        object.insert(json::JITTER.into(), Value::from(self.jitter));
        object.insert(json::UPPER.into(), json::uuid_value(&self.upper));
        object.insert(json::MIDDLE.into(), json::uuid_value(&self.middle));
        object.insert(json::LOWER.into(), json::uuid_value(&self.lower));
        Value::Object(object)
    }

    /// `None` without a uuid
    pub fn from_json(object: &JsonObject) -> Option<ReferenceCurve> {
        let uuid = json::read_optional_uuid(object, json::UUID)?;
        Some(ReferenceCurve {
            uuid,
            name: json::read_string(object, json::NAME),
            result_type: json::read_i32(object, json::TYPE, 0),
            reference_type: json::read_string(object, json::REFERENCE_TYPE),
            jitter: json::read_f64(object, json::JITTER, 0.0),
            upper: json::read_uuid(object, json::UPPER),
            middle: json::read_uuid(object, json::MIDDLE),
            lower: json::read_uuid(object, json::LOWER),
            changes: ChangeLog::default(),
        })
    }
}
