//! Seam intervals, the smallest addressable unit of a seam

use crate::change_tracker::{Change, ChangeLog};
use crate::copy_mode::CopyMode;
use crate::graph_reference::GraphReference;
use crate::json::{self, JsonObject};
use crate::parameter_set::ParameterSet;
use crate::quality_error::MAX_LEVEL;
use crate::seam::Seam;
use crate::uuid_utils;
use serde_json::Value;
use uuid::Uuid;

/// Section of a seam with its own length and quality level
///
/// Graph, filter parameter set and hardware parameters are always those of
/// the owning seam; see [`IntervalRef`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeamInterval {
    uuid: Uuid,
    number: i32,
    name: String,
    length: i64,
    level: usize,
    changes: ChangeLog,
}

impl SeamInterval {
    pub fn new(uuid: Uuid, number: i32) -> Self {
        Self {
            uuid,
            number,
            name: String::new(),
            length: 0,
            level: 0,
            changes: ChangeLog::default(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn visual_number(&self) -> i32 {
        self.number + 1
    }

    pub fn set_number(&mut self, number: i32) {
        if self.number == number {
            return;
        }
        self.changes.property("number", self.number, number);
        self.number = number;
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

    /// Length in micrometers
    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn set_length(&mut self, length: i64) {
        if self.length == length {
            return;
        }
        self.changes.property("length", self.length, length);
        self.length = length;
    }

    /// Index of the interval error tier, below [`MAX_LEVEL`]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Levels outside `0..MAX_LEVEL` are ignored
    pub fn set_level(&mut self, level: usize) {
        if self.level == level || level >= MAX_LEVEL {
            return;
        }
        self.changes.property("level", self.level, level);
        self.level = level;
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.changes.set_enabled(enabled);
    }

    pub fn duplicate(&self, mode: CopyMode) -> SeamInterval {
        SeamInterval {
            uuid: uuid_utils::duplicate_uuid(mode, self.uuid),
            number: self.number,
            name: self.name.clone(),
            length: self.length,
            level: self.level,
            changes: ChangeLog::new(self.changes.is_enabled()),
        }
    }

    pub(crate) fn created_change(&self) -> Change {
        Change::SeamIntervalCreated {
            uuid: self.uuid,
            number: self.number,
        }
    }

    pub(crate) fn removed_change(&self) -> Change {
        Change::SeamIntervalRemoved {
            uuid: self.uuid,
            number: self.number,
        }
    }

    /// Length is written as a string
    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        object.insert(json::UUID.into(), json::uuid_value(&self.uuid));
        object.insert(json::NAME.into(), Value::String(self.name.clone()));
        object.insert(json::NUMBER.into(), Value::from(self.number));
        object.insert(json::LENGTH.into(), Value::String(self.length.to_string()));
        object.insert(json::LEVEL.into(), Value::from(self.level));
        Value::Object(object)
    }

    /// Returns `None` for an empty object
    pub fn from_json(object: &JsonObject) -> Option<SeamInterval> {
        if object.is_empty() {
            return None;
        }
        let uuid = json::read_optional_uuid(object, json::UUID).unwrap_or_else(uuid_utils::generate);
        let length = match object.get(json::LENGTH) {
            Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
            _ => 0,
        };
        let level = json::read_i32(object, json::LEVEL, 0).clamp(0, MAX_LEVEL as i32 - 1) as usize;
        Some(SeamInterval {
            uuid,
            number: json::read_i32(object, json::NUMBER, 0),
            name: json::read_string(object, json::NAME),
            length,
            level,
            changes: ChangeLog::default(),
        })
    }
}

/// An interval viewed through its owning seam
#[derive(Debug, Clone, Copy)]
pub struct IntervalRef<'a> {
    seam: &'a Seam,
    interval: &'a SeamInterval,
}

impl<'a> IntervalRef<'a> {
    pub fn new(seam: &'a Seam, interval: &'a SeamInterval) -> Self {
        Self { seam, interval }
    }

    pub fn seam(&self) -> &'a Seam {
        self.seam
    }

    pub fn interval(&self) -> &'a SeamInterval {
        self.interval
    }

    pub fn graph_reference(&self) -> &'a GraphReference {
        self.seam.task().graph_reference()
    }

    pub fn graph(&self) -> Uuid {
        self.seam.task().graph()
    }

    pub fn sub_graphs(&self) -> &'a [Uuid] {
        self.seam.task().sub_graphs()
    }

    pub fn graph_param_set(&self) -> Uuid {
        self.seam.task().graph_param_set()
    }

    pub fn hardware_parameters(&self) -> Option<&'a ParameterSet> {
        self.seam.task().hardware_parameters()
    }
}
