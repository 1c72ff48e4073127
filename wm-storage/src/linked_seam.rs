//! Link entries: repeated invocations of an already defined seam
//!
//! A [`LinkedSeam`] only carries its own identity and a label. Everything a
//! measurement needs (graph, parameters, intervals, errors) comes from the
//! target seam, which is referenced by uuid and owns the link.

use crate::change_tracker::{Change, ChangeLog};
use crate::copy_mode::CopyMode;
use crate::json::{self, JsonObject};
use crate::uuid_utils;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct LinkedSeam {
    uuid: Uuid,
    number: i32,
    name: String,
    label: String,
    target: Uuid,
    changes: ChangeLog,
}

impl LinkedSeam {
    /// Build a link for `target`
    ///
    /// Returns `None` when the label does not parse as an integer; the
    /// label doubles as the link's seam number.
    pub fn new(uuid: Uuid, target: Uuid, target_name: &str, label: &str) -> Option<LinkedSeam> {
        let number = label_number(label)?;
        Some(LinkedSeam {
            uuid,
            number,
            name: target_name.to_string(),
            label: label.to_string(),
            target,
            changes: ChangeLog::default(),
        })
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

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Uuid of the seam this link repeats
    pub fn target(&self) -> Uuid {
        self.target
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.changes.set_enabled(enabled);
    }

    /// Copy attached to `target`
    pub fn duplicate(&self, mode: CopyMode, target: Uuid) -> LinkedSeam {
        LinkedSeam {
            uuid: uuid_utils::duplicate_uuid(mode, self.uuid),
            number: self.number,
            name: self.name.clone(),
            label: self.label.clone(),
            target,
            changes: ChangeLog::new(self.changes.is_enabled()),
        }
    }

    pub(crate) fn created_change(&self) -> Change {
        Change::LinkedSeamCreated {
            uuid: self.uuid,
            label: self.label.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        object.insert(json::UUID.into(), json::uuid_value(&self.uuid));
        object.insert(json::NAME.into(), Value::String(self.name.clone()));
        object.insert(json::NUMBER.into(), Value::from(self.number));
        object.insert(json::LABEL.into(), Value::String(self.label.clone()));
        Value::Object(object)
    }

    /// Reads a link nested in the target's `linkedSeams` array
    ///
    /// The number is taken from the document when present and otherwise
    /// derived from the label. Empty objects and links whose label is
    /// not numeric are skipped.
    pub fn from_json(object: &JsonObject, target: Uuid) -> Option<LinkedSeam> {
        if object.is_empty() {
            return None;
        }
        let label = json::read_string(object, json::LABEL);
        let number = match object.get(json::NUMBER) {
            Some(_) => json::read_i32(object, json::NUMBER, 0),
            None => label_number(&label)?,
        };
        Some(LinkedSeam {
            uuid: json::read_optional_uuid(object, json::UUID).unwrap_or_else(uuid_utils::generate),
            number,
            name: json::read_string(object, json::NAME),
            label,
            target,
            changes: ChangeLog::default(),
        })
    }
}

/// Seam number encoded by a link label
pub fn label_number(label: &str) -> Option<i32> {
    label.trim().parse::<i32>().ok()
}
