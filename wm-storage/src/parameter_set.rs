//! Parameter sets
//!
//! A set is either owned privately by a measure task (hardware parameters)
//! or lives in the product's filter parameter set pool and is referenced by
//! id (graph parameters).

use crate::change_tracker::{Change, ChangeLog};
use crate::copy_mode::CopyMode;
use crate::json::{self, JsonObject};
use crate::parameter::{DataType, Parameter};
use crate::uuid_utils;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    uuid: Uuid,
    parameters: Vec<Parameter>,
    changes: ChangeLog,
}

impl ParameterSet {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            parameters: Vec::new(),
            changes: ChangeLog::default(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    pub fn find_by_uuid(&self, uuid: &Uuid) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.uuid() == *uuid)
    }

    pub fn find_by_uuid_mut(&mut self, uuid: &Uuid) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.uuid() == *uuid)
    }

    /// Parameter with `name` belonging to `filter_id`
    pub fn find_by_filter_and_name(&self, filter_id: &Uuid, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.filter_id() == *filter_id && p.name() == name)
    }

    /// Create and append a parameter
    pub fn create_parameter(
        &mut self,
        uuid: Uuid,
        name: &str,
        data_type: DataType,
        value: Value,
    ) -> &mut Parameter {
        let mut parameter = Parameter::new(uuid, name, data_type, value);
        parameter.set_change_tracking_enabled(self.changes.is_enabled());
        self.add_parameter(parameter)
    }

    pub fn add_parameter(&mut self, mut parameter: Parameter) -> &mut Parameter {
        parameter.set_change_tracking_enabled(self.changes.is_enabled());
        self.changes.record(parameter.created_change());
        self.parameters.push(parameter);
        let last = self.parameters.len() - 1;
        &mut self.parameters[last]
    }

    pub fn remove_parameter(&mut self, uuid: &Uuid) -> Option<Parameter> {
        let index = self.parameters.iter().position(|p| p.uuid() == *uuid)?;
        Some(self.parameters.remove(index))
    }

    pub fn duplicate(&self, mode: CopyMode) -> ParameterSet {
        ParameterSet {
            uuid: uuid_utils::duplicate_uuid(mode, self.uuid),
            parameters: self.parameters.iter().map(|p| p.duplicate(mode)).collect(),
            changes: ChangeLog::new(self.changes.is_enabled()),
        }
    }

    pub fn is_change_tracking_enabled(&self) -> bool {
        self.changes.is_enabled()
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.changes.set_enabled(enabled);
        for parameter in &mut self.parameters {
            parameter.set_change_tracking_enabled(enabled);
        }
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.changes
    }

    /// Own entries followed by `{"parameters": [{"<uuid>": [...]}]}` for
    /// every modified parameter
    pub fn changes(&self) -> Vec<Value> {
        let mut changes = self.changes.to_json();
        let modified: Vec<Value> = self
            .parameters
            .iter()
            .filter(|p| !p.changes().is_empty())
            .map(|p| {
                let key = uuid_utils::to_string(&p.uuid());
                json!({ key: p.changes().to_json() })
            })
            .collect();
        if !modified.is_empty() {
            changes.push(json!({ "parameters": modified }));
        }
        changes
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty() || self.parameters.iter().any(|p| !p.changes().is_empty())
    }

    /// Flat `parameters` array
    pub fn to_json(&self) -> Value {
        json!({
            "uuid": json::uuid_value(&self.uuid),
            "parameters": self.parameters.iter().map(Parameter::to_json).collect::<Vec<_>>(),
        })
    }

    /// Parameters grouped per originating filter, in first-seen filter order
    pub fn to_json_grouped_by_filter(&self) -> Value {
        let mut groups: Vec<(Uuid, Vec<Value>)> = Vec::new();
        for parameter in &self.parameters {
            match groups.iter_mut().find(|(filter, _)| *filter == parameter.filter_id()) {
                Some((_, list)) => list.push(parameter.to_json()),
                None => groups.push((parameter.filter_id(), vec![parameter.to_json()])),
            }
        }
        let groups: Vec<Value> = groups
            .into_iter()
            .map(|(filter, parameters)| {
                json!({
                    "filterId": json::uuid_value(&filter),
                    "parameters": parameters,
                })
            })
            .collect();
        json!({
            "uuid": json::uuid_value(&self.uuid),
            "parametersGroupedByFilter": groups,
        })
    }

    /// Accepts both the flat and the grouped layout
    ///
    /// Returns `None` for an empty object. A missing uuid is generated.
    pub fn from_json(object: &JsonObject) -> Option<ParameterSet> {
        if object.is_empty() {
            return None;
        }
        let uuid = json::read_optional_uuid(object, json::UUID).unwrap_or_else(uuid_utils::generate);
        let mut set = ParameterSet::new(uuid);

        set.parameters
            .extend(json::objects(object, json::PARAMETERS).filter_map(Parameter::from_json));

        for group in json::objects(object, json::PARAMETERS_GROUPED_BY_FILTER) {
            let filter = json::read_optional_uuid(group, json::FILTER_ID);
            for mut parameter in json::objects(group, json::PARAMETERS).filter_map(Parameter::from_json) {
                if let Some(filter) = filter {
                    if parameter.filter_id().is_nil() {
                        parameter.set_filter_id(filter);
                    }
                }
                set.parameters.push(parameter);
            }
        }
        Some(set)
    }

    pub(crate) fn added_change(&self) -> Change {
        Change::ParameterSetAdded { uuid: self.uuid }
    }
}
