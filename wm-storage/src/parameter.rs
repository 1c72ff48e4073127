//! Typed key/value parameters

use crate::change_tracker::{Change, ChangeLog};
use crate::copy_mode::CopyMode;
use crate::json::{self, JsonObject};
use crate::uuid_utils;
use serde_json::Value;
use uuid::Uuid;

/// Value type of a [`Parameter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    UnsignedInteger,
    Float,
    Double,
    Boolean,
    Enumeration,
    Error,
    Result,
    Sensor,
    String,
    SeamFigure,
    WobbleFigure,
    File,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Integer => "int",
            DataType::UnsignedInteger => "uint",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Boolean => "bool",
            DataType::Enumeration => "enum",
            DataType::Error => "error",
            DataType::Result => "result",
            DataType::Sensor => "sensor",
            DataType::String => "string",
            DataType::SeamFigure => "seamFigure",
            DataType::WobbleFigure => "wobbleFigure",
            DataType::File => "file",
        }
    }

    /// Parse the document form, including the legacy `fehler` and `messwert`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "int" => Some(DataType::Integer),
            "uint" => Some(DataType::UnsignedInteger),
            "float" => Some(DataType::Float),
            "double" => Some(DataType::Double),
            "bool" => Some(DataType::Boolean),
            "enum" => Some(DataType::Enumeration),
            "error" | "fehler" => Some(DataType::Error),
            "result" | "messwert" => Some(DataType::Result),
            "sensor" => Some(DataType::Sensor),
            "string" => Some(DataType::String),
            "seamFigure" => Some(DataType::SeamFigure),
            "wobbleFigure" => Some(DataType::WobbleFigure),
            "file" => Some(DataType::File),
            _ => None,
        }
    }

    /// Coerce a stored value into the representation of this type
    pub fn normalize(&self, value: &Value) -> Value {
        match self {
            DataType::Integer
            | DataType::UnsignedInteger
            | DataType::Enumeration
            | DataType::Error
            | DataType::Result
            | DataType::Sensor => match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().map(|f| f as i64))
                    .map(Value::from)
                    .unwrap_or(Value::from(0)),
                Value::String(s) => Value::from(s.trim().parse::<i64>().unwrap_or(0)),
                Value::Bool(b) => Value::from(i64::from(*b)),
                _ => Value::from(0),
            },
            DataType::Float | DataType::Double => match value {
                Value::Number(n) => Value::from(n.as_f64().unwrap_or(0.0)),
                Value::String(s) => Value::from(s.trim().parse::<f64>().unwrap_or(0.0)),
                _ => Value::from(0.0),
            },
            DataType::Boolean => match value {
                Value::Bool(b) => Value::Bool(*b),
                Value::Number(n) => Value::Bool(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
                Value::String(s) => Value::Bool(s == "true"),
                _ => Value::Bool(false),
            },
            DataType::String | DataType::SeamFigure | DataType::WobbleFigure | DataType::File => {
                match value {
                    Value::String(_) => value.clone(),
                    Value::Null => Value::String(String::new()),
                    other => Value::String(other.to_string()),
                }
            }
        }
    }
}

/// A single typed parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    uuid: Uuid,
    name: String,
    type_id: Uuid,
    filter_id: Uuid,
    data_type: DataType,
    value: Value,
    default_value: Option<Value>,
    changes: ChangeLog,
}

impl Parameter {
    pub fn new(uuid: Uuid, name: impl Into<String>, data_type: DataType, value: Value) -> Self {
        Self {
            uuid,
            name: name.into(),
            type_id: Uuid::nil(),
            filter_id: Uuid::nil(),
            data_type,
            value: data_type.normalize(&value),
            default_value: None,
            changes: ChangeLog::default(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> Uuid {
        self.type_id
    }

    pub fn set_type_id(&mut self, type_id: Uuid) {
        self.type_id = type_id;
    }

    pub fn filter_id(&self) -> Uuid {
        self.filter_id
    }

    pub fn set_filter_id(&mut self, filter_id: Uuid) {
        self.filter_id = filter_id;
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set_value(&mut self, value: Value) {
        let value = self.data_type.normalize(&value);
        if value == self.value {
            return;
        }
        self.changes
            .property(json::VALUE, self.value.clone(), value.clone());
        self.value = value;
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn set_default_value(&mut self, value: Option<Value>) {
        self.default_value = value.map(|v| self.data_type.normalize(&v));
    }

    pub fn changes(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.changes.set_enabled(enabled);
    }

    pub fn duplicate(&self, mode: CopyMode) -> Parameter {
        Parameter {
            uuid: uuid_utils::duplicate_uuid(mode, self.uuid),
            name: self.name.clone(),
            type_id: self.type_id,
            filter_id: self.filter_id,
            data_type: self.data_type,
            value: self.value.clone(),
            default_value: self.default_value.clone(),
            changes: ChangeLog::new(self.changes.is_enabled()),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        object.insert(json::UUID.into(), json::uuid_value(&self.uuid));
        object.insert(json::NAME.into(), Value::String(self.name.clone()));
        object.insert(json::TYPE.into(), Value::String(self.data_type.as_str().into()));
        object.insert(json::TYPE_ID.into(), json::uuid_value(&self.type_id));
        object.insert(json::FILTER_ID.into(), json::uuid_value(&self.filter_id));
        object.insert(json::VALUE.into(), self.value.clone());
        if let Some(default) = &self.default_value {
            object.insert(json::DEFAULT.into(), default.clone());
        }
        Value::Object(object)
    }

    /// Returns `None` for an empty object or an unknown type string
    pub fn from_json(object: &JsonObject) -> Option<Parameter> {
        if object.is_empty() {
            return None;
        }
        let data_type = object
            .get(json::TYPE)
            .and_then(Value::as_str)
            .and_then(DataType::parse)?;
        let uuid = json::read_optional_uuid(object, json::UUID).unwrap_or_else(uuid_utils::generate);
        let value = object.get(json::VALUE).cloned().unwrap_or(Value::Null);

        let mut parameter = Parameter::new(uuid, json::read_string(object, json::NAME), data_type, value);
        parameter.type_id = json::read_uuid(object, json::TYPE_ID);
        parameter.filter_id = json::read_uuid(object, json::FILTER_ID);
        parameter.set_default_value(object.get(json::DEFAULT).cloned());
        Some(parameter)
    }

    pub(crate) fn created_change(&self) -> Change {
        Change::ParameterCreated {
            uuid: self.uuid,
            name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_type_names() {
        assert_eq!(DataType::parse("fehler"), Some(DataType::Error));
        assert_eq!(DataType::parse("messwert"), Some(DataType::Result));
        assert_eq!(DataType::parse("seamFigure"), Some(DataType::SeamFigure));
        assert_eq!(DataType::parse("unknown"), None);
        assert_eq!(DataType::Error.as_str(), "error");
    }

    #[test]
    fn test_value_normalized_by_type() {
        let p = Parameter::new(Uuid::nil(), "a", DataType::Integer, json!("42"));
        assert_eq!(p.value(), &json!(42));

        let p = Parameter::new(Uuid::nil(), "b", DataType::Double, json!(2));
        assert_eq!(p.value().as_f64(), Some(2.0));

        let p = Parameter::new(Uuid::nil(), "c", DataType::Boolean, json!(1));
        assert_eq!(p.value(), &json!(true));
    }

    #[test]
    fn test_set_value_logs_change() {
        let mut p = Parameter::new(Uuid::nil(), "a", DataType::Integer, json!(1));
        p.set_change_tracking_enabled(true);

        p.set_value(json!(1));
        assert!(p.changes().is_empty());

        p.set_value(json!(5));
        assert_eq!(p.changes().len(), 1);
        assert_eq!(p.value(), &json!(5));
    }

    #[test]
    fn test_from_json() {
        let id = Uuid::new_v4();
        let filter = Uuid::new_v4();
        let value = json!({
            "uuid": id.to_string(),
            "name": "threshold",
            "type": "double",
            "typeId": Uuid::nil().to_string(),
            "filterId": filter.to_string(),
            "value": 1.5,
            "default": "2.5"
        });
        let p = Parameter::from_json(value.as_object().unwrap()).unwrap();
        assert_eq!(p.uuid(), id);
        assert_eq!(p.filter_id(), filter);
        assert_eq!(p.value().as_f64(), Some(1.5));
        assert_eq!(p.default_value().and_then(Value::as_f64), Some(2.5));

        assert!(Parameter::from_json(&JsonObject::new()).is_none());
        assert!(Parameter::from_json(json!({"type": "nope"}).as_object().unwrap()).is_none());
    }

    #[test]
    fn test_duplicate() {
        let p = Parameter::new(Uuid::new_v4(), "a", DataType::String, json!("x"));
        assert_eq!(p.duplicate(CopyMode::Identical).uuid(), p.uuid());
        let copy = p.duplicate(CopyMode::WithDifferentIds);
        assert_ne!(copy.uuid(), p.uuid());
        assert_eq!(copy.value(), p.value());
    }
}
