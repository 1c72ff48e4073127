//! Attribute catalog interface
//!
//! Error variants take their default thresholds and limits from catalog
//! attributes looked up by variant id. Loading the design-time catalog files
//! happens elsewhere; [`AttributeList`] is an in-memory catalog built from an
//! already parsed JSON array.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Catalog entry describing one configurable attribute of a variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub variant_id: Uuid,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default)]
    pub min_value: Value,
    #[serde(default)]
    pub max_value: Value,
}

impl Attribute {
    /// Default value as a number, 0 when not numeric
    pub fn default_f64(&self) -> f64 {
        match &self.default_value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

/// Lookup of catalog attributes
pub trait AttributeCatalog {
    fn find_attributes_by_variant_id(&self, variant_id: &Uuid) -> Vec<&Attribute>;
}

/// Catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct AttributeList {
    attributes: Vec<Attribute>,
}

impl AttributeList {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// Parse `[{name, variantId, defaultValue, ...}]` or `{"attributes": [...]}`
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value.get("attributes").unwrap_or(value);
        let attributes: Vec<Attribute> = serde_json::from_value(array.clone())?;
        Ok(Self { attributes })
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl AttributeCatalog for AttributeList {
    fn find_attributes_by_variant_id(&self, variant_id: &Uuid) -> Vec<&Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.variant_id == *variant_id)
            .collect()
    }
}
