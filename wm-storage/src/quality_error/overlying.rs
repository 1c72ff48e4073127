//! Overlying errors on the product and on seam series
//!
//! Both carry only a threshold on top of [`SimpleError`] and serialize to
//! the six keys `uuid, name, variantId, resultValue, errorType, threshold`.

use super::{ErrorScope, SimpleError, TaskContext};
use crate::attributes::AttributeCatalog;
use crate::copy_mode::CopyMode;
use crate::json::{self, JsonObject};
use crate::uuid_utils;
use serde_json::Value;
use uuid::Uuid;

macro_rules! overlying_error {
    ($(#[$meta:meta])* $name:ident, $scope:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            base: SimpleError,
            threshold: f64,
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new(uuid_utils::generate())
            }
        }

        impl $name {
            pub fn new(uuid: Uuid) -> Self {
                Self {
                    base: SimpleError::new(uuid),
                    threshold: 0.0,
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

            pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
                self.base.set_change_tracking_enabled(enabled);
            }

            pub fn duplicate(&self, mode: CopyMode) -> Self {
                Self {
                    base: self.base.duplicate(mode),
                    threshold: self.threshold,
                }
            }

            /// `Length` default becomes the threshold
            pub fn init_from_attributes(&mut self, catalog: &dyn AttributeCatalog) {
                for attribute in catalog.find_attributes_by_variant_id(&self.variant_id()) {
                    if attribute.name == "Length" {
                        self.set_threshold(attribute.default_f64());
                    }
                }
            }

            pub fn get_int_value(&self, name: &str, context: &TaskContext) -> i32 {
                self.base.get_int_value(name, context)
            }

            pub fn get_double_value(&self, name: &str) -> f64 {
                if name == "Threshold" {
                    self.threshold
                } else {
                    0.0
                }
            }

            pub fn get_string_value(&self, name: &str) -> String {
                self.base.get_string_value(name, $scope)
            }

            pub fn to_json(&self) -> Value {
                let mut object = JsonObject::new();
                self.base.write_json(&mut object, false);
                object.insert(json::THRESHOLD.into(), Value::from(self.threshold));
                Value::Object(object)
            }

            /// Returns `None` for an empty object
            pub fn from_json(object: &JsonObject) -> Option<Self> {
                if object.is_empty() {
                    return None;
                }
                Some(Self {
                    base: SimpleError::read_json(object),
                    threshold: json::read_f64(object, json::THRESHOLD, 0.0),
                })
            }
        }
    };
}

overlying_error!(
    /// Error evaluated over the whole product
    ProductError,
    ErrorScope::Product
);

overlying_error!(
    /// Error evaluated over one seam series
    SeamSeriesError,
    ErrorScope::SeamSeries
);
