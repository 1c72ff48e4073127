//! Product document: JSON layout, loading, saving and lazy parameter sets

use super::Product;
use crate::color_map::ColorMap;
use crate::config;
use crate::error::{Error, Result};
use crate::events::StorageEvent;
use crate::json::{self, JsonObject};
use crate::parameter_set::ParameterSet;
use crate::quality_error::ProductError;
use crate::seam_series::SeamSeries;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Unit of seam and interval lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    #[default]
    Millimeter,
    Degree,
}

impl LengthUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "millimeter",
            LengthUnit::Degree => "degree",
        }
    }

    pub fn parse(s: &str) -> Option<LengthUnit> {
        match s {
            "millimeter" => Some(LengthUnit::Millimeter),
            "degree" => Some(LengthUnit::Degree),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerSource {
    #[default]
    Software,
    External,
    Grabber,
}

impl TriggerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerSource::Software => "Software",
            TriggerSource::External => "External",
            TriggerSource::Grabber => "Grabber",
        }
    }

    pub fn parse(s: &str) -> Option<TriggerSource> {
        match s {
            "Software" => Some(TriggerSource::Software),
            "External" => Some(TriggerSource::External),
            "Grabber" => Some(TriggerSource::Grabber),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    Single,
    #[default]
    Burst,
    Continue,
    None,
}

impl TriggerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::Single => "Single",
            TriggerMode::Burst => "Burst",
            TriggerMode::Continue => "Continue",
            TriggerMode::None => "None",
        }
    }

    pub fn parse(s: &str) -> Option<TriggerMode> {
        match s {
            "Single" => Some(TriggerMode::Single),
            "Burst" => Some(TriggerMode::Burst),
            "Continue" => Some(TriggerMode::Continue),
            "None" => Some(TriggerMode::None),
            _ => None,
        }
    }
}

/// Read the `filterParameterSets` array of the document at `path`
fn read_filter_parameter_set_array(path: &Path) -> Result<Vec<Value>> {
    let document = read_document(path)?;
    Ok(json::read_array(&document, json::FILTER_PARAMETER_SETS).to_vec())
}

fn read_document(path: &Path) -> Result<JsonObject> {
    let data = fs::read(path)?;
    if data.is_empty() {
        return Err(Error::InvalidDocument(format!("{} is empty", path.display())));
    }
    match serde_json::from_slice(&data)? {
        Value::Object(object) => Ok(object),
        _ => Err(Error::InvalidDocument(format!(
            "{} does not hold a JSON object",
            path.display()
        ))),
    }
}

/// Parse the filter parameter sets `ids` stored in the document at `path`
///
/// Ids that are missing from the document are skipped.
pub(crate) fn read_filter_parameter_sets(path: &Path, ids: &[Uuid]) -> Result<Vec<ParameterSet>> {
    let wanted: HashSet<Uuid> = ids.iter().copied().collect();
    let sets: Vec<ParameterSet> = read_filter_parameter_set_array(path)?
        .iter()
        .filter_map(Value::as_object)
        .filter(|object| {
            json::read_optional_uuid(object, json::UUID).is_some_and(|id| wanted.contains(&id))
        })
        .filter_map(ParameterSet::from_json)
        .collect();
    if sets.len() < wanted.len() {
        warn!(
            path = %path.display(),
            requested = wanted.len(),
            found = sets.len(),
            "filter parameter sets missing from document"
        );
    }
    Ok(sets)
}

impl Product {
    pub fn to_json(&self) -> Value {
        let mut hardware = JsonObject::new();
        hardware.insert(json::START_POS_Y_AXIS.into(), Value::from(self.start_position_y_axis));
        if let Some(set) = &self.hardware_parameters {
            hardware.insert(json::PARAMETER_SET.into(), set.to_json());
        }
        json!({
            "uuid": json::uuid_value(&self.uuid),
            "name": self.name,
            "type": self.product_type,
            "endless": self.endless,
            "default": self.default_product,
            "lengthUnit": self.length_unit.as_str(),
            "assemblyImage": self.assembly_image,
            "hardware": hardware,
            "trigger": {
                "source": self.trigger_source.as_str(),
                "mode": self.trigger_mode.as_str(),
            },
            "filterParameterSets": self.pool.iter().map(ParameterSet::to_json).collect::<Vec<_>>(),
            "seamSeries": self.series.iter().map(SeamSeries::to_json).collect::<Vec<_>>(),
            "overlyingError": self.errors.iter().map(ProductError::to_json).collect::<Vec<_>>(),
            "qualityNorm": json::uuid_value(&self.quality_norm),
            "presetId": json::uuid_value(&self.laser_control_preset),
            "lwmTriggerSignalType": self.lwm_trigger_signal_type,
            "lwmTriggerSignalThreshold": self.lwm_trigger_signal_threshold,
            "signalQuality": self.signal_quality_color_map.to_json(),
            "errorLevels": self.error_level_color_map.to_json(),
        })
    }

    /// Returns `None` for an empty object or a missing or nil uuid
    ///
    /// Series are ordered by number and filter parameter sets no measure
    /// task refers to are dropped.
    pub fn from_json(object: &JsonObject) -> Option<Product> {
        Product::parse(object, false)
    }

    /// Like [`Product::from_json`], but filter parameter sets stay
    /// discarded until requested
    pub fn from_json_lazy(object: &JsonObject) -> Option<Product> {
        Product::parse(object, true)
    }

    fn parse(object: &JsonObject, lazy: bool) -> Option<Product> {
        if object.is_empty() {
            return None;
        }
        let uuid = json::read_uuid(object, json::UUID);
        if uuid.is_nil() {
            return None;
        }
        let mut product = Product::new(uuid);
        product.name = json::read_string(object, json::NAME);
        product.product_type = json::read_i32(object, json::TYPE, 0);
        product.endless = json::read_bool(object, json::ENDLESS, false);
        product.default_product = json::read_bool(object, json::DEFAULT, false);
        if let Some(trigger) = json::read_object(object, json::TRIGGER) {
            product.trigger_source =
                TriggerSource::parse(&json::read_string(trigger, json::SOURCE)).unwrap_or_default();
            product.trigger_mode =
                TriggerMode::parse(&json::read_string(trigger, json::MODE)).unwrap_or_default();
        }
        if let Some(hardware) = json::read_object(object, json::HARDWARE) {
            product.start_position_y_axis = json::read_i32(hardware, json::START_POS_Y_AXIS, 0);
            product.hardware_parameters =
                json::read_object(hardware, json::PARAMETER_SET).and_then(ParameterSet::from_json);
        }

        product.series = json::objects(object, json::SEAM_SERIES)
            .filter_map(|series| SeamSeries::from_json(series, uuid))
            .collect();
        product.series.sort_by_key(SeamSeries::number);

        let sets = json::objects(object, json::FILTER_PARAMETER_SETS);
        if lazy {
            for id in sets.filter_map(|set| json::read_optional_uuid(set, json::UUID)) {
                product.pool.mark_discarded(id);
            }
        } else {
            for set in sets.filter_map(ParameterSet::from_json) {
                product.pool.insert(set);
            }
        }
        product.length_unit =
            LengthUnit::parse(&json::read_string(object, json::LENGTH_UNIT)).unwrap_or_default();
        product.assembly_image = json::read_string(object, json::ASSEMBLY_IMAGE);
        product.laser_control_preset = json::read_uuid(object, json::PRESET_ID);
        product.errors = json::objects(object, json::OVERLYING_ERROR)
            .filter_map(ProductError::from_json)
            .collect();
        read_color_map(object, json::SIGNAL_QUALITY, &mut product.signal_quality_color_map);
        read_color_map(object, json::ERROR_LEVELS, &mut product.error_level_color_map);

        product.remove_unused_filter_parameter_sets();
        product.quality_norm = json::read_uuid(object, json::QUALITY_NORM);
        product.lwm_trigger_signal_type = json::read_i32(object, json::LWM_TRIGGER_SIGNAL_TYPE, -1);
        product.lwm_trigger_signal_threshold =
            json::read_f64(object, json::LWM_TRIGGER_SIGNAL_THRESHOLD, 0.0);
        Some(product)
    }

    /// Read the product document at `path`
    ///
    /// The path is remembered so discarded filter parameter sets can be
    /// re-read later.
    pub fn load(path: impl AsRef<Path>) -> Result<Product> {
        Product::load_document(path.as_ref(), false)
    }

    /// Read the product document at `path` without its filter parameter
    /// sets; they are read back on demand
    pub fn load_lazy(path: impl AsRef<Path>) -> Result<Product> {
        Product::load_document(path.as_ref(), true)
    }

    fn load_document(path: &Path, lazy: bool) -> Result<Product> {
        let document = read_document(path)?;
        let mut product = Product::parse(&document, lazy).ok_or_else(|| {
            Error::InvalidDocument(format!("{} does not describe a product", path.display()))
        })?;
        product.set_file_path(path);
        info!(
            product = %product.uuid,
            path = %path.display(),
            series = product.series.len(),
            lazy,
            "Loaded product"
        );
        Ok(product)
    }

    /// Write the document to `path` atomically
    ///
    /// Fails while filter parameter sets are discarded: the written
    /// document would lose them.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let discarded = self.pool.discarded().count();
        if discarded > 0 {
            return Err(Error::InvalidInput(format!(
                "{} filter parameter sets are discarded, load them before saving",
                discarded
            )));
        }
        let contents = serde_json::to_vec_pretty(&self.to_json())?;
        config::write_atomic(path, &contents)?;
        info!(product = %self.uuid, path = %path.display(), "Saved product");
        self.emit(StorageEvent::product_saved(self.uuid, path.to_path_buf()));
        Ok(())
    }

    /// Write the document back to the path it was loaded from
    pub fn save_in_place(&self) -> Result<PathBuf> {
        let path = self
            .file_path
            .clone()
            .ok_or_else(|| Error::NotFound(format!("file path of product {}", self.uuid)))?;
        self.save(&path)?;
        Ok(path)
    }

    fn require_file_path(&self) -> Result<&Path> {
        self.file_path.as_deref().ok_or_else(|| {
            Error::NotFound(format!("backing document of product {}", self.uuid))
        })
    }

    /// Re-read a discarded filter parameter set from the backing document
    ///
    /// Returns `Ok(false)` when the set is not discarded or the document
    /// no longer holds it.
    pub fn ensure_filter_parameter_set_loaded(&mut self, id: &Uuid) -> Result<bool> {
        if !self.pool.is_discarded(id) {
            return Ok(false);
        }
        let path = self.require_file_path()?.to_path_buf();
        let mut sets = read_filter_parameter_sets(&path, std::slice::from_ref(id))?;
        match sets.pop() {
            Some(set) => Ok(self.accept_loaded_parameter_set(set)),
            None => {
                warn!(product = %self.uuid, set = %id, "Failed to load filter parameter set");
                Ok(false)
            }
        }
    }

    /// Re-read every discarded filter parameter set, returning the count
    pub fn ensure_all_filter_parameter_sets_loaded(&mut self) -> Result<usize> {
        let ids: Vec<Uuid> = self.pool.discarded().copied().collect();
        if ids.is_empty() {
            return Ok(0);
        }
        let path = self.require_file_path()?.to_path_buf();
        let mut loaded = 0;
        for set in read_filter_parameter_sets(&path, &ids)? {
            if self.accept_loaded_parameter_set(set) {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Take a set read off-thread back into the pool
    ///
    /// Only sets that are currently discarded are accepted.
    pub fn accept_loaded_parameter_set(&mut self, mut set: ParameterSet) -> bool {
        let id = set.uuid();
        if !self.pool.is_discarded(&id) {
            debug!(product = %self.uuid, set = %id, "ignoring filter parameter set that is not discarded");
            return false;
        }
        set.set_change_tracking_enabled(self.changes.is_enabled());
        self.pool.insert(set);
        self.emit(StorageEvent::filter_parameter_sets_changed(self.uuid));
        true
    }
}

fn read_color_map(object: &JsonObject, key: &str, map: &mut ColorMap) {
    if let Some(value) = object.get(key) {
        map.read_json(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Product {
        let mut product = Product::new(Uuid::new_v4());
        product.set_name("Sample");
        product.set_product_type(7);
        product.set_trigger_mode(TriggerMode::Continue);
        product.set_length_unit(LengthUnit::Degree);
        product.create_first_seam_series();
        product.create_seam();
        product.create_seam();
        product
    }

    #[test]
    fn test_enum_strings() {
        assert_eq!(TriggerSource::parse("Grabber"), Some(TriggerSource::Grabber));
        assert_eq!(TriggerMode::parse("bogus"), None);
        assert_eq!(TriggerMode::default(), TriggerMode::Burst);
        assert_eq!(LengthUnit::default().as_str(), "millimeter");
    }

    #[test]
    fn test_from_json_rejects_missing_uuid() {
        assert!(Product::from_json(&JsonObject::new()).is_none());
        let object = json!({"uuid": Uuid::nil().to_string(), "name": "x"});
        assert!(Product::from_json(object.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let object = json!({"uuid": Uuid::new_v4().to_string()});
        let product = Product::from_json(object.as_object().unwrap()).unwrap();
        assert_eq!(product.trigger_source(), TriggerSource::Software);
        assert_eq!(product.trigger_mode(), TriggerMode::Burst);
        assert_eq!(product.length_unit(), LengthUnit::Millimeter);
        assert_eq!(product.lwm_trigger_signal_type(), -1);
        assert!(product.seam_series().is_empty());
    }

    #[test]
    fn test_series_sorted_and_unused_sets_pruned() {
        let product_id = Uuid::new_v4();
        let used = Uuid::new_v4();
        let object = json!({
            "uuid": product_id.to_string(),
            "seamSeries": [
                {"uuid": Uuid::new_v4().to_string(), "number": 3, "graphParamSet": used.to_string()},
                {"uuid": Uuid::new_v4().to_string(), "number": 1},
            ],
            "filterParameterSets": [
                {"uuid": used.to_string(), "parameters": []},
                {"uuid": Uuid::new_v4().to_string(), "parameters": []},
            ],
        });
        let product = Product::from_json(object.as_object().unwrap()).unwrap();
        let numbers: Vec<i32> = product.seam_series().iter().map(SeamSeries::number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(product.filter_parameter_sets().len(), 1);
        assert!(product.filter_parameter_set(&used).is_some());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("product.json");
        let product = sample();
        product.save(&path).unwrap();
        assert!(!temp_dir.path().join("product.json.tmp").exists());

        let loaded = Product::load(&path).unwrap();
        assert_eq!(loaded.file_path(), Some(path.as_path()));
        assert_eq!(loaded.to_json(), product.to_json());
        assert_eq!(loaded.trigger_mode(), TriggerMode::Continue);
        assert_eq!(loaded.length_unit(), LengthUnit::Degree);
    }

    #[test]
    fn test_load_rejects_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.json");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(Product::load(&path), Err(Error::InvalidDocument(_))));
        assert!(matches!(
            Product::load(temp_dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_discarded_sets_reload_from_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("product.json");
        sample().save(&path).unwrap();

        let mut product = Product::load(&path).unwrap();
        let ids: Vec<Uuid> = product.filter_parameter_sets().iter().map(|s| s.uuid()).collect();
        assert_eq!(ids.len(), 2);
        for id in &ids {
            assert!(product.discard_filter_parameter_set(id));
        }
        assert!(product.save(&path).is_err());

        assert!(product.ensure_filter_parameter_set_loaded(&ids[0]).unwrap());
        assert!(!product.ensure_filter_parameter_set_loaded(&ids[0]).unwrap());
        assert_eq!(product.ensure_all_filter_parameter_sets_loaded().unwrap(), 1);
        assert_eq!(product.filter_parameter_sets().len(), 2);
        product.save_in_place().unwrap();
    }

    #[test]
    fn test_lazy_load_keeps_sets_discarded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("product.json");
        let original = sample();
        original.save(&path).unwrap();

        let mut product = Product::load_lazy(&path).unwrap();
        assert!(product.filter_parameter_sets().is_empty());
        assert_eq!(product.filter_parameter_sets().discarded().count(), 2);
        assert_eq!(product.ensure_all_filter_parameter_sets_loaded().unwrap(), 2);
        assert_eq!(product.to_json(), original.to_json());
    }

    #[test]
    fn test_ensure_loaded_without_document() {
        let mut product = sample();
        let id = product.filter_parameter_sets().iter().next().unwrap().uuid();
        product.discard_filter_parameter_set(&id);
        assert!(matches!(
            product.ensure_filter_parameter_set_loaded(&id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_accept_only_discarded_sets() {
        let mut product = sample();
        assert!(!product.accept_loaded_parameter_set(ParameterSet::new(Uuid::new_v4())));
        let id = product.filter_parameter_sets().iter().next().unwrap().uuid();
        product.discard_filter_parameter_set(&id);
        assert!(product.accept_loaded_parameter_set(ParameterSet::new(id)));
        assert!(product.filter_parameter_set(&id).is_some());
    }
}
