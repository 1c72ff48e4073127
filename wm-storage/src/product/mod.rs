//! Product: root of the configuration tree
//!
//! A product owns its seam series, the pool of filter parameter sets the
//! measure tasks refer to, product level errors and an optional private
//! hardware parameter set. Structural mutators go through the product so
//! the pool, the change log and the event bus stay consistent.

mod document;
mod navigation;
mod pool;

pub(crate) use document::read_filter_parameter_sets;
pub use document::{LengthUnit, TriggerMode, TriggerSource};
pub use navigation::MeasureTaskRef;
pub use pool::ParameterSetPool;

use crate::attributes::AttributeCatalog;
use crate::change_tracker::{Change, ChangeLog};
use crate::color_map::{self, ColorMap};
use crate::copy_mode::CopyMode;
use crate::events::{EventBus, StorageEvent};
use crate::json;
use crate::measure_task::MeasureTask;
use crate::parameter_set::ParameterSet;
use crate::quality_error::ProductError;
use crate::seam::SeamCopy;
use crate::seam_series::{SeamEntry, SeamSeries};
use crate::uuid_utils;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Product {
    uuid: Uuid,
    name: String,
    product_type: i32,
    endless: bool,
    default_product: bool,
    trigger_source: TriggerSource,
    trigger_mode: TriggerMode,
    start_position_y_axis: i32,
    length_unit: LengthUnit,
    assembly_image: String,
    quality_norm: Uuid,
    laser_control_preset: Uuid,
    lwm_trigger_signal_type: i32,
    lwm_trigger_signal_threshold: f64,
    signal_quality_color_map: ColorMap,
    error_level_color_map: ColorMap,
    hardware_parameters: Option<ParameterSet>,
    series: Vec<SeamSeries>,
    pool: ParameterSetPool,
    errors: Vec<ProductError>,
    changes: ChangeLog,
    file_path: Option<PathBuf>,
    events: Option<EventBus>,
}

impl Product {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            name: String::new(),
            product_type: 0,
            endless: false,
            default_product: false,
            trigger_source: TriggerSource::default(),
            trigger_mode: TriggerMode::default(),
            start_position_y_axis: 0,
            length_unit: LengthUnit::default(),
            assembly_image: String::new(),
            quality_norm: Uuid::nil(),
            laser_control_preset: Uuid::nil(),
            lwm_trigger_signal_type: -1,
            lwm_trigger_signal_threshold: 0.0,
            signal_quality_color_map: ColorMap::new(color_map::SIGNAL_QUALITY),
            error_level_color_map: ColorMap::new(color_map::ERROR_LEVELS),
            hardware_parameters: None,
            series: Vec::new(),
            pool: ParameterSetPool::new(),
            errors: Vec::new(),
            changes: ChangeLog::default(),
            file_path: None,
            events: None,
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
        self.changes.property("Name", self.name.as_str(), name);
        self.name = name.to_string();
    }

    /// Numeric product type code sent by the plant
    pub fn product_type(&self) -> i32 {
        self.product_type
    }

    pub fn set_product_type(&mut self, product_type: i32) {
        if self.product_type == product_type {
            return;
        }
        self.changes.property("Type", self.product_type, product_type);
        self.product_type = product_type;
    }

    pub fn is_endless(&self) -> bool {
        self.endless
    }

    pub fn set_endless(&mut self, endless: bool) {
        if self.endless == endless {
            return;
        }
        self.changes.property("Endless", self.endless, endless);
        self.endless = endless;
    }

    pub fn is_default_product(&self) -> bool {
        self.default_product
    }

    pub fn set_default_product(&mut self, default_product: bool) {
        if self.default_product == default_product {
            return;
        }
        self.changes.property("Default product", self.default_product, default_product);
        self.default_product = default_product;
    }

    pub fn trigger_source(&self) -> TriggerSource {
        self.trigger_source
    }

    pub fn set_trigger_source(&mut self, source: TriggerSource) {
        if self.trigger_source == source {
            return;
        }
        self.changes.property("Trigger source", self.trigger_source.as_str(), source.as_str());
        self.trigger_source = source;
    }

    pub fn trigger_mode(&self) -> TriggerMode {
        self.trigger_mode
    }

    pub fn set_trigger_mode(&mut self, mode: TriggerMode) {
        if self.trigger_mode == mode {
            return;
        }
        self.changes.property("Trigger mode", self.trigger_mode.as_str(), mode.as_str());
        self.trigger_mode = mode;
    }

    pub fn start_position_y_axis(&self) -> i32 {
        self.start_position_y_axis
    }

    pub fn set_start_position_y_axis(&mut self, position: i32) {
        if self.start_position_y_axis == position {
            return;
        }
        self.changes.property("Start position Y axis", self.start_position_y_axis, position);
        self.start_position_y_axis = position;
    }

    pub fn length_unit(&self) -> LengthUnit {
        self.length_unit
    }

    pub fn set_length_unit(&mut self, unit: LengthUnit) {
        if self.length_unit == unit {
            return;
        }
        self.changes.property("Length unit", self.length_unit.as_str(), unit.as_str());
        self.length_unit = unit;
    }

    pub fn assembly_image(&self) -> &str {
        &self.assembly_image
    }

    pub fn set_assembly_image(&mut self, image: &str) {
        if self.assembly_image == image {
            return;
        }
        self.changes.property("Assembly image", self.assembly_image.as_str(), image);
        self.assembly_image = image.to_string();
    }

    pub fn quality_norm(&self) -> Uuid {
        self.quality_norm
    }

    pub fn set_quality_norm(&mut self, norm: Uuid) {
        if self.quality_norm == norm {
            return;
        }
        self.changes.property(
            "Quality Norm",
            uuid_utils::to_string(&self.quality_norm),
            uuid_utils::to_string(&norm),
        );
        self.quality_norm = norm;
    }

    pub fn laser_control_preset(&self) -> Uuid {
        self.laser_control_preset
    }

    pub fn set_laser_control_preset(&mut self, preset: Uuid) {
        if self.laser_control_preset == preset {
            return;
        }
        self.changes.property(
            "laserControlPreset",
            uuid_utils::to_string(&self.laser_control_preset),
            uuid_utils::to_string(&preset),
        );
        self.laser_control_preset = preset;
    }

    /// Enum value of the lwm trigger signal, -1 when unset
    pub fn lwm_trigger_signal_type(&self) -> i32 {
        self.lwm_trigger_signal_type
    }

    pub fn set_lwm_trigger_signal_type(&mut self, signal_type: i32) {
        if self.lwm_trigger_signal_type == signal_type {
            return;
        }
        self.changes
            .property("lwmTriggerSignalType", self.lwm_trigger_signal_type, signal_type);
        self.lwm_trigger_signal_type = signal_type;
    }

    pub fn lwm_trigger_signal_threshold(&self) -> f64 {
        self.lwm_trigger_signal_threshold
    }

    pub fn set_lwm_trigger_signal_threshold(&mut self, threshold: f64) {
        if (self.lwm_trigger_signal_threshold - threshold).abs() <= f64::EPSILON {
            return;
        }
        self.changes.property(
            "lwmTriggerSignalThreshold",
            self.lwm_trigger_signal_threshold,
            threshold,
        );
        self.lwm_trigger_signal_threshold = threshold;
    }

    pub fn signal_quality_color_map(&self) -> &ColorMap {
        &self.signal_quality_color_map
    }

    pub fn signal_quality_color_map_mut(&mut self) -> &mut ColorMap {
        &mut self.signal_quality_color_map
    }

    pub fn error_level_color_map(&self) -> &ColorMap {
        &self.error_level_color_map
    }

    pub fn error_level_color_map_mut(&mut self) -> &mut ColorMap {
        &mut self.error_level_color_map
    }

    pub fn hardware_parameters(&self) -> Option<&ParameterSet> {
        self.hardware_parameters.as_ref()
    }

    pub fn hardware_parameters_mut(&mut self) -> Option<&mut ParameterSet> {
        self.hardware_parameters.as_mut()
    }

    pub fn set_hardware_parameters(&mut self, set: Option<ParameterSet>) {
        self.hardware_parameters = set.map(|mut set| {
            set.set_change_tracking_enabled(self.changes.is_enabled());
            set
        });
    }

    /// Create the private hardware set if missing
    pub fn create_hardware_parameters(&mut self) -> &mut ParameterSet {
        let enabled = self.changes.is_enabled();
        let changes = &mut self.changes;
        self.hardware_parameters.get_or_insert_with(|| {
            let mut set = ParameterSet::new(uuid_utils::generate());
            set.set_change_tracking_enabled(enabled);
            changes.record(Change::HardwareParametersCreated { uuid: set.uuid() });
            set
        })
    }

    /// Path of the document this product was read from
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.events.as_ref()
    }

    pub fn set_event_bus(&mut self, bus: Option<EventBus>) {
        self.events = bus;
    }

    fn emit(&self, event: StorageEvent) {
        if let Some(bus) = &self.events {
            bus.emit_lossy(event);
        }
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn is_change_tracking_enabled(&self) -> bool {
        self.changes.is_enabled()
    }

    /// Toggle change tracking on the whole tree
    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.changes.set_enabled(enabled);
        if let Some(set) = &mut self.hardware_parameters {
            set.set_change_tracking_enabled(enabled);
        }
        self.pool.set_change_tracking_enabled(enabled);
        for series in &mut self.series {
            series.set_change_tracking_enabled(enabled);
        }
        for error in &mut self.errors {
            error.set_change_tracking_enabled(enabled);
        }
    }

    /// Own entries, then series keyed by number, hardware and filter
    /// parameter sets, closed by a `product` identification entry
    pub fn changes(&self) -> Vec<Value> {
        let mut changes = self.changes.to_json();
        let series: Vec<Value> = self
            .series
            .iter()
            .filter_map(|series| {
                let series_changes = series.changes();
                if series_changes.is_empty() {
                    return None;
                }
                let key = series.number().to_string();
                Some(json!({ key: series_changes }))
            })
            .collect();
        if !series.is_empty() {
            changes.push(json!({ "seamSeries": series }));
        }
        if let Some(set) = &self.hardware_parameters {
            if set.has_changes() {
                changes.push(json!({ "hardwareParameters": set.changes() }));
            }
        }
        let sets: Vec<Value> = self
            .pool
            .iter()
            .filter(|set| set.has_changes())
            .map(|set| {
                let key = uuid_utils::to_string(&set.uuid());
                json!({ key: set.changes() })
            })
            .collect();
        if !sets.is_empty() {
            changes.push(json!({ "parameterSets": sets }));
        }
        let errors: Vec<Value> = self
            .errors
            .iter()
            .filter(|e| !e.base().changes().is_empty())
            .map(|e| {
                json!({
                    "error": json::uuid_value(&e.uuid()),
                    "changes": e.base().changes().to_json(),
                })
            })
            .collect();
        if !errors.is_empty() {
            changes.push(json!({ "overlyingErrors": errors }));
        }
        changes.push(json!({
            "product": {
                "uuid": json::uuid_value(&self.uuid),
                "name": self.name,
                "type": self.product_type,
            }
        }));
        changes
    }

    pub fn seam_series(&self) -> &[SeamSeries] {
        &self.series
    }

    fn add_seam_series(&mut self, mut series: SeamSeries) -> Uuid {
        let number = self.series.iter().map(SeamSeries::number).max().map_or(0, |n| n + 1);
        series.set_change_tracking_enabled(false);
        series.task_mut().set_number(number);
        series.set_change_tracking_enabled(self.changes.is_enabled());
        let uuid = series.uuid();
        self.changes.record(Change::SeamSeriesCreated { uuid, number });
        debug!(product = %self.uuid, series = %uuid, number, "adding seam series");
        self.series.push(series);
        self.emit(StorageEvent::seam_series_changed(self.uuid));
        uuid
    }

    /// Create series 0 unless the product already has series
    pub fn create_first_seam_series(&mut self) -> Option<Uuid> {
        if !self.series.is_empty() {
            return None;
        }
        Some(self.create_seam_series())
    }

    pub fn create_seam_series(&mut self) -> Uuid {
        let series = SeamSeries::new(uuid_utils::generate(), self.uuid);
        self.add_seam_series(series)
    }

    /// Copy the series `source` to the tail, `None` for an unknown source
    pub fn create_seam_series_copy(&mut self, mode: CopyMode, source: &Uuid) -> Option<Uuid> {
        let copy = self
            .find_seam_series_by_uuid(source)?
            .duplicate(mode, self.uuid, Some(&self.pool));
        for set in copy.parameter_sets {
            self.add_filter_parameter_set(set);
        }
        let has_seams = !copy.series.is_empty();
        let uuid = self.add_seam_series(copy.series);
        if has_seams {
            self.emit(StorageEvent::seams_changed(self.uuid));
        }
        Some(uuid)
    }

    /// Returns false for an unknown series
    pub fn destroy_seam_series(&mut self, id: &Uuid) -> bool {
        let Some(index) = self.series.iter().position(|s| s.uuid() == *id) else {
            return false;
        };
        let series = self.series.remove(index);
        self.changes.record(Change::SeamSeriesRemoved {
            uuid: series.uuid(),
            number: series.number(),
        });
        self.emit(StorageEvent::seam_series_changed(self.uuid));
        self.emit(StorageEvent::seams_changed(self.uuid));
        true
    }

    /// New empty filter parameter set registered in the pool
    fn create_filter_parameter_set(&mut self) -> Uuid {
        let set = ParameterSet::new(uuid_utils::generate());
        let uuid = set.uuid();
        self.add_filter_parameter_set(set);
        uuid
    }

    /// Create a seam in the first series, `None` without series
    ///
    /// The seam gets its own empty filter parameter set.
    pub fn create_seam(&mut self) -> Option<Uuid> {
        let series = self.series.first()?.uuid();
        self.create_seam_in(&series)
    }

    /// Create a seam at the tail of the series `series`
    pub fn create_seam_in(&mut self, series: &Uuid) -> Option<Uuid> {
        self.find_seam_series_by_uuid(series)?;
        let parameter_set = self.create_filter_parameter_set();
        let series = self.find_seam_series_by_uuid_mut(series)?;
        let uuid = series.create_seam();
        if let Some(seam) = series.find_seam_mut(&uuid) {
            seam.task_mut().set_graph_param_set(parameter_set);
        }
        self.emit(StorageEvent::seams_changed(self.uuid));
        Some(uuid)
    }

    /// Copy the seam `seam` of this product to the tail of `series`
    pub fn create_seam_copy(&mut self, mode: CopyMode, series: &Uuid, seam: &Uuid) -> Option<Uuid> {
        let copy = self.find_seam(seam)?.duplicate(mode, *series, Some(&self.pool));
        self.insert_seam_copy(series, copy)
    }

    /// Copy the seam `seam` of `source` to the tail of `series`
    ///
    /// The seam's filter parameter set is duplicated from the source
    /// product's pool.
    pub fn copy_seam_from(
        &mut self,
        mode: CopyMode,
        series: &Uuid,
        source: &Product,
        seam: &Uuid,
    ) -> Option<Uuid> {
        let copy = source.find_seam(seam)?.duplicate(mode, *series, Some(&source.pool));
        self.insert_seam_copy(series, copy)
    }

    fn insert_seam_copy(&mut self, series: &Uuid, copy: SeamCopy) -> Option<Uuid> {
        self.find_seam_series_by_uuid(series)?;
        if let Some(set) = copy.parameter_set {
            self.add_filter_parameter_set(set);
        }
        let uuid = self.find_seam_series_by_uuid_mut(series)?.insert_seam(copy.seam);
        self.emit(StorageEvent::seams_changed(self.uuid));
        Some(uuid)
    }

    /// Link the seam `target` under `label`
    ///
    /// Returns the link's uuid, `None` when the series rejects the label.
    pub fn create_seam_link(&mut self, target: &Uuid, label: &str) -> Option<Uuid> {
        let series = self.find_seam(target)?.series();
        let link = self
            .find_seam_series_by_uuid_mut(&series)?
            .create_seam_link(target, label)?
            .uuid();
        self.emit(StorageEvent::linked_seams_changed(*target));
        self.emit(StorageEvent::seams_changed(self.uuid));
        Some(link)
    }

    /// Destroy a seam with its links, or a single link
    ///
    /// Emits one seams changed notification for the whole cascade.
    pub fn destroy_seam(&mut self, id: &Uuid) -> bool {
        let mut removed = 0;
        let mut link_target = None;
        for series in &mut self.series {
            if let Some(SeamEntry::Link { target, .. }) =
                series.entries().iter().find(|entry| entry.uuid() == *id)
            {
                link_target = Some(*target);
            }
            removed = series.destroy_seam(id);
            if removed > 0 {
                break;
            }
        }
        if removed == 0 {
            return false;
        }
        if let Some(target) = link_target {
            self.emit(StorageEvent::linked_seams_changed(target));
        }
        self.emit(StorageEvent::seams_changed(self.uuid));
        true
    }

    /// Create interval 0 of `seam`, `None` for an unknown seam or one that
    /// already has intervals
    pub fn create_first_seam_interval(&mut self, seam: &Uuid) -> Option<Uuid> {
        let interval = self.find_seam_mut(seam)?.create_first_seam_interval()?.uuid();
        self.emit(StorageEvent::seam_intervals_changed(*seam));
        Some(interval)
    }

    /// Append an interval to `seam`, `None` for an unknown seam
    pub fn create_seam_interval(&mut self, seam: &Uuid) -> Option<Uuid> {
        let interval = self.find_seam_mut(seam)?.create_seam_interval().uuid();
        self.emit(StorageEvent::seam_intervals_changed(*seam));
        Some(interval)
    }

    /// Returns false for an unknown seam or interval
    pub fn destroy_seam_interval(&mut self, seam: &Uuid, interval: &Uuid) -> bool {
        let destroyed = self
            .find_seam_mut(seam)
            .is_some_and(|s| s.destroy_seam_interval(interval));
        if destroyed {
            self.emit(StorageEvent::seam_intervals_changed(*seam));
        }
        destroyed
    }

    pub fn overlying_errors(&self) -> &[ProductError] {
        &self.errors
    }

    pub fn overlying_error_mut(&mut self, index: usize) -> Option<&mut ProductError> {
        self.errors.get_mut(index)
    }

    pub fn add_overlying_error(
        &mut self,
        variant_id: Uuid,
        catalog: Option<&dyn AttributeCatalog>,
    ) -> &mut ProductError {
        let mut error = ProductError::default();
        error.base_mut().set_variant_id(variant_id);
        if let Some(catalog) = catalog {
            error.init_from_attributes(catalog);
        }
        error.set_change_tracking_enabled(self.changes.is_enabled());
        self.changes.record(error.base().created_change());
        self.errors.push(error);
        let last = self.errors.len() - 1;
        &mut self.errors[last]
    }

    /// Out of range indices are ignored
    pub fn remove_overlying_error(&mut self, index: usize) {
        if index >= self.errors.len() {
            return;
        }
        let error = self.errors.remove(index);
        self.changes.record(error.base().removed_change());
    }

    pub fn filter_parameter_sets(&self) -> &ParameterSetPool {
        &self.pool
    }

    pub fn filter_parameter_set(&self, id: &Uuid) -> Option<&ParameterSet> {
        self.pool.get(id)
    }

    pub fn filter_parameter_set_mut(&mut self, id: &Uuid) -> Option<&mut ParameterSet> {
        self.pool.get_mut(id)
    }

    /// Add a set, replacing a set with the same uuid
    pub fn add_filter_parameter_set(&mut self, mut set: ParameterSet) {
        set.set_change_tracking_enabled(self.changes.is_enabled());
        let uuid = set.uuid();
        let added = set.added_change();
        let replaced = self.pool.insert(set);
        self.changes.record(match replaced {
            Some(_) => Change::ParameterSetReplaced { uuid },
            None => added,
        });
        self.emit(StorageEvent::filter_parameter_sets_changed(self.uuid));
    }

    pub fn remove_filter_parameter_set(&mut self, id: &Uuid) -> Option<ParameterSet> {
        let set = self.pool.remove(id)?;
        self.changes.record(Change::ParameterSetRemoved { uuid: *id });
        self.emit(StorageEvent::filter_parameter_sets_changed(self.uuid));
        Some(set)
    }

    /// Unload a set, keeping its id known
    ///
    /// Ignored while change tracking: the document on disk would no longer
    /// match the edited product.
    pub fn discard_filter_parameter_set(&mut self, id: &Uuid) -> bool {
        if self.changes.is_enabled() {
            return false;
        }
        self.pool.discard(id)
    }

    /// True for loaded and discarded sets
    pub fn contains_filter_parameter_set(&self, id: &Uuid) -> bool {
        self.pool.contains(id)
    }

    fn used_filter_parameter_sets(&self) -> HashSet<Uuid> {
        let mut used = HashSet::new();
        for series in &self.series {
            used.insert(series.task().graph_param_set());
            for seam in series.seams() {
                used.insert(seam.task().graph_param_set());
            }
        }
        used.remove(&Uuid::nil());
        used
    }

    /// Drop sets no measure task refers to, returning their ids
    pub fn remove_unused_filter_parameter_sets(&mut self) -> Vec<Uuid> {
        let used = self.used_filter_parameter_sets();
        let removed = self.pool.retain_referenced(&used);
        if !removed.is_empty() {
            debug!(product = %self.uuid, count = removed.len(), "removed unused filter parameter sets");
            self.emit(StorageEvent::filter_parameter_sets_changed(self.uuid));
        }
        removed
    }

    /// Filter parameter set id that applies to `task`
    ///
    /// Linked graph references are followed to the target seam. A chain
    /// that loops or ends at an unknown seam resolves to nil.
    pub fn effective_graph_param_set(&self, task: &MeasureTask) -> Uuid {
        let mut visited = HashSet::new();
        let mut current = task;
        while let Some(target) = current.linked_graph_seam() {
            if !visited.insert(target) {
                warn!(task = %task.uuid(), "linked graph references form a cycle");
                return Uuid::nil();
            }
            match self.find_seam(&target) {
                Some(seam) => current = seam.task(),
                None => return Uuid::nil(),
            }
        }
        current.graph_param_set()
    }

    /// Copy of the whole product
    ///
    /// Every seam copy gets a duplicate of its filter parameter set.
    /// Sets that are discarded at the time of the copy cannot be
    /// duplicated; load them first.
    pub fn duplicate(&self, mode: CopyMode) -> Product {
        if self.pool.discarded().next().is_some() {
            warn!(product = %self.uuid, "duplicating product with discarded filter parameter sets");
        }
        let mut product = Product::new(uuid_utils::duplicate_uuid(mode, self.uuid));
        product.name = self.name.clone();
        product.product_type = self.product_type;
        product.endless = self.endless;
        product.default_product = self.default_product;
        product.trigger_source = self.trigger_source;
        product.trigger_mode = self.trigger_mode;
        product.start_position_y_axis = self.start_position_y_axis;
        product.length_unit = self.length_unit;
        product.assembly_image = self.assembly_image.clone();
        product.quality_norm = self.quality_norm;
        product.laser_control_preset = self.laser_control_preset;
        product.lwm_trigger_signal_type = self.lwm_trigger_signal_type;
        product.lwm_trigger_signal_threshold = self.lwm_trigger_signal_threshold;
        product.signal_quality_color_map.copy_from(&self.signal_quality_color_map);
        product.error_level_color_map.copy_from(&self.error_level_color_map);
        product.hardware_parameters = self.hardware_parameters.as_ref().map(|set| set.duplicate(mode));

        for series in &self.series {
            let copy = series.duplicate(mode, product.uuid, Some(&self.pool));
            for set in copy.parameter_sets {
                product.pool.insert(set);
            }
            product.series.push(copy.series);
        }
        if mode == CopyMode::WithDifferentIds {
            product.adjust_graph_references(self);
        }
        product.errors = self.errors.iter().map(|e| e.duplicate(mode)).collect();
        product.events = self.events.clone();
        product.set_change_tracking_enabled(self.changes.is_enabled());
        debug!(source = %self.uuid, copy = %product.uuid, ?mode, "duplicated product");
        product
    }

    /// Point linked graph references at seams of this product
    ///
    /// References copied from `source` still name seams of `source`; they
    /// are resolved by series and seam number.
    fn adjust_graph_references(&mut self, source: &Product) {
        let mut rewrites = Vec::new();
        for series in &self.series {
            for seam in series.seams() {
                let Some(linked) = seam.task().linked_graph_seam() else {
                    continue;
                };
                let Some(position) = source.seam_position(&linked) else {
                    continue;
                };
                if let Some(target) = self.find_seam_by_number(position.0, position.1) {
                    rewrites.push((seam.uuid(), target.uuid()));
                }
            }
        }
        for (seam, target) in rewrites {
            if let Some(seam) = self.find_seam_mut(&seam) {
                seam.task_mut().set_linked_graph(target);
            }
        }
    }
}
