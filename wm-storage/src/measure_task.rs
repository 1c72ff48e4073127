//! State shared by seam series, seams and seam intervals
//!
//! [`MeasureTask`] is embedded by value in [`SeamSeries`](crate::SeamSeries)
//! and [`Seam`](crate::Seam). It owns the graph selection, the id of the
//! filter parameter set in the product pool, the optional private hardware
//! parameter set, the task's seam errors and the reference curves those
//! errors use as envelope.

use crate::attributes::AttributeCatalog;
use crate::change_tracker::{Change, ChangeLog};
use crate::copy_mode::CopyMode;
use crate::graph_reference::GraphReference;
use crate::json::{self, JsonObject};
use crate::parameter_set::ParameterSet;
use crate::quality_error::SeamError;
use crate::reference_curve::ReferenceCurve;
use crate::uuid_utils;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct MeasureTask {
    uuid: Uuid,
    number: i32,
    name: String,
    graph_reference: GraphReference,
    graph_param_set: Uuid,
    hardware_parameters: Option<ParameterSet>,
    laser_control_preset: Uuid,
    errors: Vec<SeamError>,
    reference_curves: Vec<ReferenceCurve>,
    changes: ChangeLog,
}

impl MeasureTask {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            number: 0,
            name: String::new(),
            graph_reference: GraphReference::default(),
            graph_param_set: Uuid::nil(),
            hardware_parameters: None,
            laser_control_preset: Uuid::nil(),
            errors: Vec::new(),
            reference_curves: Vec::new(),
            changes: ChangeLog::default(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    /// One-based number shown to users
    pub fn visual_number(&self) -> i32 {
        self.number + 1
    }

    /// Display color of an interval level
    pub fn level_color(level: usize) -> &'static str {
        match level {
            0 => "#75D480",
            1 => "#E6D453",
            2 => "#E68E73",
            _ => "white",
        }
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

    pub fn graph_reference(&self) -> &GraphReference {
        &self.graph_reference
    }

    pub fn graph(&self) -> Uuid {
        self.graph_reference.graph()
    }

    pub fn sub_graphs(&self) -> &[Uuid] {
        self.graph_reference.sub_graphs()
    }

    pub fn uses_sub_graphs(&self) -> bool {
        self.graph_reference.uses_sub_graphs()
    }

    pub fn linked_graph_seam(&self) -> Option<Uuid> {
        self.graph_reference.linked_seam()
    }

    /// Replace the graph selection
    ///
    /// An empty sub graph list never replaces a selection without sub
    /// graphs. Linking clears the own filter parameter set id.
    pub fn set_graph_reference(&mut self, reference: GraphReference) {
        if self.graph_reference == reference {
            return;
        }
        if let GraphReference::SubGraphs(ids) = &reference {
            if ids.is_empty() && self.graph_reference.sub_graphs().is_empty() {
                return;
            }
        }
        self.changes.property(
            "graph",
            self.graph_reference.change_value(),
            reference.change_value(),
        );
        if reference.is_linked() {
            self.graph_param_set = Uuid::nil();
        }
        self.graph_reference = reference;
    }

    pub fn set_graph(&mut self, graph: Uuid) {
        self.set_graph_reference(GraphReference::Single(graph));
    }

    pub fn set_sub_graphs(&mut self, sub_graphs: Vec<Uuid>) {
        self.set_graph_reference(GraphReference::SubGraphs(sub_graphs));
    }

    pub fn set_linked_graph(&mut self, seam: Uuid) {
        self.set_graph_reference(GraphReference::Linked(seam));
    }

    /// Own filter parameter set id, nil while linked
    ///
    /// The effective set of a linked task is resolved through the product.
    pub fn graph_param_set(&self) -> Uuid {
        self.graph_param_set
    }

    /// Ignored while the graph reference is linked
    pub fn set_graph_param_set(&mut self, id: Uuid) {
        if self.graph_param_set == id || self.graph_reference.is_linked() {
            return;
        }
        self.changes.property(
            "graphParamSet",
            uuid_utils::to_string(&self.graph_param_set),
            uuid_utils::to_string(&id),
        );
        self.graph_param_set = id;
    }

    pub fn hardware_parameters(&self) -> Option<&ParameterSet> {
        self.hardware_parameters.as_ref()
    }

    pub fn hardware_parameters_mut(&mut self) -> Option<&mut ParameterSet> {
        self.hardware_parameters.as_mut()
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

    pub fn set_hardware_parameters(&mut self, set: Option<ParameterSet>) {
        self.hardware_parameters = set.map(|mut set| {
            set.set_change_tracking_enabled(self.changes.is_enabled());
            set
        });
    }

    pub fn find_hardware_parameter_set(&self, id: &Uuid) -> Option<&ParameterSet> {
        self.hardware_parameters.as_ref().filter(|set| set.uuid() == *id)
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

    pub fn errors(&self) -> &[SeamError] {
        &self.errors
    }

    pub fn error_mut(&mut self, index: usize) -> Option<&mut SeamError> {
        self.errors.get_mut(index)
    }

    pub fn find_error(&self, id: &Uuid) -> Option<&SeamError> {
        self.errors.iter().find(|e| e.uuid() == *id)
    }

    /// Append a seam error of `variant_id`, seeded from the catalog if given
    pub fn add_error(
        &mut self,
        variant_id: Uuid,
        catalog: Option<&dyn AttributeCatalog>,
    ) -> &mut SeamError {
        let mut error = SeamError::default();
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
    pub fn remove_error(&mut self, index: usize) {
        if index >= self.errors.len() {
            return;
        }
        let error = self.errors.remove(index);
        self.changes.record(error.base().removed_change());
    }

    pub fn reference_curves(&self) -> &[ReferenceCurve] {
        &self.reference_curves
    }

    /// `None` for nil and unknown ids
    pub fn find_reference_curve(&self, id: &Uuid) -> Option<&ReferenceCurve> {
        if id.is_nil() {
            return None;
        }
        self.reference_curves.iter().find(|curve| curve.uuid() == *id)
    }

    pub fn find_reference_curve_mut(&mut self, id: &Uuid) -> Option<&mut ReferenceCurve> {
        if id.is_nil() {
            return None;
        }
        self.reference_curves.iter_mut().find(|curve| curve.uuid() == *id)
    }

    pub fn create_reference_curve(&mut self, result_type: i32) -> &mut ReferenceCurve {
        let mut curve = ReferenceCurve::new(uuid_utils::generate(), result_type);
        curve.set_change_tracking_enabled(self.changes.is_enabled());
        self.push_reference_curve(curve)
    }

    /// Add a copy of the curve `id` with fresh ids, `None` for an unknown curve
    pub fn copy_reference_curve(&mut self, id: &Uuid) -> Option<&mut ReferenceCurve> {
        let curve = self.find_reference_curve(id)?.duplicate(CopyMode::WithDifferentIds);
        Some(self.push_reference_curve(curve))
    }

    fn push_reference_curve(&mut self, curve: ReferenceCurve) -> &mut ReferenceCurve {
        self.changes
            .record(Change::ReferenceCurveCreated { uuid: curve.uuid() });
        self.reference_curves.push(curve);
        let last = self.reference_curves.len() - 1;
        &mut self.reference_curves[last]
    }

    /// Returns false for an unknown curve or one still used as an envelope
    pub fn remove_reference_curve(&mut self, id: &Uuid) -> bool {
        if self.errors.iter().any(|error| error.envelope() == *id) {
            return false;
        }
        let Some(index) = self.reference_curves.iter().position(|c| c.uuid() == *id) else {
            return false;
        };
        self.reference_curves.remove(index);
        self.changes.record(Change::ReferenceCurveRemoved { uuid: *id });
        true
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.changes
    }

    pub(crate) fn change_log_mut(&mut self) -> &mut ChangeLog {
        &mut self.changes
    }

    pub fn is_change_tracking_enabled(&self) -> bool {
        self.changes.is_enabled()
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.changes.set_enabled(enabled);
        if let Some(set) = &mut self.hardware_parameters {
            set.set_change_tracking_enabled(enabled);
        }
        for error in &mut self.errors {
            error.set_change_tracking_enabled(enabled);
        }
        for curve in &mut self.reference_curves {
            curve.set_change_tracking_enabled(enabled);
        }
    }

    /// Copy of the shared fields under a new identity
    ///
    /// The filter parameter set id is left nil: the caller decides whether
    /// the copy gets a duplicated set. Seam error envelopes follow the
    /// copied reference curves.
    pub fn copy(&self, mode: CopyMode) -> MeasureTask {
        let uuid = uuid_utils::duplicate_uuid(mode, self.uuid);
        debug!(source = %self.uuid, copy = %uuid, ?mode, "copying measure task");
        let reference_curves: Vec<ReferenceCurve> =
            self.reference_curves.iter().map(|curve| curve.duplicate(mode)).collect();
        let curve_ids: HashMap<Uuid, Uuid> = self
            .reference_curves
            .iter()
            .zip(&reference_curves)
            .map(|(source, copy)| (source.uuid(), copy.uuid()))
            .collect();
        let errors = self
            .errors
            .iter()
            .map(|error| {
                let mut copy = error.duplicate(mode);
                copy.remap_envelope(mode, &curve_ids);
                copy
            })
            .collect();
        MeasureTask {
            uuid,
            number: self.number,
            name: self.name.clone(),
            graph_reference: self.graph_reference.clone(),
            graph_param_set: Uuid::nil(),
            hardware_parameters: self.hardware_parameters.as_ref().map(|set| set.duplicate(mode)),
            laser_control_preset: self.laser_control_preset,
            errors,
            reference_curves,
            changes: ChangeLog::new(self.changes.is_enabled()),
        }
    }

    /// Own entries, then `{"hardwareParameters": [...]}` and
    /// `{"errors": [{"error", "changes"}]}` when non-empty
    pub fn changes(&self) -> Vec<Value> {
        let mut changes = self.changes.to_json();
        if let Some(set) = &self.hardware_parameters {
            if set.has_changes() {
                changes.push(json!({ "hardwareParameters": set.changes() }));
            }
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
            changes.push(json!({ "errors": errors }));
        }
        let curves: Vec<Value> = self
            .reference_curves
            .iter()
            .filter(|curve| !curve.change_log().is_empty())
            .map(|curve| {
                json!({
                    "referenceCurve": curve.to_json(),
                    "changes": curve.change_log().to_json(),
                })
            })
            .collect();
        if !curves.is_empty() {
            changes.push(json!({ "referenceCurves": curves }));
        }
        changes
    }

    pub(crate) fn write_json(&self, object: &mut JsonObject) {
        object.insert(json::UUID.into(), json::uuid_value(&self.uuid));
        object.insert(json::NAME.into(), Value::String(self.name.clone()));
        object.insert(json::NUMBER.into(), Value::from(self.number));
        self.graph_reference.write_json(object);
        object.insert(json::GRAPH_PARAM_SET.into(), json::uuid_value(&self.graph_param_set));
        if let Some(set) = &self.hardware_parameters {
            object.insert(
                json::HARDWARE.into(),
                json!({ "parameterSet": set.to_json() }),
            );
        }
        object.insert(json::PRESET_ID.into(), json::uuid_value(&self.laser_control_preset));
        object.insert(
            json::SUM_ERROR.into(),
            Value::Array(self.errors.iter().map(SeamError::to_json).collect()),
        );
        object.insert(
            json::REFERENCE_CURVES.into(),
            Value::Array(self.reference_curves.iter().map(ReferenceCurve::to_json).collect()),
        );
    }

    /// Missing uuid is generated; curves fall back to the legacy
    /// `referenceCurveSet` key
    pub(crate) fn read_json(object: &JsonObject) -> MeasureTask {
        let mut reference_curves: Vec<ReferenceCurve> = json::objects(object, json::REFERENCE_CURVES)
            .filter_map(ReferenceCurve::from_json)
            .collect();
        if reference_curves.is_empty() {
            reference_curves = json::objects(object, json::REFERENCE_CURVE_SET)
                .filter_map(ReferenceCurve::from_json)
                .collect();
        }
        let uuid = json::read_optional_uuid(object, json::UUID).unwrap_or_else(uuid_utils::generate);
        let graph_reference = GraphReference::from_json(object);
        let graph_param_set = if graph_reference.is_linked() {
            Uuid::nil()
        } else {
            json::read_uuid(object, json::GRAPH_PARAM_SET)
        };
        MeasureTask {
            uuid,
            number: json::read_i32(object, json::NUMBER, 0),
            name: json::read_string(object, json::NAME),
            graph_reference,
            graph_param_set,
            hardware_parameters: json::read_object(object, json::HARDWARE)
                .and_then(|hardware| json::read_object(hardware, json::PARAMETER_SET))
                .and_then(ParameterSet::from_json),
            laser_control_preset: json::read_uuid(object, json::PRESET_ID),
            errors: json::objects(object, json::SUM_ERROR)
                .filter_map(SeamError::from_json)
                .collect(),
            reference_curves,
            changes: ChangeLog::default(),
        }
    }
}
