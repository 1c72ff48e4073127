//! Seams: measure tasks that own intervals, interval errors and links

use crate::attributes::AttributeCatalog;
use crate::change_tracker::ChangeLog;
use crate::copy_mode::CopyMode;
use crate::filter_parameter::FilterParameter;
use crate::json::{self, JsonObject};
use crate::linked_seam::{self, LinkedSeam};
use crate::measure_task::MeasureTask;
use crate::parameter_set::ParameterSet;
use crate::product::ParameterSetPool;
use crate::quality_error::{IntervalError, TaskContext};
use crate::seam_interval::{IntervalRef, SeamInterval};
use crate::uuid_utils;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_TRIGGER_DELTA: i32 = 10000;

/// Point in the assembly image, `(-1, -1)` when unset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Default for Point {
    fn default() -> Self {
        Self { x: -1.0, y: -1.0 }
    }
}

impl Point {
    pub fn to_json(&self) -> Value {
        json!({ "X": self.x, "Y": self.y })
    }

    pub fn from_json(object: &JsonObject) -> Point {
        Point {
            x: json::read_f64(object, json::X, -1.0),
            y: json::read_f64(object, json::Y, -1.0),
        }
    }
}

/// Region of interest in sensor pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for Rect {
    fn default() -> Self {
        Self {
            x: -1,
            y: -1,
            width: 0,
            height: 0,
        }
    }
}

impl Rect {
    pub fn to_json(&self) -> Value {
        json!({
            "X": self.x,
            "Y": self.y,
            "width": self.width,
            "height": self.height,
        })
    }

    pub fn from_json(object: &JsonObject) -> Rect {
        let default = Rect::default();
        Rect {
            x: json::read_i32(object, json::X, default.x),
            y: json::read_i32(object, json::Y, default.y),
            width: json::read_i32(object, json::WIDTH, default.width),
            height: json::read_i32(object, json::HEIGHT, default.height),
        }
    }
}

/// Result of [`Seam::duplicate`]
///
/// `parameter_set` is the filter parameter set created for the copy. The
/// caller registers it with the destination product.
#[derive(Debug)]
pub struct SeamCopy {
    pub seam: Seam,
    pub parameter_set: Option<ParameterSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Seam {
    task: MeasureTask,
    series: Uuid,
    position_in_assembly_image: Point,
    roi: Rect,
    trigger_delta: i32,
    velocity: i32,
    thickness_left: i32,
    thickness_right: i32,
    target_difference: i32,
    moving_direction: i32,
    intervals: Vec<SeamInterval>,
    interval_errors: Vec<IntervalError>,
    links: Vec<LinkedSeam>,
}

macro_rules! int_property {
    ($getter:ident, $setter:ident, $change:expr) => {
        pub fn $getter(&self) -> i32 {
            self.$getter
        }

        pub fn $setter(&mut self, value: i32) {
            if self.$getter == value {
                return;
            }
            self.task.change_log_mut().property($change, self.$getter, value);
            self.$getter = value;
        }
    };
}

impl Seam {
    pub fn new(uuid: Uuid, series: Uuid) -> Self {
        Self {
            task: MeasureTask::new(uuid),
            series,
            position_in_assembly_image: Point::default(),
            roi: Rect::default(),
            trigger_delta: DEFAULT_TRIGGER_DELTA,
            velocity: 0,
            thickness_left: 0,
            thickness_right: 0,
            target_difference: 0,
            moving_direction: 0,
            intervals: Vec::new(),
            interval_errors: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn task(&self) -> &MeasureTask {
        &self.task
    }

    pub fn task_mut(&mut self) -> &mut MeasureTask {
        &mut self.task
    }

    pub fn uuid(&self) -> Uuid {
        self.task.uuid()
    }

    pub fn number(&self) -> i32 {
        self.task.number()
    }

    pub fn visual_number(&self) -> i32 {
        self.task.visual_number()
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Uuid of the owning seam series
    pub fn series(&self) -> Uuid {
        self.series
    }

    pub(crate) fn set_series(&mut self, series: Uuid) {
        self.series = series;
    }

    pub fn position_in_assembly_image(&self) -> Point {
        self.position_in_assembly_image
    }

    pub fn set_position_in_assembly_image(&mut self, position: Point) {
        if self.position_in_assembly_image == position {
            return;
        }
        self.task.change_log_mut().property(
            "positionInAssemblyImage",
            self.position_in_assembly_image.to_json(),
            position.to_json(),
        );
        self.position_in_assembly_image = position;
    }

    pub fn roi(&self) -> Rect {
        self.roi
    }

    pub fn set_roi(&mut self, roi: Rect) {
        if self.roi == roi {
            return;
        }
        self.task.change_log_mut().property("roi", self.roi.to_json(), roi.to_json());
        self.roi = roi;
    }

    int_property!(trigger_delta, set_trigger_delta, "triggerDelta");
    int_property!(velocity, set_velocity, "velocity");
    int_property!(thickness_left, set_thickness_left, "Left Thickness Changed");
    int_property!(thickness_right, set_thickness_right, "Right Thickness Changed");
    int_property!(target_difference, set_target_difference, "Target Difference Changed");
    int_property!(moving_direction, set_moving_direction, "movingDirection");

    pub fn intervals(&self) -> &[SeamInterval] {
        &self.intervals
    }

    pub fn find_seam_interval(&self, id: &Uuid) -> Option<&SeamInterval> {
        self.intervals.iter().find(|i| i.uuid() == *id)
    }

    pub fn find_seam_interval_mut(&mut self, id: &Uuid) -> Option<&mut SeamInterval> {
        self.intervals.iter_mut().find(|i| i.uuid() == *id)
    }

    pub fn interval_ref(&self, id: &Uuid) -> Option<IntervalRef<'_>> {
        self.find_seam_interval(id).map(|interval| IntervalRef::new(self, interval))
    }

    pub fn interval_refs(&self) -> impl Iterator<Item = IntervalRef<'_>> {
        self.intervals.iter().map(move |interval| IntervalRef::new(self, interval))
    }

    /// Sum of all interval lengths
    pub fn length(&self) -> i64 {
        self.intervals.iter().map(SeamInterval::length).sum()
    }

    fn max_interval_number(&self) -> i32 {
        self.intervals.iter().map(SeamInterval::number).max().unwrap_or(-1)
    }

    fn push_interval(&mut self, mut interval: SeamInterval) -> &mut SeamInterval {
        interval.set_change_tracking_enabled(self.task.is_change_tracking_enabled());
        self.task.change_log_mut().record(interval.created_change());
        for error in &mut self.interval_errors {
            error.add_interval(interval.uuid());
        }
        self.intervals.push(interval);
        let last = self.intervals.len() - 1;
        &mut self.intervals[last]
    }

    /// Create interval 0 unless the seam already has intervals
    pub fn create_first_seam_interval(&mut self) -> Option<&mut SeamInterval> {
        if !self.intervals.is_empty() {
            return None;
        }
        let mut interval = SeamInterval::new(uuid_utils::generate(), 0);
        interval.set_name("First Seam Interval");
        Some(self.push_interval(interval))
    }

    /// Append an interval numbered after the current maximum
    pub fn create_seam_interval(&mut self) -> &mut SeamInterval {
        let interval = SeamInterval::new(uuid_utils::generate(), self.max_interval_number() + 1);
        debug!(seam = %self.uuid(), number = interval.number(), "creating seam interval");
        self.push_interval(interval)
    }

    /// Returns false for an unknown interval
    pub fn destroy_seam_interval(&mut self, id: &Uuid) -> bool {
        let Some(index) = self.intervals.iter().position(|i| i.uuid() == *id) else {
            return false;
        };
        let interval = self.intervals.remove(index);
        self.task.change_log_mut().record(interval.removed_change());
        for error in &mut self.interval_errors {
            error.remove_interval(id);
        }
        true
    }

    pub fn interval_errors(&self) -> &[IntervalError] {
        &self.interval_errors
    }

    pub fn interval_error_mut(&mut self, index: usize) -> Option<&mut IntervalError> {
        self.interval_errors.get_mut(index)
    }

    pub fn find_interval_error(&self, id: &Uuid) -> Option<&IntervalError> {
        self.interval_errors.iter().find(|e| e.uuid() == *id)
    }

    /// Append an interval error covering every current interval
    pub fn add_interval_error(
        &mut self,
        variant_id: Uuid,
        catalog: Option<&dyn AttributeCatalog>,
    ) -> &mut IntervalError {
        let mut error = IntervalError::default();
        error.base_mut().set_variant_id(variant_id);
        if let Some(catalog) = catalog {
            error.init_from_attributes(catalog);
        }
        for interval in &self.intervals {
            error.add_interval(interval.uuid());
        }
        error.set_change_tracking_enabled(self.task.is_change_tracking_enabled());
        self.task.change_log_mut().record(error.base().created_change());
        self.interval_errors.push(error);
        let last = self.interval_errors.len() - 1;
        &mut self.interval_errors[last]
    }

    /// Out of range indices are ignored
    pub fn remove_interval_error(&mut self, index: usize) {
        if index >= self.interval_errors.len() {
            return;
        }
        let error = self.interval_errors.remove(index);
        self.task.change_log_mut().record(error.base().removed_change());
    }

    /// Number of error instances, one per interval error and interval
    pub fn interval_error_count(&self) -> usize {
        self.interval_errors.len() * self.intervals.len()
    }

    /// Telemetry export of every interval error over every interval
    pub fn interval_parameter_list(&self, context: &TaskContext) -> Vec<FilterParameter> {
        let intervals: Vec<(Uuid, i32, usize)> = self
            .intervals
            .iter()
            .map(|i| (i.uuid(), i.number(), i.level()))
            .collect();
        let context = TaskContext {
            seam: Some(self.number()),
            ..*context
        };
        self.interval_errors
            .iter()
            .flat_map(|error| error.to_parameter_list(&intervals, &context))
            .collect()
    }

    pub fn links(&self) -> &[LinkedSeam] {
        &self.links
    }

    pub fn find_link(&self, id: &Uuid) -> Option<&LinkedSeam> {
        self.links.iter().find(|l| l.uuid() == *id)
    }

    pub fn find_link_by_label(&self, label: &str) -> Option<&LinkedSeam> {
        self.links.iter().find(|l| l.label() == label)
    }

    /// Candidate link for `label`, not yet attached
    ///
    /// `None` when the label is taken or not an integer. The owning series
    /// still has to check the number against its seams.
    pub(crate) fn prepare_link(&self, label: &str) -> Option<LinkedSeam> {
        if self.find_link_by_label(label).is_some() {
            return None;
        }
        linked_seam::label_number(label)?;
        let mut link = LinkedSeam::new(uuid_utils::generate(), self.uuid(), self.name(), label)?;
        link.set_change_tracking_enabled(self.task.is_change_tracking_enabled());
        Some(link)
    }

    pub(crate) fn attach_link(&mut self, link: LinkedSeam) {
        self.task.change_log_mut().record(link.created_change());
        self.links.push(link);
    }

    pub(crate) fn detach_link(&mut self, id: &Uuid) -> Option<LinkedSeam> {
        let index = self.links.iter().position(|l| l.uuid() == *id)?;
        Some(self.links.remove(index))
    }

    pub fn change_log(&self) -> &ChangeLog {
        self.task.change_log()
    }

    pub fn is_change_tracking_enabled(&self) -> bool {
        self.task.is_change_tracking_enabled()
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.task.set_change_tracking_enabled(enabled);
        for interval in &mut self.intervals {
            interval.set_change_tracking_enabled(enabled);
        }
        for error in &mut self.interval_errors {
            error.set_change_tracking_enabled(enabled);
        }
        for link in &mut self.links {
            link.set_change_tracking_enabled(enabled);
        }
    }

    /// Copy of this seam for the series `series`
    ///
    /// `source_pool` is the filter parameter set pool of the source product
    /// and is only given when the copy lands in a product. In that case
    /// the copy gets a duplicate of the source's filter parameter set, or
    /// a new empty one when the set is not in the pool. Linked graphs keep
    /// using the target's set. Links are cloned only for identical copies.
    pub fn duplicate(
        &self,
        mode: CopyMode,
        series: Uuid,
        source_pool: Option<&ParameterSetPool>,
    ) -> SeamCopy {
        let task = self.task.copy(mode);
        let uuid = task.uuid();
        let mut seam = Seam {
            task,
            series,
            position_in_assembly_image: self.position_in_assembly_image,
            roi: self.roi,
            trigger_delta: self.trigger_delta,
            velocity: self.velocity,
            thickness_left: self.thickness_left,
            thickness_right: self.thickness_right,
            target_difference: self.target_difference,
            moving_direction: self.moving_direction,
            intervals: self.intervals.iter().map(|i| i.duplicate(mode)).collect(),
            interval_errors: Vec::new(),
            links: Vec::new(),
        };
        let intervals: Vec<Uuid> = seam.intervals.iter().map(SeamInterval::uuid).collect();
        seam.interval_errors = self
            .interval_errors
            .iter()
            .map(|error| error.duplicate(mode, &intervals))
            .collect();
        for interval in &seam.intervals {
            seam.task.change_log_mut().record(interval.created_change());
        }
        if mode == CopyMode::Identical {
            seam.links = self.links.iter().map(|link| link.duplicate(mode, uuid)).collect();
        }

        let mut parameter_set = None;
        if let Some(pool) = source_pool {
            if !seam.task.graph_reference().is_linked() {
                let set = match pool.get(&self.task.graph_param_set()) {
                    Some(source) => source.duplicate(mode),
                    None => ParameterSet::new(uuid_utils::generate()),
                };
                seam.task.set_graph_param_set(set.uuid());
                parameter_set = Some(set);
            }
        }
        SeamCopy { seam, parameter_set }
    }

    /// Own entries, task children, interval errors, then intervals keyed
    /// by number
    pub fn changes(&self) -> Vec<Value> {
        let mut changes = self.task.changes();
        let errors: Vec<Value> = self
            .interval_errors
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
            changes.push(json!({ "intervalErrors": errors }));
        }
        let intervals: Vec<Value> = self
            .intervals
            .iter()
            .filter(|i| !i.change_log().is_empty())
            .map(|i| {
                let key = i.number().to_string();
                json!({ key: i.change_log().to_json() })
            })
            .collect();
        if !intervals.is_empty() {
            changes.push(json!({ "interval": intervals }));
        }
        changes
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        self.task.write_json(&mut object);
        object.insert(
            json::SEAM_INTERVALS.into(),
            Value::Array(self.intervals.iter().map(SeamInterval::to_json).collect()),
        );
        object.insert(
            json::LINKED_SEAMS.into(),
            Value::Array(self.links.iter().map(LinkedSeam::to_json).collect()),
        );
        object.insert(
            json::POSITION_IN_ASSEMBLY_IMAGE.into(),
            self.position_in_assembly_image.to_json(),
        );
        object.insert(json::ROI.into(), self.roi.to_json());
        object.insert(
            json::INTERVAL_SUM_ERROR.into(),
            Value::Array(self.interval_errors.iter().map(IntervalError::to_json).collect()),
        );
        object.insert(json::TRIGGER_DELTA.into(), Value::from(self.trigger_delta));
        object.insert(json::VELOCITY.into(), Value::from(self.velocity));
        object.insert(json::THICKNESS_LEFT.into(), Value::from(self.thickness_left));
        object.insert(json::THICKNESS_RIGHT.into(), Value::from(self.thickness_right));
        object.insert(json::TARGET_DIFFERENCE.into(), Value::from(self.target_difference));
        object.insert(json::MOVING_DIRECTION.into(), Value::from(self.moving_direction));
        Value::Object(object)
    }

    /// Returns `None` for an empty object
    ///
    /// Intervals are sorted by number. The error id maps of the interval
    /// errors are brought in line with the intervals that were read.
    pub fn from_json(object: &JsonObject, series: Uuid) -> Option<Seam> {
        if object.is_empty() {
            return None;
        }
        let task = MeasureTask::read_json(object);
        let uuid = task.uuid();

        let mut intervals: Vec<SeamInterval> = json::objects(object, json::SEAM_INTERVALS)
            .filter_map(SeamInterval::from_json)
            .collect();
        intervals.sort_by_key(SeamInterval::number);

        let mut interval_errors: Vec<IntervalError> = json::objects(object, json::INTERVAL_SUM_ERROR)
            .filter_map(IntervalError::from_json)
            .collect();
        for error in &mut interval_errors {
            let stale: Vec<Uuid> = error
                .error_ids()
                .keys()
                .filter(|id| !intervals.iter().any(|i| i.uuid() == **id))
                .copied()
                .collect();
            for id in &stale {
                error.remove_interval(id);
            }
            for interval in &intervals {
                error.add_interval(interval.uuid());
            }
        }

        Some(Seam {
            task,
            series,
            position_in_assembly_image: json::read_object(object, json::POSITION_IN_ASSEMBLY_IMAGE)
                .map(Point::from_json)
                .unwrap_or_default(),
            roi: json::read_object(object, json::ROI)
                .map(Rect::from_json)
                .unwrap_or_default(),
            trigger_delta: json::read_i32(object, json::TRIGGER_DELTA, DEFAULT_TRIGGER_DELTA),
            velocity: json::read_i32(object, json::VELOCITY, 0),
            thickness_left: json::read_i32(object, json::THICKNESS_LEFT, 0),
            thickness_right: json::read_i32(object, json::THICKNESS_RIGHT, 0),
            target_difference: json::read_i32(object, json::TARGET_DIFFERENCE, 0),
            moving_direction: json::read_i32(object, json::MOVING_DIRECTION, 0),
            intervals,
            interval_errors,
            links: json::objects(object, json::LINKED_SEAMS)
                .filter_map(|link| LinkedSeam::from_json(link, uuid))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seam() -> Seam {
        let mut seam = Seam::new(uuid_utils::generate(), uuid_utils::generate());
        seam.set_change_tracking_enabled(true);
        seam
    }

    #[test]
    fn test_defaults() {
        let seam = Seam::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(seam.trigger_delta(), 10000);
        assert_eq!(seam.position_in_assembly_image(), Point { x: -1.0, y: -1.0 });
        assert_eq!(seam.roi(), Rect { x: -1, y: -1, width: 0, height: 0 });
        assert_eq!(seam.length(), 0);
    }

    #[test]
    fn test_first_interval_only_once() {
        let mut seam = seam();
        assert_eq!(seam.create_first_seam_interval().unwrap().name(), "First Seam Interval");
        assert!(seam.create_first_seam_interval().is_none());
        assert_eq!(seam.intervals().len(), 1);
    }

    #[test]
    fn test_interval_numbering_and_length() {
        let mut seam = seam();
        for length in [10, 20, 30] {
            seam.create_seam_interval().set_length(length);
        }
        let numbers: Vec<i32> = seam.intervals().iter().map(SeamInterval::number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
        assert_eq!(seam.length(), 60);

        let middle = seam.intervals()[1].uuid();
        assert!(seam.destroy_seam_interval(&middle));
        assert!(!seam.destroy_seam_interval(&middle));
        assert_eq!(seam.create_seam_interval().number(), 3);
    }

    #[test]
    fn test_interval_error_map_follows_intervals() {
        let mut seam = seam();
        seam.create_seam_interval();
        seam.create_seam_interval();
        seam.add_interval_error(Uuid::new_v4(), None);
        assert_eq!(seam.interval_errors()[0].error_ids().len(), 2);

        let created = seam.create_seam_interval().uuid();
        assert_eq!(seam.interval_errors()[0].error_ids().len(), 3);
        assert!(seam.interval_errors()[0].error_id(&created).is_some());

        seam.destroy_seam_interval(&created);
        assert_eq!(seam.interval_errors()[0].error_ids().len(), 2);
        assert_eq!(seam.interval_error_count(), 2);

        seam.remove_interval_error(5);
        assert_eq!(seam.interval_errors().len(), 1);
        seam.remove_interval_error(0);
        assert_eq!(seam.interval_error_count(), 0);
    }

    #[test]
    fn test_interval_refs_delegate_to_seam() {
        let mut seam = seam();
        let graph = Uuid::new_v4();
        seam.task_mut().set_graph(graph);
        seam.create_seam_interval();
        seam.create_seam_interval();
        assert!(seam.interval_refs().all(|i| i.graph() == graph));
    }

    #[test]
    fn test_prepare_link_rejects_duplicate_and_non_numeric_labels() {
        let mut seam = seam();
        let link = seam.prepare_link("3").unwrap();
        assert_eq!(link.target(), seam.uuid());
        seam.attach_link(link);
        assert!(seam.prepare_link("3").is_none());
        assert!(seam.prepare_link("three").is_none());
        assert_eq!(seam.links().len(), 1);
    }

    #[test]
    fn test_duplicate_identical_keeps_ids_and_links() {
        let mut seam = seam();
        seam.create_seam_interval();
        seam.add_interval_error(Uuid::new_v4(), None);
        let link = seam.prepare_link("5").unwrap();
        seam.attach_link(link);

        let copy = seam.duplicate(CopyMode::Identical, Uuid::new_v4(), None);
        assert!(copy.parameter_set.is_none());
        let copy = copy.seam;
        assert_eq!(copy.uuid(), seam.uuid());
        assert_eq!(copy.intervals()[0].uuid(), seam.intervals()[0].uuid());
        assert_eq!(copy.interval_errors()[0].error_ids(), seam.interval_errors()[0].error_ids());
        assert_eq!(copy.links().len(), 1);
        assert_eq!(copy.links()[0].target(), copy.uuid());
    }

    #[test]
    fn test_duplicate_with_different_ids() {
        let mut seam = seam();
        seam.create_seam_interval();
        seam.create_seam_interval();
        seam.add_interval_error(Uuid::new_v4(), None);
        let link = seam.prepare_link("5").unwrap();
        seam.attach_link(link);

        let copy = seam.duplicate(CopyMode::WithDifferentIds, seam.series(), None).seam;
        assert_ne!(copy.uuid(), seam.uuid());
        assert!(copy.links().is_empty());
        let error = &copy.interval_errors()[0];
        assert_eq!(error.error_ids().len(), 2);
        for interval in copy.intervals() {
            assert!(seam.find_seam_interval(&interval.uuid()).is_none());
            let id = error.error_id(&interval.uuid()).unwrap();
            assert!(!seam.interval_errors()[0].error_ids().values().any(|v| *v == id));
        }
    }

    #[test]
    fn test_duplicate_with_pool_creates_parameter_set() {
        let mut pool = ParameterSetPool::default();
        let mut set = ParameterSet::new(Uuid::new_v4());
        set.create_parameter(Uuid::new_v4(), "Threshold", crate::parameter::DataType::Integer, json!(4));
        let set_id = set.uuid();
        pool.insert(set);

        let mut seam = seam();
        seam.task_mut().set_graph_param_set(set_id);
        let copy = seam.duplicate(CopyMode::WithDifferentIds, seam.series(), Some(&pool));
        let duplicate = copy.parameter_set.unwrap();
        assert_ne!(duplicate.uuid(), set_id);
        assert_eq!(duplicate.parameters().len(), 1);
        assert_eq!(copy.seam.task().graph_param_set(), duplicate.uuid());

        let mut orphan = Seam::new(Uuid::new_v4(), Uuid::new_v4());
        orphan.task_mut().set_graph_param_set(Uuid::new_v4());
        let copy = orphan.duplicate(CopyMode::Identical, orphan.series(), Some(&pool));
        assert!(copy.parameter_set.unwrap().is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let mut seam = seam();
        seam.task_mut().set_name("Seam");
        seam.set_position_in_assembly_image(Point { x: 10.5, y: 20.0 });
        seam.set_roi(Rect { x: 1, y: 2, width: 30, height: 40 });
        seam.set_velocity(100);
        seam.set_thickness_left(3);
        seam.set_moving_direction(1);
        seam.create_seam_interval().set_length(500);
        seam.add_interval_error(Uuid::new_v4(), None);
        let link = seam.prepare_link("4").unwrap();
        seam.attach_link(link);
        seam.set_change_tracking_enabled(false);

        let value = seam.to_json();
        assert_eq!(value["positionInAssemblyImage"]["X"], json!(10.5));
        assert_eq!(value["roi"]["width"], json!(30));
        let parsed = Seam::from_json(value.as_object().unwrap(), seam.series()).unwrap();
        assert_eq!(parsed.to_json(), value);
        assert_eq!(parsed.links()[0].target(), parsed.uuid());
        assert_eq!(parsed.length(), 500);
    }

    #[test]
    fn test_from_json_defaults_and_sorting() {
        let object = json!({
            "uuid": "3f2504e0-4f89-11d3-9a0c-0305e82c3301",
            "seamIntervals": [
                {"uuid": Uuid::new_v4().to_string(), "number": 1, "length": "5"},
                {"uuid": Uuid::new_v4().to_string(), "number": 0, "length": "7"}
            ],
            "intervalSumError": [{"uuid": Uuid::new_v4().to_string(), "variantId": Uuid::new_v4().to_string()}]
        });
        let seam = Seam::from_json(object.as_object().unwrap(), Uuid::nil()).unwrap();
        assert_eq!(seam.trigger_delta(), DEFAULT_TRIGGER_DELTA);
        assert_eq!(seam.intervals()[0].number(), 0);
        assert_eq!(seam.interval_errors()[0].error_ids().len(), 2);
        assert!(Seam::from_json(&JsonObject::new(), Uuid::nil()).is_none());
    }

    #[test]
    fn test_changes_include_intervals() {
        let mut seam = seam();
        seam.set_velocity(5);
        seam.create_seam_interval().set_length(30);
        let changes = seam.changes();
        assert_eq!(changes[0]["propertyName"], json!("velocity"));
        let interval = changes.iter().find(|c| c.get("interval").is_some()).unwrap();
        assert_eq!(interval["interval"][0]["0"][0]["propertyName"], json!("length"));
    }
}
