//! Seam series: ordered seams and links plus series level errors

use crate::attributes::AttributeCatalog;
use crate::change_tracker::{Change, ChangeLog};
use crate::copy_mode::CopyMode;
use crate::json::{self, JsonObject};
use crate::linked_seam::LinkedSeam;
use crate::measure_task::MeasureTask;
use crate::parameter_set::ParameterSet;
use crate::product::ParameterSetPool;
use crate::quality_error::SeamSeriesError;
use crate::seam::Seam;
use crate::uuid_utils;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

/// One position in a series
///
/// A link entry only names the link and its target; the [`LinkedSeam`]
/// itself lives in the target seam.
#[derive(Debug, Clone, PartialEq)]
pub enum SeamEntry {
    Seam(Seam),
    Link { uuid: Uuid, target: Uuid },
}

impl SeamEntry {
    pub fn uuid(&self) -> Uuid {
        match self {
            SeamEntry::Seam(seam) => seam.uuid(),
            SeamEntry::Link { uuid, .. } => *uuid,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, SeamEntry::Link { .. })
    }
}

/// A series entry with links resolved to their target
#[derive(Debug, Clone, Copy)]
pub enum SeamRef<'a> {
    Seam(&'a Seam),
    Link { link: &'a LinkedSeam, target: &'a Seam },
}

impl<'a> SeamRef<'a> {
    pub fn uuid(&self) -> Uuid {
        match self {
            SeamRef::Seam(seam) => seam.uuid(),
            SeamRef::Link { link, .. } => link.uuid(),
        }
    }

    pub fn number(&self) -> i32 {
        match self {
            SeamRef::Seam(seam) => seam.number(),
            SeamRef::Link { link, .. } => link.number(),
        }
    }

    pub fn visual_number(&self) -> i32 {
        self.number() + 1
    }

    pub fn name(&self) -> &'a str {
        match self {
            SeamRef::Seam(seam) => seam.name(),
            SeamRef::Link { link, .. } => link.name(),
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, SeamRef::Link { .. })
    }

    /// The seam whose configuration applies; the target for links
    pub fn seam(&self) -> &'a Seam {
        match self {
            SeamRef::Seam(seam) => seam,
            SeamRef::Link { target, .. } => target,
        }
    }

    pub fn link(&self) -> Option<&'a LinkedSeam> {
        match self {
            SeamRef::Seam(_) => None,
            SeamRef::Link { link, .. } => Some(link),
        }
    }
}

/// Result of [`SeamSeries::duplicate`]
#[derive(Debug)]
pub struct SeamSeriesCopy {
    pub series: SeamSeries,
    pub parameter_sets: Vec<ParameterSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeamSeries {
    task: MeasureTask,
    product: Uuid,
    entries: Vec<SeamEntry>,
    errors: Vec<SeamSeriesError>,
}

impl SeamSeries {
    pub fn new(uuid: Uuid, product: Uuid) -> Self {
        Self {
            task: MeasureTask::new(uuid),
            product,
            entries: Vec::new(),
            errors: Vec::new(),
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

    /// Uuid of the owning product
    pub fn product(&self) -> Uuid {
        self.product
    }

    pub fn entries(&self) -> &[SeamEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain seams in entry order
    pub fn seams(&self) -> impl Iterator<Item = &Seam> {
        self.entries.iter().filter_map(|entry| match entry {
            SeamEntry::Seam(seam) => Some(seam),
            SeamEntry::Link { .. } => None,
        })
    }

    pub fn seams_mut(&mut self) -> impl Iterator<Item = &mut Seam> {
        self.entries.iter_mut().filter_map(|entry| match entry {
            SeamEntry::Seam(seam) => Some(seam),
            SeamEntry::Link { .. } => None,
        })
    }

    fn resolve<'a>(&'a self, entry: &'a SeamEntry) -> Option<SeamRef<'a>> {
        match entry {
            SeamEntry::Seam(seam) => Some(SeamRef::Seam(seam)),
            SeamEntry::Link { uuid, target } => {
                let target = self.find_seam(target)?;
                let link = target.find_link(uuid)?;
                Some(SeamRef::Link { link, target })
            }
        }
    }

    /// Every entry, links resolved
    pub fn all_seams(&self) -> Vec<SeamRef<'_>> {
        self.entries.iter().filter_map(|entry| self.resolve(entry)).collect()
    }

    pub fn all_linked_seams(&self) -> Vec<&LinkedSeam> {
        self.seams().flat_map(|seam| seam.links()).collect()
    }

    /// Plain seam by uuid
    pub fn find_seam(&self, id: &Uuid) -> Option<&Seam> {
        self.seams().find(|seam| seam.uuid() == *id)
    }

    pub fn find_seam_mut(&mut self, id: &Uuid) -> Option<&mut Seam> {
        self.seams_mut().find(|seam| seam.uuid() == *id)
    }

    /// Seam or link by uuid
    pub fn find_entry(&self, id: &Uuid) -> Option<SeamRef<'_>> {
        let entry = self.entries.iter().find(|entry| entry.uuid() == *id)?;
        self.resolve(entry)
    }

    /// Seam or link by number
    pub fn find_seam_by_number(&self, number: i32) -> Option<SeamRef<'_>> {
        self.all_seams().into_iter().find(|seam| seam.number() == number)
    }

    fn max_seam_number(&self) -> i32 {
        self.all_seams().iter().map(SeamRef::number).max().unwrap_or(-1)
    }

    /// Append a seam numbered after the last entry, returning its uuid
    ///
    /// The seam is reparented to this series and picks up the change
    /// tracking state of the series.
    pub(crate) fn insert_seam(&mut self, mut seam: Seam) -> Uuid {
        let number = self.max_seam_number() + 1;
        seam.set_series(self.uuid());
        seam.set_change_tracking_enabled(false);
        seam.task_mut().set_number(number);
        seam.set_change_tracking_enabled(self.task.is_change_tracking_enabled());
        self.task.change_log_mut().record(Change::SeamCreated {
            uuid: seam.uuid(),
            number,
        });
        let uuid = seam.uuid();
        debug!(series = %self.uuid(), seam = %uuid, number, "adding seam");
        self.entries.push(SeamEntry::Seam(seam));
        uuid
    }

    pub fn create_seam(&mut self) -> Uuid {
        let seam = Seam::new(uuid_utils::generate(), self.uuid());
        self.insert_seam(seam)
    }

    /// Copy `source` to the tail of this series
    ///
    /// No parameter set is created; see
    /// [`Product::create_seam_copy`](crate::Product::create_seam_copy) for
    /// copies that register one.
    pub fn create_seam_copy(&mut self, mode: CopyMode, source: &Seam) -> Uuid {
        let copy = source.duplicate(mode, self.uuid(), None);
        self.insert_seam(copy.seam)
    }

    /// Link the seam `target` under `label`
    ///
    /// Returns `None` for an unknown target, a label already used on the
    /// target, a non numeric label or a label whose number is taken in
    /// this series.
    pub fn create_seam_link(&mut self, target: &Uuid, label: &str) -> Option<&LinkedSeam> {
        let link = self.find_seam(target)?.prepare_link(label)?;
        if self.find_seam_by_number(link.number()).is_some() {
            debug!(series = %self.uuid(), label, "link number already used");
            return None;
        }
        let uuid = link.uuid();
        self.entries.push(SeamEntry::Link {
            uuid,
            target: *target,
        });
        let seam = self.find_seam_mut(target)?;
        seam.attach_link(link);
        seam.find_link(&uuid)
    }

    /// Remove a seam with all its links, or a single link
    ///
    /// Returns the number of removed entries, 0 for an unknown uuid.
    pub fn destroy_seam(&mut self, id: &Uuid) -> usize {
        let Some(index) = self.entries.iter().position(|entry| entry.uuid() == *id) else {
            return 0;
        };
        if let SeamEntry::Link { uuid, target } = self.entries[index].clone() {
            self.entries.remove(index);
            if let Some(seam) = self.find_seam_mut(&target) {
                seam.detach_link(&uuid);
            }
            return 1;
        }

        let before = self.entries.len();
        self.entries
            .retain(|entry| !matches!(entry, SeamEntry::Link { target, .. } if target == id));
        let Some(index) = self.entries.iter().position(|entry| entry.uuid() == *id) else {
            return before - self.entries.len();
        };
        let entry = self.entries.remove(index);
        if let SeamEntry::Seam(seam) = &entry {
            self.task.change_log_mut().record(Change::SeamRemoved {
                uuid: seam.uuid(),
                number: seam.number(),
            });
        }
        before - self.entries.len()
    }

    fn neighbour(&self, id: &Uuid, offset: isize) -> Option<SeamRef<'_>> {
        let index = self.entries.iter().position(|entry| entry.uuid() == *id)?;
        let neighbour = index.checked_add_signed(offset)?;
        self.entries.get(neighbour).and_then(|entry| self.resolve(entry))
    }

    pub fn previous_seam(&self, id: &Uuid) -> Option<SeamRef<'_>> {
        self.neighbour(id, -1)
    }

    pub fn next_seam(&self, id: &Uuid) -> Option<SeamRef<'_>> {
        self.neighbour(id, 1)
    }

    pub fn first_seam(&self) -> Option<SeamRef<'_>> {
        self.entries.first().and_then(|entry| self.resolve(entry))
    }

    pub fn last_seam(&self) -> Option<SeamRef<'_>> {
        self.entries.last().and_then(|entry| self.resolve(entry))
    }

    pub fn overlying_errors(&self) -> &[SeamSeriesError] {
        &self.errors
    }

    pub fn overlying_error_mut(&mut self, index: usize) -> Option<&mut SeamSeriesError> {
        self.errors.get_mut(index)
    }

    pub fn add_overlying_error(
        &mut self,
        variant_id: Uuid,
        catalog: Option<&dyn AttributeCatalog>,
    ) -> &mut SeamSeriesError {
        let mut error = SeamSeriesError::default();
        error.base_mut().set_variant_id(variant_id);
        if let Some(catalog) = catalog {
            error.init_from_attributes(catalog);
        }
        error.set_change_tracking_enabled(self.task.is_change_tracking_enabled());
        self.task.change_log_mut().record(error.base().created_change());
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
        self.task.change_log_mut().record(error.base().removed_change());
    }

    pub fn interval_error_count(&self) -> usize {
        self.seams().map(Seam::interval_error_count).sum()
    }

    pub fn change_log(&self) -> &ChangeLog {
        self.task.change_log()
    }

    pub fn set_change_tracking_enabled(&mut self, enabled: bool) {
        self.task.set_change_tracking_enabled(enabled);
        for seam in self.seams_mut() {
            seam.set_change_tracking_enabled(enabled);
        }
        for error in &mut self.errors {
            error.set_change_tracking_enabled(enabled);
        }
    }

    /// Copy for the product `product`
    ///
    /// Link entries survive only identical copies. With a source pool
    /// every seam copy gets its own filter parameter set, returned for
    /// registration with the destination product.
    pub fn duplicate(
        &self,
        mode: CopyMode,
        product: Uuid,
        source_pool: Option<&ParameterSetPool>,
    ) -> SeamSeriesCopy {
        let task = self.task.copy(mode);
        let uuid = task.uuid();
        let mut series = SeamSeries {
            task,
            product,
            entries: Vec::with_capacity(self.entries.len()),
            errors: self.errors.iter().map(|e| e.duplicate(mode)).collect(),
        };
        let mut parameter_sets = Vec::new();

        if let Some(set) = source_pool.and_then(|pool| pool.get(&self.task.graph_param_set())) {
            let set = set.duplicate(mode);
            series.task.set_graph_param_set(set.uuid());
            parameter_sets.push(set);
        }

        for entry in &self.entries {
            match entry {
                SeamEntry::Seam(seam) => {
                    let copy = seam.duplicate(mode, uuid, source_pool);
                    parameter_sets.extend(copy.parameter_set);
                    series.entries.push(SeamEntry::Seam(copy.seam));
                }
                SeamEntry::Link { .. } if mode == CopyMode::WithDifferentIds => {}
                SeamEntry::Link { .. } => series.entries.push(entry.clone()),
            }
        }
        SeamSeriesCopy {
            series,
            parameter_sets,
        }
    }

    /// Own entries and task children, then seams keyed by number
    pub fn changes(&self) -> Vec<Value> {
        let mut changes = self.task.changes();
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
        let seams: Vec<Value> = self
            .seams()
            .filter_map(|seam| {
                let seam_changes = seam.changes();
                if seam_changes.is_empty() {
                    return None;
                }
                let key = seam.number().to_string();
                Some(json!({ key: seam_changes }))
            })
            .collect();
        if !seams.is_empty() {
            changes.push(json!({ "seams": seams }));
        }
        changes
    }

    pub fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        self.task.write_json(&mut object);
        object.insert(
            json::SEAMS.into(),
            Value::Array(self.seams().map(Seam::to_json).collect()),
        );
        object.insert(
            json::OVERLYING_ERROR.into(),
            Value::Array(self.errors.iter().map(SeamSeriesError::to_json).collect()),
        );
        Value::Object(object)
    }

    /// Returns `None` for an empty object
    ///
    /// Links are read from their target seams and every entry is ordered
    /// by number.
    pub fn from_json(object: &JsonObject, product: Uuid) -> Option<SeamSeries> {
        if object.is_empty() {
            return None;
        }
        let task = MeasureTask::read_json(object);
        let uuid = task.uuid();
        let seams: Vec<Seam> = json::objects(object, json::SEAMS)
            .filter_map(|seam| Seam::from_json(seam, uuid))
            .collect();

        let mut numbered: Vec<(i32, SeamEntry)> = Vec::new();
        for seam in &seams {
            for link in seam.links() {
                numbered.push((
                    link.number(),
                    SeamEntry::Link {
                        uuid: link.uuid(),
                        target: seam.uuid(),
                    },
                ));
            }
        }
        numbered.extend(seams.into_iter().map(|seam| (seam.number(), SeamEntry::Seam(seam))));
        numbered.sort_by_key(|(number, _)| *number);

        Some(SeamSeries {
            task,
            product,
            entries: numbered.into_iter().map(|(_, entry)| entry).collect(),
            errors: json::objects(object, json::OVERLYING_ERROR)
                .filter_map(SeamSeriesError::from_json)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_with_seams(count: usize) -> SeamSeries {
        let mut series = SeamSeries::new(Uuid::new_v4(), Uuid::new_v4());
        for _ in 0..count {
            series.create_seam();
        }
        series
    }

    #[test]
    fn test_seam_numbering() {
        let mut series = series_with_seams(4);
        let numbers: Vec<i32> = series.seams().map(Seam::number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);
        let visual: Vec<i32> = series.seams().map(Seam::visual_number).collect();
        assert_eq!(visual, vec![1, 2, 3, 4]);

        let first = series.seams().next().unwrap().clone();
        let copy = series.create_seam_copy(CopyMode::WithDifferentIds, &first);
        let copy = series.find_seam(&copy).unwrap();
        assert_eq!(copy.number(), 4);
        assert_eq!(copy.visual_number(), 5);
    }

    #[test]
    fn test_link_uniqueness() {
        let mut series = series_with_seams(2);
        let target = series.seams().next().unwrap().uuid();

        let link = series.create_seam_link(&target, "3").unwrap();
        assert_eq!(link.number(), 3);
        assert!(series.create_seam_link(&target, "3").is_none());
        assert!(series.create_seam_link(&target, "1").is_none());
        assert!(series.create_seam_link(&target, "x").is_none());
        assert!(series.create_seam_link(&Uuid::new_v4(), "8").is_none());

        assert_eq!(series.entries().len(), 3);
        assert!(series.entries()[2].is_link());
        assert_eq!(series.all_linked_seams().len(), 1);
        assert_eq!(series.find_seam_by_number(3).unwrap().seam().uuid(), target);
    }

    #[test]
    fn test_destroy_seam_cascades_links() {
        let mut series = series_with_seams(2);
        let target = series.seams().next().unwrap().uuid();
        series.create_seam_link(&target, "5");
        series.create_seam_link(&target, "6");
        assert_eq!(series.entries().len(), 4);

        assert_eq!(series.destroy_seam(&target), 3);
        assert_eq!(series.entries().len(), 1);
        assert!(series.all_linked_seams().is_empty());
        assert_eq!(series.destroy_seam(&target), 0);
    }

    #[test]
    fn test_destroy_single_link() {
        let mut series = series_with_seams(1);
        let target = series.seams().next().unwrap().uuid();
        let link = series.create_seam_link(&target, "4").unwrap().uuid();
        assert_eq!(series.destroy_seam(&link), 1);
        assert!(series.find_seam(&target).unwrap().links().is_empty());
    }

    #[test]
    fn test_navigation() {
        let series = series_with_seams(3);
        let ids: Vec<Uuid> = series.seams().map(Seam::uuid).collect();
        assert!(series.previous_seam(&ids[0]).is_none());
        assert_eq!(series.next_seam(&ids[0]).unwrap().uuid(), ids[1]);
        assert_eq!(series.previous_seam(&ids[2]).unwrap().uuid(), ids[1]);
        assert!(series.next_seam(&ids[2]).is_none());
    }

    #[test]
    fn test_duplicate_links_only_identical() {
        let mut series = series_with_seams(2);
        let target = series.seams().next().unwrap().uuid();
        series.create_seam_link(&target, "5");

        let identical = series.duplicate(CopyMode::Identical, Uuid::new_v4(), None).series;
        assert_eq!(identical.entries().len(), 3);
        assert_eq!(identical.all_seams().len(), 3);

        let different = series.duplicate(CopyMode::WithDifferentIds, Uuid::new_v4(), None).series;
        assert_eq!(different.entries().len(), 2);
        assert!(different.all_linked_seams().is_empty());
        assert!(different.seams().all(|seam| seam.series() == different.uuid()));
    }

    #[test]
    fn test_json_orders_links_by_number() {
        let mut series = series_with_seams(2);
        let target = series.seams().next().unwrap().uuid();
        series.create_seam_link(&target, "5");
        series.create_seam_link(&target, "2");

        let value = series.to_json();
        assert_eq!(value["seams"].as_array().unwrap().len(), 2);
        let parsed = SeamSeries::from_json(value.as_object().unwrap(), series.product()).unwrap();
        let numbers: Vec<i32> = parsed.all_seams().iter().map(SeamRef::number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 5]);
    }

    #[test]
    fn test_change_tracking_nests_seams() {
        let mut series = series_with_seams(1);
        series.set_change_tracking_enabled(true);
        series.seams_mut().next().unwrap().set_velocity(12);
        series.create_seam();
        let changes = series.changes();
        assert_eq!(changes[0]["description"], json!("SeamCreatedChange"));
        let seams = changes.iter().find(|c| c.get("seams").is_some()).unwrap();
        assert_eq!(seams["seams"][0]["0"][0]["propertyName"], json!("velocity"));
    }

    #[test]
    fn test_overlying_errors() {
        let mut series = series_with_seams(0);
        series.add_overlying_error(Uuid::new_v4(), None).set_threshold(2.0);
        series.remove_overlying_error(3);
        assert_eq!(series.overlying_errors().len(), 1);
        series.remove_overlying_error(0);
        assert!(series.overlying_errors().is_empty());
    }
}
