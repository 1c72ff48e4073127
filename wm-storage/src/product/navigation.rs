//! Lookups and traversal across the product tree

use super::Product;
use crate::measure_task::MeasureTask;
use crate::parameter_set::ParameterSet;
use crate::quality_error::{IntervalError, SeamError, SeamSeriesError};
use crate::reference_curve::ReferenceCurve;
use crate::seam::Seam;
use crate::seam_interval::IntervalRef;
use crate::seam_series::{SeamRef, SeamSeries};
use uuid::Uuid;

/// Any measure task found by uuid
#[derive(Debug, Clone, Copy)]
pub enum MeasureTaskRef<'a> {
    SeamSeries(&'a SeamSeries),
    Seam(SeamRef<'a>),
    Interval(IntervalRef<'a>),
}

impl<'a> MeasureTaskRef<'a> {
    pub fn uuid(&self) -> Uuid {
        match self {
            MeasureTaskRef::SeamSeries(series) => series.uuid(),
            MeasureTaskRef::Seam(seam) => seam.uuid(),
            MeasureTaskRef::Interval(interval) => interval.interval().uuid(),
        }
    }

    /// Task state that applies: the target's for links and the owning
    /// seam's for intervals
    pub fn task(&self) -> &'a MeasureTask {
        match self {
            MeasureTaskRef::SeamSeries(series) => series.task(),
            MeasureTaskRef::Seam(seam) => seam.seam().task(),
            MeasureTaskRef::Interval(interval) => interval.seam().task(),
        }
    }
}

impl Product {
    pub fn find_seam_series(&self, number: i32) -> Option<&SeamSeries> {
        self.series.iter().find(|s| s.number() == number)
    }

    pub fn find_seam_series_by_uuid(&self, id: &Uuid) -> Option<&SeamSeries> {
        self.series.iter().find(|s| s.uuid() == *id)
    }

    pub fn find_seam_series_by_uuid_mut(&mut self, id: &Uuid) -> Option<&mut SeamSeries> {
        self.series.iter_mut().find(|s| s.uuid() == *id)
    }

    /// Plain seam by uuid in any series
    pub fn find_seam(&self, id: &Uuid) -> Option<&Seam> {
        self.series.iter().find_map(|series| series.find_seam(id))
    }

    pub fn find_seam_mut(&mut self, id: &Uuid) -> Option<&mut Seam> {
        self.series.iter_mut().find_map(|series| series.find_seam_mut(id))
    }

    /// Seam or link by series number and seam number
    pub fn find_seam_by_number(&self, series: i32, seam: i32) -> Option<SeamRef<'_>> {
        self.find_seam_series(series)?.find_seam_by_number(seam)
    }

    /// `(series number, seam number)` of a seam or link
    pub fn seam_position(&self, id: &Uuid) -> Option<(i32, i32)> {
        self.series.iter().find_map(|series| {
            series
                .find_entry(id)
                .map(|seam| (series.number(), seam.number()))
        })
    }

    /// Series, seam, link or interval by uuid
    pub fn find_measure_task(&self, id: &Uuid) -> Option<MeasureTaskRef<'_>> {
        for series in &self.series {
            if series.uuid() == *id {
                return Some(MeasureTaskRef::SeamSeries(series));
            }
            if let Some(seam) = series.find_entry(id) {
                return Some(MeasureTaskRef::Seam(seam));
            }
            for seam in series.seams() {
                if let Some(interval) = seam.interval_ref(id) {
                    return Some(MeasureTaskRef::Interval(interval));
                }
            }
        }
        None
    }

    /// Private hardware set of the product, a series or a seam
    pub fn find_hardware_parameter_set(&self, id: &Uuid) -> Option<&ParameterSet> {
        if let Some(set) = self.hardware_parameters.as_ref().filter(|set| set.uuid() == *id) {
            return Some(set);
        }
        self.series.iter().find_map(|series| {
            series
                .task()
                .find_hardware_parameter_set(id)
                .or_else(|| series.seams().find_map(|seam| seam.task().find_hardware_parameter_set(id)))
        })
    }

    /// Every series entry including links, in series order
    pub fn all_seams(&self) -> Vec<SeamRef<'_>> {
        self.series.iter().flat_map(SeamSeries::all_seams).collect()
    }

    /// Plain seams only
    pub fn all_real_seams(&self) -> Vec<&Seam> {
        self.series.iter().flat_map(SeamSeries::seams).collect()
    }

    fn series_index(&self, id: &Uuid) -> Option<usize> {
        self.series.iter().position(|s| s.uuid() == *id)
    }

    pub fn previous_seam_series(&self, id: &Uuid) -> Option<&SeamSeries> {
        let index = self.series_index(id)?;
        index.checked_sub(1).and_then(|i| self.series.get(i))
    }

    pub fn next_seam_series(&self, id: &Uuid) -> Option<&SeamSeries> {
        let index = self.series_index(id)?;
        self.series.get(index + 1)
    }

    /// Entry before `id`, crossing into the previous series
    pub fn previous_seam(&self, id: &Uuid) -> Option<SeamRef<'_>> {
        let series = self.series.iter().find(|s| s.find_entry(id).is_some())?;
        series
            .previous_seam(id)
            .or_else(|| self.previous_seam_series(&series.uuid())?.last_seam())
    }

    /// Entry after `id`, crossing into the next series
    pub fn next_seam(&self, id: &Uuid) -> Option<SeamRef<'_>> {
        let series = self.series.iter().find(|s| s.find_entry(id).is_some())?;
        series
            .next_seam(id)
            .or_else(|| self.next_seam_series(&series.uuid())?.first_seam())
    }

    /// Seam errors of every series and seam
    pub fn all_seam_errors(&self) -> Vec<&SeamError> {
        let mut errors = Vec::new();
        for series in &self.series {
            errors.extend(series.task().errors());
            for seam in series.seams() {
                errors.extend(seam.task().errors());
            }
        }
        errors
    }

    /// Reference curves of every series and seam
    pub fn all_reference_curves(&self) -> Vec<&ReferenceCurve> {
        let mut curves = Vec::new();
        for series in &self.series {
            curves.extend(series.task().reference_curves());
            for seam in series.seams() {
                curves.extend(seam.task().reference_curves());
            }
        }
        curves
    }

    pub fn all_seam_series_errors(&self) -> Vec<&SeamSeriesError> {
        self.series
            .iter()
            .flat_map(|series| series.overlying_errors())
            .collect()
    }

    pub fn all_interval_errors(&self) -> Vec<&IntervalError> {
        self.all_real_seams()
            .into_iter()
            .flat_map(|seam| seam.interval_errors())
            .collect()
    }

    /// Error instances over all seams, one per interval error and interval
    pub fn interval_error_count(&self) -> usize {
        self.series.iter().map(SeamSeries::interval_error_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        let mut product = Product::new(Uuid::new_v4());
        product.create_seam_series();
        product.create_seam_series();
        let first = product.seam_series()[0].uuid();
        let second = product.seam_series()[1].uuid();
        product.create_seam_in(&first);
        product.create_seam_in(&first);
        product.create_seam_in(&second);
        product
    }

    #[test]
    fn test_navigation_crosses_series() {
        let product = product();
        let seams: Vec<Uuid> = product.all_real_seams().iter().map(|s| s.uuid()).collect();
        assert_eq!(seams.len(), 3);

        assert!(product.previous_seam(&seams[0]).is_none());
        assert_eq!(product.next_seam(&seams[1]).unwrap().uuid(), seams[2]);
        assert_eq!(product.previous_seam(&seams[2]).unwrap().uuid(), seams[1]);
        assert!(product.next_seam(&seams[2]).is_none());

        let first = product.seam_series()[0].uuid();
        let second = product.seam_series()[1].uuid();
        assert!(product.previous_seam_series(&first).is_none());
        assert_eq!(product.next_seam_series(&first).unwrap().uuid(), second);
        assert!(product.next_seam_series(&second).is_none());
    }

    #[test]
    fn test_find_measure_task() {
        let mut product = product();
        let seam = product.all_real_seams()[0].uuid();
        let interval = product.find_seam_mut(&seam).unwrap().create_seam_interval().uuid();
        let series = product.seam_series()[1].uuid();

        assert!(matches!(product.find_measure_task(&series), Some(MeasureTaskRef::SeamSeries(_))));
        assert!(matches!(product.find_measure_task(&seam), Some(MeasureTaskRef::Seam(_))));
        let found = product.find_measure_task(&interval).unwrap();
        assert!(matches!(found, MeasureTaskRef::Interval(_)));
        assert_eq!(found.task().uuid(), seam);
        assert!(product.find_measure_task(&Uuid::new_v4()).is_none());

        let link = product.create_seam_link(&seam, "9").unwrap();
        let found = product.find_measure_task(&link).unwrap();
        assert_eq!(found.uuid(), link);
        assert_eq!(found.task().uuid(), seam);
    }

    #[test]
    fn test_find_by_number_and_position() {
        let product = product();
        let seam = product.find_seam_by_number(0, 1).unwrap();
        assert_eq!(product.seam_position(&seam.uuid()), Some((0, 1)));
        assert!(product.find_seam_by_number(2, 0).is_none());
    }

    #[test]
    fn test_find_hardware_parameter_set() {
        let mut product = product();
        let own = product.create_hardware_parameters().uuid();
        let seam = product.all_real_seams()[2].uuid();
        let seam_set = product
            .find_seam_mut(&seam)
            .unwrap()
            .task_mut()
            .create_hardware_parameters()
            .uuid();
        assert!(product.find_hardware_parameter_set(&own).is_some());
        assert!(product.find_hardware_parameter_set(&seam_set).is_some());
        assert!(product.find_hardware_parameter_set(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_error_collections() {
        let mut product = product();
        let seams: Vec<Uuid> = product.all_real_seams().iter().map(|s| s.uuid()).collect();
        for id in &seams {
            let seam = product.find_seam_mut(id).unwrap();
            seam.create_seam_interval();
            seam.create_seam_interval();
            seam.add_interval_error(Uuid::new_v4(), None);
            seam.task_mut().add_error(Uuid::new_v4(), None);
        }
        let series = product.seam_series()[0].uuid();
        product
            .find_seam_series_by_uuid_mut(&series)
            .unwrap()
            .add_overlying_error(Uuid::new_v4(), None);

        assert_eq!(product.all_interval_errors().len(), 3);
        assert_eq!(product.interval_error_count(), 6);
        assert_eq!(product.all_seam_errors().len(), 3);
        assert_eq!(product.all_seam_series_errors().len(), 1);
    }
}
