//! Integration tests for product structure, duplication and references

use std::collections::HashSet;
use uuid::Uuid;
use wm_storage::{CopyMode, Product, SeamEntry, SeamRef};

/// One series with two seams and a link on the first seam under label "5"
fn linked_product() -> (Product, Uuid, Uuid) {
    let mut product = Product::new(Uuid::new_v4());
    product.set_name("Door frame");
    let series = product.create_first_seam_series().unwrap();
    let first = product.create_seam_in(&series).unwrap();
    product.create_seam_in(&series).unwrap();
    let link = product.create_seam_link(&first, "5").unwrap();
    (product, first, link)
}

fn all_uuids(product: &Product) -> HashSet<Uuid> {
    let mut ids = HashSet::new();
    ids.insert(product.uuid());
    for series in product.seam_series() {
        ids.insert(series.uuid());
        for seam in series.all_seams() {
            ids.insert(seam.uuid());
        }
        for seam in series.seams() {
            ids.extend(seam.intervals().iter().map(|i| i.uuid()));
        }
    }
    ids.extend(product.filter_parameter_sets().iter().map(|s| s.uuid()));
    ids
}

#[test]
fn test_seam_numbering() {
    let mut product = Product::new(Uuid::new_v4());
    let series = product.create_first_seam_series().unwrap();
    let seams: Vec<Uuid> = (0..4).map(|_| product.create_seam_in(&series).unwrap()).collect();
    let numbers: Vec<(i32, i32)> = product
        .all_real_seams()
        .iter()
        .map(|s| (s.number(), s.visual_number()))
        .collect();
    assert_eq!(numbers, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);

    let copy = product.create_seam_copy(CopyMode::WithDifferentIds, &series, &seams[0]).unwrap();
    let copy = product.find_seam(&copy).unwrap();
    assert_eq!(copy.number(), 4);
    assert_eq!(copy.visual_number(), 5);
    assert_ne!(copy.task().graph_param_set(), product.find_seam(&seams[0]).unwrap().task().graph_param_set());
    assert_eq!(product.filter_parameter_sets().len(), 5);
}

#[test]
fn test_link_uniqueness() {
    let (mut product, first, _) = linked_product();
    let series = product.seam_series()[0].uuid();
    assert!(product.create_seam_link(&first, "3").is_some());
    assert!(product.create_seam_link(&first, "3").is_none());
    assert!(product.create_seam_link(&first, "1").is_none());
    assert!(product.create_seam_link(&first, "abc").is_none());
    assert!(product.create_seam_link(&Uuid::new_v4(), "7").is_none());
    assert_eq!(product.find_seam_series_by_uuid(&series).unwrap().entries().len(), 4);
}

#[test]
fn test_link_resolves_to_target() {
    let (product, first, link) = linked_product();
    let found = product.find_seam_by_number(0, 5).unwrap();
    assert!(found.is_link());
    assert_eq!(found.uuid(), link);
    assert_eq!(found.seam().uuid(), first);
    assert_eq!(found.name(), product.find_seam(&first).unwrap().name());
    assert!(product.find_seam(&link).is_none());
}

#[test]
fn test_duplicate_identical_keeps_links() {
    let (product, first, link) = linked_product();
    let copy = product.duplicate(CopyMode::Identical);

    assert_eq!(copy.uuid(), product.uuid());
    assert_eq!(all_uuids(&copy), all_uuids(&product));
    let entries = copy.seam_series()[0].entries();
    assert_eq!(entries.len(), 3);
    assert!(matches!(&entries[2], SeamEntry::Link { uuid, target } if *uuid == link && *target == first));
    assert_eq!(copy.find_seam_by_number(0, 5).map(|s| s.uuid()), Some(link));
    assert_eq!(copy.to_json(), product.to_json());
}

#[test]
fn test_duplicate_with_different_ids_drops_links() {
    let (product, _, _) = linked_product();
    let copy = product.duplicate(CopyMode::WithDifferentIds);

    assert!(all_uuids(&copy).is_disjoint(&all_uuids(&product)));
    assert_eq!(copy.name(), product.name());
    let series = &copy.seam_series()[0];
    assert_eq!(series.entries().len(), 2);
    assert!(series.all_linked_seams().is_empty());
    assert_eq!(copy.filter_parameter_sets().len(), product.filter_parameter_sets().len());
    for seam in series.seams() {
        assert_eq!(seam.series(), series.uuid());
        assert!(copy.filter_parameter_set(&seam.task().graph_param_set()).is_some());
    }
}

#[test]
fn test_duplicate_rewrites_linked_graphs() {
    let (mut product, first, _) = linked_product();
    let second = product.seam_series()[0].seams().nth(1).unwrap().uuid();
    product.find_seam_mut(&second).unwrap().task_mut().set_linked_graph(first);

    let copy = product.duplicate(CopyMode::WithDifferentIds);
    let copied_first = copy.find_seam_by_number(0, 0).unwrap().uuid();
    let copied_second = copy.find_seam_by_number(0, 1).unwrap();
    assert_ne!(copied_first, first);
    assert_eq!(copied_second.seam().task().linked_graph_seam(), Some(copied_first));
    assert_eq!(
        copy.effective_graph_param_set(copied_second.seam().task()),
        copy.find_seam(&copied_first).unwrap().task().graph_param_set()
    );
}

#[test]
fn test_copy_seam_between_products() {
    let (source, first, _) = linked_product();
    let mut target = Product::new(Uuid::new_v4());
    let series = target.create_first_seam_series().unwrap();

    let copied = target
        .copy_seam_from(CopyMode::Identical, &series, &source, &first)
        .unwrap();
    assert_eq!(copied, first);
    assert_eq!(target.filter_parameter_sets().len(), 1);
    let seam = target.find_seam(&copied).unwrap();
    assert_eq!(seam.links().len(), 1);
    assert_eq!(seam.links()[0].target(), copied);
    assert_eq!(target.seam_series()[0].entries().len(), 1);

    let fresh = target
        .copy_seam_from(CopyMode::WithDifferentIds, &series, &source, &first)
        .unwrap();
    assert_ne!(fresh, first);
    assert!(target.find_seam(&fresh).unwrap().links().is_empty());
    assert_eq!(target.filter_parameter_sets().len(), 2);
}

#[test]
fn test_interval_error_map_follows_intervals() {
    let mut product = Product::new(Uuid::new_v4());
    let series = product.create_first_seam_series().unwrap();
    let seam_id = product.create_seam_in(&series).unwrap();
    product.create_first_seam_interval(&seam_id).unwrap();
    assert!(product.create_first_seam_interval(&seam_id).is_none());
    product.find_seam_mut(&seam_id).unwrap().add_interval_error(Uuid::new_v4(), None);
    let error_ids = |product: &Product| {
        product.find_seam(&seam_id).unwrap().interval_errors()[0].error_ids().len()
    };
    assert_eq!(error_ids(&product), 1);

    let second = product.create_seam_interval(&seam_id).unwrap();
    assert_eq!(error_ids(&product), 2);
    assert!(product.destroy_seam_interval(&seam_id, &second));
    assert!(!product.destroy_seam_interval(&seam_id, &second));
    assert_eq!(error_ids(&product), 1);
    assert!(product.create_seam_interval(&Uuid::new_v4()).is_none());

    let copy = product.create_seam_copy(CopyMode::WithDifferentIds, &series, &seam_id).unwrap();
    let copy = product.find_seam(&copy).unwrap();
    let interval = copy.intervals()[0].uuid();
    let error = &copy.interval_errors()[0];
    assert_eq!(error.error_ids().len(), 1);
    assert!(error.error_id(&interval).is_some());
}

#[test]
fn test_destroy_series_and_seams() {
    let (mut product, first, link) = linked_product();
    assert!(product.destroy_seam(&link));
    assert!(product.find_seam(&first).unwrap().links().is_empty());
    assert_eq!(product.seam_series()[0].entries().len(), 2);

    let series = product.seam_series()[0].uuid();
    let copy = product.create_seam_series_copy(CopyMode::WithDifferentIds, &series).unwrap();
    assert_eq!(product.find_seam_series_by_uuid(&copy).unwrap().number(), 1);
    assert!(product.destroy_seam_series(&series));
    assert!(!product.destroy_seam_series(&series));
    assert_eq!(product.seam_series().len(), 1);
    assert!(product.create_seam_series_copy(CopyMode::Identical, &series).is_none());
}

#[test]
fn test_all_seams_includes_links() {
    let (product, _, link) = linked_product();
    let all: Vec<SeamRef<'_>> = product.all_seams();
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|s| s.uuid() == link && s.is_link()));
    assert_eq!(product.all_real_seams().len(), 2);
}

#[test]
fn test_duplicate_with_different_ids_moves_envelopes() {
    let (mut product, first, _) = linked_product();
    let seam = product.find_seam_mut(&first).unwrap();
    let curve = seam.task_mut().create_reference_curve(604).uuid();
    seam.task_mut().add_error(Uuid::new_v4(), None).set_envelope(curve);

    let copy = product.duplicate(CopyMode::WithDifferentIds);
    let copied = &copy.all_real_seams()[0];
    let envelope = copied.task().errors()[0].envelope();
    assert_ne!(envelope, curve);
    assert_eq!(copied.task().reference_curves()[0].uuid(), envelope);
    assert!(copy.all_reference_curves().iter().all(|c| c.uuid() != curve));

    let identical = product.duplicate(CopyMode::Identical);
    assert_eq!(identical.all_real_seams()[0].task().errors()[0].envelope(), curve);
}
