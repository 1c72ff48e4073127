//! Tests for structural change notifications emitted by a product

use tempfile::TempDir;
use tokio::sync::broadcast::error::TryRecvError;
use uuid::Uuid;
use wm_storage::{CopyMode, EventBus, Product, StorageEvent};

fn drain(rx: &mut tokio::sync::broadcast::Receiver<StorageEvent>) -> Vec<StorageEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
    events
}

#[tokio::test]
async fn test_structural_edits_notify() {
    let bus = EventBus::new(64);
    let mut rx = bus.subscribe();
    let mut product = Product::new(Uuid::new_v4());
    product.set_event_bus(Some(bus));

    let series = product.create_first_seam_series().unwrap();
    assert!(matches!(rx.recv().await.unwrap(), StorageEvent::SeamSeriesChanged { .. }));

    let seam = product.create_seam_in(&series).unwrap();
    let events = drain(&mut rx);
    assert!(matches!(events[0], StorageEvent::FilterParameterSetsChanged { .. }));
    assert!(matches!(events[1], StorageEvent::SeamsChanged { .. }));

    product.create_seam_link(&seam, "4").unwrap();
    let events = drain(&mut rx);
    assert!(matches!(&events[0], StorageEvent::LinkedSeamsChanged { seam: id, .. } if *id == seam));
    assert!(matches!(events[1], StorageEvent::SeamsChanged { .. }));
}

#[tokio::test]
async fn test_cascading_destroy_emits_single_seams_event() {
    let mut product = Product::new(Uuid::new_v4());
    let series = product.create_first_seam_series().unwrap();
    let seam = product.create_seam_in(&series).unwrap();
    product.create_seam_link(&seam, "3").unwrap();
    product.create_seam_link(&seam, "5").unwrap();

    let bus = EventBus::default();
    let mut rx = bus.subscribe();
    product.set_event_bus(Some(bus));
    assert!(product.destroy_seam(&seam));

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], StorageEvent::SeamsChanged { .. }));
    assert!(product.seam_series()[0].is_empty());
}

#[tokio::test]
async fn test_duplicate_shares_bus_and_save_notifies() {
    let bus = EventBus::new(16);
    let mut rx = bus.subscribe();
    let mut product = Product::new(Uuid::new_v4());
    product.set_event_bus(Some(bus.clone()));
    let copy = product.duplicate(CopyMode::WithDifferentIds);
    assert!(copy.event_bus().is_some());
    drain(&mut rx);

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("copy.json");
    copy.save(&path).unwrap();
    match rx.recv().await.unwrap() {
        StorageEvent::ProductSaved { product, path: saved, .. } => {
            assert_eq!(product, copy.uuid());
            assert_eq!(saved, path);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(bus.subscriber_count(), 1);
}

#[tokio::test]
async fn test_interval_edits_notify() {
    let mut product = Product::new(Uuid::new_v4());
    let series = product.create_first_seam_series().unwrap();
    let seam = product.create_seam_in(&series).unwrap();

    let bus = EventBus::new(16);
    let mut rx = bus.subscribe();
    product.set_event_bus(Some(bus));

    let first = product.create_first_seam_interval(&seam).unwrap();
    let second = product.create_seam_interval(&seam).unwrap();
    assert!(product.destroy_seam_interval(&seam, &first));
    let events = drain(&mut rx);
    assert_eq!(events.len(), 3);
    assert!(events
        .iter()
        .all(|e| matches!(e, StorageEvent::SeamIntervalsChanged { seam: id, .. } if *id == seam)));

    assert!(!product.destroy_seam_interval(&seam, &first));
    assert!(product.create_first_seam_interval(&seam).is_none());
    assert!(drain(&mut rx).is_empty());
    assert_eq!(product.find_seam(&seam).unwrap().intervals()[0].uuid(), second);
}
