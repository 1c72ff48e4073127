//! Structural change notifications
//!
//! A [`Product`](crate::Product) can carry an [`EventBus`]. Structural
//! mutators emit lossy notifications so views can refresh without polling;
//! a cascading destruction emits a single event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default broadcast capacity
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StorageEvent {
    /// Seams or links were added to or removed from any series
    SeamsChanged {
        product: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A seam series was added or removed
    SeamSeriesChanged {
        product: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Links of one seam changed
    LinkedSeamsChanged {
        seam: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Intervals of one seam changed
    SeamIntervalsChanged {
        seam: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// The filter parameter set pool changed
    FilterParameterSetsChanged {
        product: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// The product document was written
    ProductSaved {
        product: Uuid,
        path: PathBuf,
        timestamp: DateTime<Utc>,
    },
}

impl StorageEvent {
    pub fn seams_changed(product: Uuid) -> Self {
        StorageEvent::SeamsChanged {
            product,
            timestamp: Utc::now(),
        }
    }

    pub fn seam_series_changed(product: Uuid) -> Self {
        StorageEvent::SeamSeriesChanged {
            product,
            timestamp: Utc::now(),
        }
    }

    pub fn linked_seams_changed(seam: Uuid) -> Self {
        StorageEvent::LinkedSeamsChanged {
            seam,
            timestamp: Utc::now(),
        }
    }

    pub fn seam_intervals_changed(seam: Uuid) -> Self {
        StorageEvent::SeamIntervalsChanged {
            seam,
            timestamp: Utc::now(),
        }
    }

    pub fn filter_parameter_sets_changed(product: Uuid) -> Self {
        StorageEvent::FilterParameterSetsChanged {
            product,
            timestamp: Utc::now(),
        }
    }

    pub fn product_saved(product: Uuid, path: PathBuf) -> Self {
        StorageEvent::ProductSaved {
            product,
            path,
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast channel for [`StorageEvent`]s
///
/// Cloning shares the channel. Events emitted before a receiver subscribes
/// are not delivered to it.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StorageEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus {
    /// `capacity` events are buffered before the oldest are dropped
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of receivers, or the event back if there are none
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: StorageEvent,
    ) -> Result<usize, broadcast::error::SendError<StorageEvent>> {
        self.tx.send(event)
    }

    /// Emit, ignoring a missing audience
    pub fn emit_lossy(&self, event: StorageEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
