//! Background loading of discarded filter parameter sets
//!
//! The document is read on the blocking pool and every parsed set is sent
//! over a channel. Only the product owner inserts the sets, through
//! [`Product::accept_loaded_parameter_set`].

use crate::config::DEFAULT_LOADER_CHANNEL_CAPACITY;
use crate::parameter_set::ParameterSet;
use crate::product::read_filter_parameter_sets;
use crate::{Error, Product, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Spawns reads of filter parameter sets from product documents
#[derive(Debug, Clone, Copy)]
pub struct ParameterSetLoader {
    channel_capacity: usize,
}

impl Default for ParameterSetLoader {
    fn default() -> Self {
        Self::new(DEFAULT_LOADER_CHANNEL_CAPACITY)
    }
}

impl ParameterSetLoader {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Start reading `ids` from the document at `path`
    ///
    /// The handle resolves to the number of sets sent. The channel closes
    /// once every set was sent or the read failed.
    pub fn spawn(
        &self,
        path: PathBuf,
        ids: Vec<Uuid>,
    ) -> (JoinHandle<Result<usize>>, mpsc::Receiver<ParameterSet>) {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let handle = tokio::spawn(async move {
            let sets = tokio::task::spawn_blocking({
                let path = path.clone();
                move || read_filter_parameter_sets(&path, &ids)
            })
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

            debug!(path = %path.display(), count = sets.len(), "Read filter parameter sets");
            let mut sent = 0;
            for set in sets {
                if tx.send(set).await.is_err() {
                    debug!("Parameter set receiver dropped");
                    break;
                }
                sent += 1;
            }
            Ok(sent)
        });
        (handle, rx)
    }

    /// Load every discarded set of `product` from its backing document
    ///
    /// Returns the number of sets the product accepted.
    pub async fn load_discarded(&self, product: &mut Product) -> Result<usize> {
        let ids: Vec<Uuid> = product.filter_parameter_sets().discarded().copied().collect();
        if ids.is_empty() {
            return Ok(0);
        }
        let path = product
            .file_path()
            .map(PathBuf::from)
            .ok_or_else(|| Error::NotFound(format!("backing document of product {}", product.uuid())))?;

        let (handle, mut rx) = self.spawn(path, ids);
        let mut accepted = 0;
        while let Some(set) = rx.recv().await {
            if product.accept_loaded_parameter_set(set) {
                accepted += 1;
            }
        }
        handle
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;
        Ok(accepted)
    }
}
