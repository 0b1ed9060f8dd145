// src/pipeline/resilience.rs

//! Last known-good fallback.
//!
//! Fresh snapshots with data overwrite the store. Empty or failed fetches
//! are answered from the store when it has something. Store failures never
//! reach the caller: a failed write is logged and skipped, a failed read
//! counts as "nothing stored".

use std::sync::Arc;

use crate::models::Snapshot;
use crate::pipeline::FetchState;
use crate::storage::SnapshotStore;

/// Wraps a snapshot store with the fallback rules.
#[derive(Clone)]
pub struct Resilience {
    store: Arc<dyn SnapshotStore>,
}

impl Resilience {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Turn a classified fetch into the snapshot handed to callers.
    pub async fn resolve(&self, state: FetchState) -> Snapshot {
        match state {
            FetchState::FreshOk(snapshot) => {
                log::info!(
                    "Weather data fetched: {} stations, extended days: {}",
                    snapshot.stations.len(),
                    snapshot.forecast.as_ref().map_or(0, |f| f.extended.len())
                );
                self.persist(&snapshot).await;
                snapshot
            }
            FetchState::FreshEmpty(snapshot) => {
                log::warn!("Fetched page had no usable data; trying last saved snapshot");
                match self.recall().await {
                    Some(cached) => {
                        log::info!("Serving last saved snapshot");
                        cached.into_cached(None)
                    }
                    None => {
                        log::warn!("No saved snapshot; returning empty result");
                        snapshot
                    }
                }
            }
            FetchState::FetchFailed(error) => {
                let message = error.to_string();
                log::error!("Fetch failed: {}", message);
                match self.recall().await {
                    Some(cached) => {
                        log::info!("Serving last saved snapshot after fetch failure");
                        cached.into_cached(Some(message))
                    }
                    None => Snapshot::failure(message),
                }
            }
        }
    }

    /// Save, logging instead of failing.
    pub async fn persist(&self, snapshot: &Snapshot) {
        if let Err(e) = self.store.save(snapshot).await {
            log::warn!("Snapshot not saved: {}", e);
        }
    }

    /// Load, treating any failure as "nothing stored".
    pub async fn recall(&self) -> Option<Snapshot> {
        match self.store.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Saved snapshot unavailable: {}", e);
                None
            }
        }
    }
}
