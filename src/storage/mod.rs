//! Storage abstractions for snapshot persistence.
//!
//! The store keeps exactly one record: the most recent fresh snapshot that
//! carried data, stamped with the time it was saved.
//!
//! ```text
//! data/
//! └── ultimo_clima.json     # last known-good snapshot + timestamp_guardado
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Overwrite the stored snapshot, returning the save timestamp.
    async fn save(&self, snapshot: &Snapshot) -> Result<DateTime<Utc>>;

    /// Load the stored snapshot; `Ok(None)` when nothing was saved yet.
    async fn load(&self) -> Result<Option<Snapshot>>;
}
