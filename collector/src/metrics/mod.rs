pub mod coordinate;
pub mod entity;
pub mod record;
pub mod shared;
pub mod snapshot;
pub mod stats;

// Re-export the main types for easy access
use chrono::{
    DateTime,
    Utc,
};
pub use coordinate::*;
pub use entity::*;
pub use record::*;
use serde::{
    Deserialize,
    Serialize,
};
pub use shared::*;
pub use snapshot::*;

/// Result of one collection cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectedData {
    pub entities: Vec<EntityData>,
    pub collection_start: DateTime<Utc>,
    pub collection_end: DateTime<Utc>,
}

impl CollectedData {
    pub fn new(collection_start: DateTime<Utc>) -> Self {
        Self {
            entities: Vec::new(),
            collection_start,
            collection_end: collection_start,
        }
    }

    /// Merges `data` into the entry for the same entity, or appends it.
    pub fn push(&mut self, data: EntityData) {
        match self.entities.iter_mut().find(|existing| existing.entity == data.entity) {
            Some(existing) => {
                existing.metrics.extend(data.metrics);
                existing.inventory.extend(data.inventory);
            }
            None => self.entities.push(data),
        }
    }

    pub fn finalize(&mut self) {
        self.collection_end = Utc::now();
    }
}
