pub mod json_backend;

use crate::{domain::SubscriptionRecord, errors::StoreError};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Source of subscription snapshots exported from the remote data store.
pub trait SubscriptionStore: Send + Sync {
    fn load(&self) -> Result<Vec<SubscriptionRecord>>;
    fn save(&self, records: &[SubscriptionRecord]) -> Result<()>;
}

pub use json_backend::JsonSnapshotStore;
