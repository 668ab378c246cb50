use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::write_atomic,
    domain::{Identifiable, SubscriptionRecord},
    errors::StoreError,
};

use super::{Result, SubscriptionStore};

/// Subscription rows kept as a pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubscriptionStore for JsonSnapshotStore {
    fn load(&self) -> Result<Vec<SubscriptionRecord>> {
        load_records_from_path(&self.path)
    }

    fn save(&self, records: &[SubscriptionRecord]) -> Result<()> {
        save_records_to_path(records, &self.path)
    }
}

/// Reads a snapshot, rejecting files that list the same subscription twice.
pub fn load_records_from_path(path: &Path) -> Result<Vec<SubscriptionRecord>> {
    let data = fs::read_to_string(path)?;
    let records: Vec<SubscriptionRecord> = serde_json::from_str(&data)?;
    let mut seen = HashSet::new();
    if let Some(duplicate) = records.iter().find(|record| !seen.insert(record.id())) {
        return Err(StoreError::InvalidRef(format!(
            "subscription {} appears more than once in {}",
            duplicate.id(),
            path.display()
        )));
    }
    tracing::debug!(path = %path.display(), count = records.len(), "loaded subscription snapshot");
    Ok(records)
}

pub fn save_records_to_path(records: &[SubscriptionRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    write_atomic(path, &json)
}
