#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use subtrack_core::{
    config::ConfigManager,
    storage::{JsonSnapshotStore, SubscriptionStore},
    SubscriptionRecord, SubscriptionState,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that survives until the test binary exits.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Isolated config manager and snapshot store rooted in a fresh directory.
pub fn setup_test_env() -> (JsonSnapshotStore, ConfigManager) {
    let base = temp_base();
    let store = JsonSnapshotStore::new(base.join("subscriptions.json"));
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    (store, config_manager)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// $10 monthly from Jan 15 and $120 yearly from Mar 1, both active.
pub fn streaming_pair() -> Vec<SubscriptionRecord> {
    vec![
        SubscriptionRecord::new(SubscriptionState::Active)
            .with_provider("Netflix")
            .with_category("Video")
            .with_funding_source("Visa")
            .with_amount(10.0)
            .with_rule("every 1 month")
            .with_start_date(date(2024, 1, 15))
            .with_auto_renewal(true),
        SubscriptionRecord::new(SubscriptionState::Active)
            .with_provider("Cloud Drive")
            .with_category("Storage")
            .with_amount(120.0)
            .with_rule("every 1 year")
            .with_start_date(date(2024, 3, 1)),
    ]
}

/// Writes `records` as a snapshot file and returns its path.
pub fn write_snapshot(records: &[SubscriptionRecord]) -> PathBuf {
    let path = temp_base().join("snapshot.json");
    JsonSnapshotStore::new(&path)
        .save(records)
        .expect("write snapshot");
    path
}
