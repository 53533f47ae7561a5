//! Integration tests for the check engine against a real sled store

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use tempfile::TempDir;
use vigil::check::{CheckEngine, ObservationSource, SimulatedSource};
use vigil::error::ApiError;
use vigil::monitor::{MonitorStatus, NewMonitor};
use vigil::store::{MonitorStore, SledMonitorStore};

/// Replays a fixed sequence of observed values.
struct SequenceSource {
    values: Mutex<Vec<String>>,
}

impl SequenceSource {
    fn new(values: &[&str]) -> Self {
        let mut values: Vec<String> = values.iter().map(|s| s.to_string()).collect();
        values.reverse();
        Self {
            values: Mutex::new(values),
        }
    }
}

#[async_trait]
impl ObservationSource for SequenceSource {
    async fn observe(&self, _url: &str, _selector: &str) -> Result<String, ApiError> {
        self.values
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ApiError::ObservationFailed("sequence exhausted".to_string()))
    }
}

fn widget() -> NewMonitor {
    NewMonitor {
        url: "https://example.com/p".to_string(),
        selector: ".price".to_string(),
        name: "Widget Price".to_string(),
    }
}

#[tokio::test]
async fn test_full_check_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SledMonitorStore::new(temp_dir.path()).unwrap());
    let source = Arc::new(SequenceSource::new(&["$49.99", "$39.99", "$39.99"]));
    let engine = CheckEngine::new(source, Arc::clone(&store) as Arc<dyn MonitorStore>);

    // freshly created monitor
    let monitor = store.create(widget()).unwrap();
    assert_eq!(monitor.status, MonitorStatus::New);
    assert!(monitor.last_value.is_none());

    // first check is stable regardless of the observed value
    let first = engine.check_by_id(&monitor.id).await.unwrap();
    assert_eq!(first.status, MonitorStatus::Stable);
    assert_eq!(first.last_value.as_deref(), Some("$49.99"));

    // differing value flags changed
    let second = engine.check_by_id(&monitor.id).await.unwrap();
    assert_eq!(second.status, MonitorStatus::Changed);
    assert_eq!(second.last_value.as_deref(), Some("$39.99"));
    assert_eq!(second.previous_value.as_deref(), Some("$49.99"));

    // same value settles back to stable
    let third = engine.check_by_id(&monitor.id).await.unwrap();
    assert_eq!(third.status, MonitorStatus::Stable);
    assert_eq!(third.last_value.as_deref(), Some("$39.99"));

    // every check persisted its outcome
    let stored = store.get(&monitor.id).unwrap().unwrap();
    assert_eq!(stored.status, MonitorStatus::Stable);
    assert_eq!(stored.last_value.as_deref(), Some("$39.99"));
    assert!(stored.last_checked.is_some());
}

#[tokio::test]
async fn test_timestamps_are_monotonic_across_checks() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SledMonitorStore::new(temp_dir.path()).unwrap());
    let source = Arc::new(SequenceSource::new(&["A", "A", "A"]));
    let engine = CheckEngine::new(source, Arc::clone(&store) as Arc<dyn MonitorStore>);

    let monitor = store.create(widget()).unwrap();
    let mut previous = None;
    for _ in 0..3 {
        let updated = engine.check_by_id(&monitor.id).await.unwrap();
        let checked = updated.last_checked.unwrap();
        if let Some(prev) = previous {
            assert!(checked >= prev);
        }
        previous = Some(checked);
    }
}

#[tokio::test]
async fn test_deterministic_simulated_source_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SledMonitorStore::new(temp_dir.path()).unwrap());
    let source = Arc::new(SimulatedSource::with_candidates(vec!["$9.99".to_string()]));
    let engine = CheckEngine::new(source, Arc::clone(&store) as Arc<dyn MonitorStore>);

    let monitor = store.create(widget()).unwrap();
    let first = engine.check_by_id(&monitor.id).await.unwrap();
    assert_eq!(first.last_value.as_deref(), Some("$9.99"));
    let second = engine.check_by_id(&monitor.id).await.unwrap();
    assert_eq!(second.status, MonitorStatus::Stable);
}

#[tokio::test]
async fn test_failed_observation_does_not_corrupt_record() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SledMonitorStore::new(temp_dir.path()).unwrap());
    let source = Arc::new(SequenceSource::new(&["$49.99"]));
    let engine = CheckEngine::new(source, Arc::clone(&store) as Arc<dyn MonitorStore>);

    let monitor = store.create(widget()).unwrap();
    engine.check_by_id(&monitor.id).await.unwrap();

    // sequence exhausted: observation fails, stored state stays intact
    let result = engine.check_by_id(&monitor.id).await;
    assert!(matches!(result, Err(ApiError::ObservationFailed(_))));

    let stored = store.get(&monitor.id).unwrap().unwrap();
    assert_eq!(stored.last_value.as_deref(), Some("$49.99"));
    assert_eq!(stored.status, MonitorStatus::Stable);
}
