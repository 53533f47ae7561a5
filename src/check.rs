//! Check Engine
//!
//! Produces the next observed value for a monitor and applies the status
//! transition. The value source sits behind the `ObservationSource` trait so
//! the shipped simulated source and a real fetch-and-extract implementation
//! are interchangeable; real scraping lives behind a server-side proxy and is
//! out of scope here.

use crate::error::{ApiError, StorageError};
use crate::monitor::{Monitor, MonitorId, MonitorPatch};
use crate::store::MonitorStore;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error};

/// Source of observed values for a (url, selector) pair.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    async fn observe(&self, url: &str, selector: &str) -> Result<String, ApiError>;
}

/// Simulated observation source: draws uniformly at random from a fixed
/// candidate list of plausible textual values. Stands in for a real
/// fetch-and-extract step.
pub struct SimulatedSource {
    candidates: Vec<String>,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::with_candidates(
            [
                "$49.99",
                "$42.50",
                "$39.99",
                "In Stock",
                "Out of Stock",
                "Only 3 left",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        )
    }

    /// Build a source over a custom candidate list. A single-element list
    /// makes the source deterministic, which is what the tests use.
    pub fn with_candidates(candidates: Vec<String>) -> Self {
        Self { candidates }
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObservationSource for SimulatedSource {
    async fn observe(&self, url: &str, selector: &str) -> Result<String, ApiError> {
        let value = self
            .candidates
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| {
                ApiError::ObservationFailed("simulated source has no candidates".to_string())
            })?;
        debug!(url, selector, value = %value, "simulated observation");
        Ok(value)
    }
}

/// Removes the monitor id from the in-flight set when the check completes.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<MonitorId>>>,
    id: MonitorId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.id);
    }
}

/// Check engine: one observation, one transition, one store write.
pub struct CheckEngine {
    source: Arc<dyn ObservationSource>,
    store: Arc<dyn MonitorStore>,
    in_flight: Arc<Mutex<HashSet<MonitorId>>>,
}

impl CheckEngine {
    pub fn new(source: Arc<dyn ObservationSource>, store: Arc<dyn MonitorStore>) -> Self {
        Self {
            source,
            store,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Run one check for the monitor: observe, apply the transition rule,
    /// and persist the updated fields. Returns the updated record.
    ///
    /// Overlapping checks for the same id are rejected with
    /// `ApiError::CheckInProgress` rather than letting the later write win.
    /// Persistence failures are logged and propagated without retry.
    pub async fn check(&self, monitor: &Monitor) -> Result<Monitor, ApiError> {
        let _guard = self.begin(monitor.id)?;

        let next = self
            .source
            .observe(&monitor.url, &monitor.selector)
            .await?;

        let mut updated = monitor.clone();
        let status = updated.apply_observation(next, Utc::now());
        debug!(id = %updated.id, status = %status, "observation applied");

        let patch = MonitorPatch::from_observation(&updated);
        self.store.update(&updated.id, &patch).map_err(|e| {
            error!(id = %updated.id, "failed to persist check result: {}", e);
            ApiError::StorageError(e)
        })?;

        Ok(updated)
    }

    /// Load the monitor by id and check it.
    pub async fn check_by_id(&self, id: &MonitorId) -> Result<Monitor, ApiError> {
        let monitor = self
            .store
            .get(id)
            .map_err(ApiError::StorageError)?
            .ok_or(ApiError::MonitorNotFound(*id))?;
        self.check(&monitor).await
    }

    fn begin(&self, id: MonitorId) -> Result<InFlightGuard, ApiError> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(id) {
            return Err(ApiError::CheckInProgress(id));
        }
        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            id,
        })
    }
}
