//! Monitor Repository
//!
//! In-memory view of the current user's monitors, kept in sync with the
//! backing store. The repository is an explicit, injected collaborator (no
//! module-level singleton); interested parties observe mutations through a
//! broadcast subscription.

use crate::error::StorageError;
use crate::monitor::{Monitor, MonitorId, MonitorPatch, NewMonitor};
use crate::store::MonitorStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Mutation notifications emitted by the repository.
#[derive(Debug, Clone)]
pub enum RepositoryEvent {
    Created(Monitor),
    Updated(Monitor),
    Deleted(MonitorId),
}

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Repository over a monitor store with an in-memory cache.
///
/// Write-through: every mutation hits the store first; the cache and event
/// stream are only updated after the store accepts the write, so a
/// persistence failure leaves the in-memory state unmodified.
pub struct MonitorRepository {
    store: Arc<dyn MonitorStore>,
    cache: RwLock<HashMap<MonitorId, Monitor>>,
    events: broadcast::Sender<RepositoryEvent>,
}

impl MonitorRepository {
    pub fn new(store: Arc<dyn MonitorStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Populate the cache from the store. Called once at startup; a failure
    /// here means no monitors are presented at all.
    pub fn load(&self) -> Result<usize, StorageError> {
        let monitors = self.store.list_all()?;
        let count = monitors.len();
        let mut cache = self.cache.write();
        cache.clear();
        for monitor in monitors {
            cache.insert(monitor.id, monitor);
        }
        debug!(count, "repository loaded from store");
        Ok(count)
    }

    /// Subscribe to mutation events.
    pub fn subscribe(&self) -> broadcast::Receiver<RepositoryEvent> {
        self.events.subscribe()
    }

    pub fn get(&self, id: &MonitorId) -> Option<Monitor> {
        self.cache.read().get(id).cloned()
    }

    /// All cached monitors, ordered by id for stable presentation.
    pub fn list(&self) -> Vec<Monitor> {
        let mut monitors: Vec<Monitor> = self.cache.read().values().cloned().collect();
        monitors.sort_by_key(|m| m.id.0);
        monitors
    }

    pub fn create(&self, new: NewMonitor) -> Result<Monitor, StorageError> {
        let monitor = self.store.create(new)?;
        self.cache.write().insert(monitor.id, monitor.clone());
        let _ = self.events.send(RepositoryEvent::Created(monitor.clone()));
        Ok(monitor)
    }

    pub fn update(&self, id: &MonitorId, patch: &MonitorPatch) -> Result<Monitor, StorageError> {
        let monitor = self.store.update(id, patch)?;
        self.cache.write().insert(monitor.id, monitor.clone());
        let _ = self.events.send(RepositoryEvent::Updated(monitor.clone()));
        Ok(monitor)
    }

    pub fn delete(&self, id: &MonitorId) -> Result<(), StorageError> {
        self.store.delete(id)?;
        self.cache.write().remove(id);
        let _ = self.events.send(RepositoryEvent::Deleted(*id));
        Ok(())
    }

    /// Refresh a single cached record from the store, e.g. after the check
    /// engine wrote through the store directly.
    pub fn refresh(&self, id: &MonitorId) -> Result<Option<Monitor>, StorageError> {
        match self.store.get(id)? {
            Some(monitor) => {
                self.cache.write().insert(monitor.id, monitor.clone());
                let _ = self.events.send(RepositoryEvent::Updated(monitor.clone()));
                Ok(Some(monitor))
            }
            None => {
                self.cache.write().remove(id);
                Ok(None)
            }
        }
    }
}
