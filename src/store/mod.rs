//! Monitor Store
//!
//! Durable per-user persistence for monitor records. The trait is the
//! persistence-gateway contract consumed by the repository and check engine;
//! the shipped implementation is sled-backed.

pub mod persistence;

pub use persistence::SledMonitorStore;

use crate::error::StorageError;
use crate::monitor::{Monitor, MonitorId, MonitorPatch, NewMonitor};

/// Monitor store interface: full-record creates, partial-field updates.
pub trait MonitorStore: Send + Sync {
    /// Persist a new monitor, assigning its id and creation timestamp.
    fn create(&self, new: NewMonitor) -> Result<Monitor, StorageError>;

    fn get(&self, id: &MonitorId) -> Result<Option<Monitor>, StorageError>;

    /// Apply a partial update and return the resulting record.
    fn update(&self, id: &MonitorId, patch: &MonitorPatch) -> Result<Monitor, StorageError>;

    fn delete(&self, id: &MonitorId) -> Result<(), StorageError>;

    fn list_all(&self) -> Result<Vec<Monitor>, StorageError>;
}
