//! Persistence layer for the Monitor Store

use crate::error::StorageError;
use crate::monitor::{Monitor, MonitorId, MonitorPatch, NewMonitor};
use crate::store::MonitorStore;
use bincode;
use chrono::Utc;
use sled;
use std::path::Path;

/// Sled-based implementation of MonitorStore
///
/// Records are bincode-encoded and keyed by the big-endian monitor id;
/// ids come from sled's monotonic id generator.
pub struct SledMonitorStore {
    db: sled::Db,
}

impl SledMonitorStore {
    /// Create a new SledMonitorStore at the given path
    ///
    /// The path can be a directory (sled will create a database there) or
    /// a file path (sled will use it as the database file).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open sled database: {}", e),
            ))
        })?;
        Ok(Self { db })
    }

    /// Wrap an already opened sled database.
    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }

    /// Check if a monitor exists in the store
    pub fn contains(&self, id: &MonitorId) -> Result<bool, StorageError> {
        self.db.contains_key(id.as_bytes()).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to check monitor existence: {}", e),
            ))
        })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to flush database: {}", e),
            ))
        })?;
        Ok(())
    }

    fn put(&self, monitor: &Monitor) -> Result<(), StorageError> {
        let value = bincode::serialize(monitor).map_err(|e| {
            StorageError::InvalidRecord(format!("Failed to serialize monitor: {}", e))
        })?;
        self.db
            .insert(monitor.id.as_bytes(), value)
            .map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to put monitor record: {}", e),
                ))
            })?;
        Ok(())
    }
}

impl MonitorStore for SledMonitorStore {
    fn create(&self, new: NewMonitor) -> Result<Monitor, StorageError> {
        let id = MonitorId(self.db.generate_id().map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to generate monitor id: {}", e),
            ))
        })?);
        let monitor = Monitor::from_new(id, new, Utc::now());
        self.put(&monitor)?;
        Ok(monitor)
    }

    fn get(&self, id: &MonitorId) -> Result<Option<Monitor>, StorageError> {
        match self.db.get(id.as_bytes()).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to get monitor record: {}", e),
            ))
        })? {
            Some(value) => {
                let monitor: Monitor = bincode::deserialize(&value).map_err(|e| {
                    StorageError::InvalidRecord(format!("Failed to deserialize monitor: {}", e))
                })?;
                Ok(Some(monitor))
            }
            None => Ok(None),
        }
    }

    fn update(&self, id: &MonitorId, patch: &MonitorPatch) -> Result<Monitor, StorageError> {
        let mut monitor = self
            .get(id)?
            .ok_or_else(|| StorageError::MonitorNotFound(*id))?;
        patch.apply_to(&mut monitor);
        self.put(&monitor)?;
        Ok(monitor)
    }

    fn delete(&self, id: &MonitorId) -> Result<(), StorageError> {
        let removed = self.db.remove(id.as_bytes()).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to delete monitor record: {}", e),
            ))
        })?;
        if removed.is_none() {
            return Err(StorageError::MonitorNotFound(*id));
        }
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Monitor>, StorageError> {
        let mut monitors = Vec::new();
        for item in self.db.iter() {
            let (_, value) = item.map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to iterate store: {}", e),
                ))
            })?;
            let monitor: Monitor = bincode::deserialize(&value).map_err(|e| {
                StorageError::InvalidRecord(format!("Failed to deserialize monitor: {}", e))
            })?;
            monitors.push(monitor);
        }
        monitors.sort_by_key(|m| m.id.0);
        Ok(monitors)
    }
}
