//! Monitor Entity
//!
//! A Monitor tracks one (url, selector, name) triple plus its latest observed
//! value and tri-state status. Status transitions are applied here so they stay
//! derivable from the stored prior value and the newest observation; the stored
//! status is a display cache, not an independent source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque monitor identifier, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitorId(pub u64);

impl MonitorId {
    /// Big-endian byte representation, used as the sled key.
    pub fn as_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl std::fmt::Display for MonitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MonitorId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(MonitorId)
    }
}

/// Tri-state classification of the most recent observation relative to the
/// prior one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    /// No observation recorded yet.
    New,
    /// Latest check did not change the value (or was the first check).
    Stable,
    /// Latest check produced a value different from the preceding one.
    Changed,
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorStatus::New => write!(f, "new"),
            MonitorStatus::Stable => write!(f, "stable"),
            MonitorStatus::Changed => write!(f, "changed"),
        }
    }
}

/// Fields supplied when registering a new monitor. The store assigns the id
/// and stamps `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMonitor {
    pub url: String,
    pub selector: String,
    pub name: String,
}

/// One tracked web fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monitor {
    pub id: MonitorId,
    pub url: String,
    pub selector: String,
    pub name: String,
    /// Most recently observed value; `None` only before the first check.
    pub last_value: Option<String>,
    /// The value `last_value` replaced on the most recent check. One-slot
    /// history so change summaries can reference the real prior value.
    pub previous_value: Option<String>,
    pub last_checked: Option<DateTime<Utc>>,
    pub status: MonitorStatus,
    pub created_at: DateTime<Utc>,
}

impl Monitor {
    /// Build an unchecked monitor from registration fields.
    pub fn from_new(id: MonitorId, new: NewMonitor, created_at: DateTime<Utc>) -> Self {
        Monitor {
            id,
            url: new.url,
            selector: new.selector,
            name: new.name,
            last_value: None,
            previous_value: None,
            last_checked: None,
            status: MonitorStatus::New,
            created_at,
        }
    }

    /// Apply a fresh observation and return the resulting status.
    ///
    /// Transition rule: a first observation is recorded as `stable` (never
    /// reported as a change), a differing value is `changed`, an identical
    /// value is `stable`. `last_value` and `last_checked` are updated
    /// unconditionally, even when the status does not move.
    pub fn apply_observation(&mut self, next: String, now: DateTime<Utc>) -> MonitorStatus {
        let status = match &self.last_value {
            None => MonitorStatus::Stable,
            Some(prev) if *prev != next => MonitorStatus::Changed,
            Some(_) => MonitorStatus::Stable,
        };
        self.previous_value = self.last_value.take();
        self.last_value = Some(next);
        self.last_checked = Some(now);
        self.status = status;
        status
    }

    /// Apply a manual value override. A user-supplied correction is trusted:
    /// status resets to `stable` and the edit is never flagged as a change.
    pub fn apply_manual_value(&mut self, value: String, now: DateTime<Utc>) {
        self.previous_value = self.last_value.take();
        self.last_value = Some(value);
        self.last_checked = Some(now);
        self.status = MonitorStatus::Stable;
    }
}

/// Partial update for a monitor record. Only present fields are written;
/// `id` and `created_at` are immutable and intentionally absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorPatch {
    pub url: Option<String>,
    pub selector: Option<String>,
    pub name: Option<String>,
    pub last_value: Option<Option<String>>,
    pub previous_value: Option<Option<String>>,
    pub last_checked: Option<Option<DateTime<Utc>>>,
    pub status: Option<MonitorStatus>,
}

impl MonitorPatch {
    /// Patch carrying the outcome of one check-engine observation.
    pub fn from_observation(monitor: &Monitor) -> Self {
        MonitorPatch {
            last_value: Some(monitor.last_value.clone()),
            previous_value: Some(monitor.previous_value.clone()),
            last_checked: Some(monitor.last_checked),
            status: Some(monitor.status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.selector.is_none()
            && self.name.is_none()
            && self.last_value.is_none()
            && self.previous_value.is_none()
            && self.last_checked.is_none()
            && self.status.is_none()
    }

    /// Apply the present fields to a monitor in place.
    pub fn apply_to(&self, monitor: &mut Monitor) {
        if let Some(ref url) = self.url {
            monitor.url = url.clone();
        }
        if let Some(ref selector) = self.selector {
            monitor.selector = selector.clone();
        }
        if let Some(ref name) = self.name {
            monitor.name = name.clone();
        }
        if let Some(ref last_value) = self.last_value {
            monitor.last_value = last_value.clone();
        }
        if let Some(ref previous_value) = self.previous_value {
            monitor.previous_value = previous_value.clone();
        }
        if let Some(last_checked) = self.last_checked {
            monitor.last_checked = last_checked;
        }
        if let Some(status) = self.status {
            monitor.status = status;
        }
    }
}
