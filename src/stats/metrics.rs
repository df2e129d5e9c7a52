//! Statistics for registry activity
//!
//! Counters live outside the registry lock and are updated with relaxed
//! atomics; a snapshot is not a consistent cut across counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Registry-wide activity counters
#[derive(Debug, Default)]
pub struct RegistryStats {
    registrations: AtomicU64,
    heartbeats: AtomicU64,
    heartbeat_misses: AtomicU64,
    evictions: AtomicU64,
    selections: AtomicU64,
    selection_misses: AtomicU64,
}

impl RegistryStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_heartbeat(&self) {
        self.heartbeats.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_heartbeat_miss(&self) {
        self.heartbeat_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evictions(&self, count: usize) {
        if count > 0 {
            self.evictions.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_selection(&self, hit: bool) {
        if hit {
            self.selections.fetch_add(1, Ordering::Relaxed);
        } else {
            self.selection_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            registrations: self.registrations.load(Ordering::Relaxed),
            heartbeats: self.heartbeats.load(Ordering::Relaxed),
            heartbeat_misses: self.heartbeat_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            selections: self.selections.load(Ordering::Relaxed),
            selection_misses: self.selection_misses.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`RegistryStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatsSnapshot {
    /// Nodes registered
    pub registrations: u64,
    /// Successful heartbeat updates
    pub heartbeats: u64,
    /// Heartbeats for unknown ids
    pub heartbeat_misses: u64,
    /// Nodes removed by sweeps
    pub evictions: u64,
    /// Playback requests routed to an edge node
    pub selections: u64,
    /// Playback requests with no eligible edge node
    pub selection_misses: u64,
}
