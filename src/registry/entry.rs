//! Node entry and state types
//!
//! This module defines the per-node record stored in the registry.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::key::NodeId;

/// Service state reported by an edge node on every heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// Node did not report a recognizable state
    #[default]
    Unknown,
    /// Edge server is up and accepting viewers
    Running,
    /// Edge server is stopped, restarting, or failed
    NotRunning,
}

impl ServiceState {
    /// Wire label of this state
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceState::Unknown => "unknown",
            ServiceState::Running => "running",
            ServiceState::NotRunning => "not_running",
        }
    }

    /// Whether viewers may be routed to a node in this state
    pub fn is_running(&self) -> bool {
        matches!(self, ServiceState::Running)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ServiceState {
    type Err = std::convert::Infallible;

    /// Unrecognized labels map to `Unknown` rather than failing; the node
    /// stays registered but is never selected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let state = match s.trim().to_ascii_lowercase().as_str() {
            "running" => ServiceState::Running,
            "not_running" | "notrunning" | "stopped" => ServiceState::NotRunning,
            _ => ServiceState::Unknown,
        };
        Ok(state)
    }
}

/// Entry for a single edge node in the registry
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,

    /// Address the node reports for itself
    pub internal_address: String,

    /// Informational OS label
    pub os_label: String,

    /// Last reported service state
    pub service_state: ServiceState,

    /// Transport-level source address of the last register/update
    pub observer_address: String,

    /// Monotonic time of the last register/update, used for liveness
    pub(super) last_heartbeat: Instant,

    /// Wall-clock time of the last register/update, for listings
    pub(super) last_heartbeat_wall: SystemTime,

    /// Viewers optimistically routed to this node
    pub(super) active_client_count: u64,
}

impl Node {
    /// Create a new node with a fresh heartbeat and no clients
    pub(super) fn new(
        id: NodeId,
        internal_address: String,
        os_label: String,
        service_state: ServiceState,
        observer_address: String,
    ) -> Self {
        Self {
            id,
            internal_address,
            os_label,
            service_state,
            observer_address,
            last_heartbeat: Instant::now(),
            last_heartbeat_wall: SystemTime::now(),
            active_client_count: 0,
        }
    }

    /// Registry-assigned identifier
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Number of viewers routed here since the node last stopped running
    pub fn active_client_count(&self) -> u64 {
        self.active_client_count
    }

    /// Monotonic time of the last heartbeat
    pub fn last_heartbeat(&self) -> Instant {
        self.last_heartbeat
    }

    /// Check whether the node missed its heartbeat deadline
    ///
    /// A node is dead once strictly more than `threshold` has elapsed since
    /// its last heartbeat.
    pub fn is_dead(&self, now: Instant, threshold: Duration) -> bool {
        now.saturating_duration_since(self.last_heartbeat) > threshold
    }

    /// Refresh the node from a heartbeat
    ///
    /// A heartbeat that reports anything other than `Running` drops the
    /// accumulated client count: the edge server restarted or failed, so
    /// its viewers are gone.
    pub(super) fn heartbeat(
        &mut self,
        internal_address: String,
        service_state: ServiceState,
        observer_address: String,
    ) {
        self.internal_address = internal_address;
        self.service_state = service_state;
        self.observer_address = observer_address;
        self.last_heartbeat = Instant::now();
        self.last_heartbeat_wall = SystemTime::now();

        if !service_state.is_running() {
            self.active_client_count = 0;
        }
    }

    /// Whether `other` is a peer of this node (same vantage point, not itself)
    pub(super) fn is_peer_of(&self, other: &Node) -> bool {
        self.id != other.id && self.observer_address == other.observer_address
    }

    /// Whether this node can serve a viewer seen from `observer_address`
    pub(super) fn can_serve(&self, observer_address: &str) -> bool {
        self.service_state.is_running() && self.observer_address == observer_address
    }

    /// Take an immutable copy of the node for callers outside the lock
    pub fn snapshot(&self) -> NodeSnapshot {
        let last_heartbeat_at = self
            .last_heartbeat_wall
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        NodeSnapshot {
            id: self.id.clone(),
            internal_address: self.internal_address.clone(),
            os_label: self.os_label.clone(),
            service_state: self.service_state,
            observer_address: self.observer_address.clone(),
            last_heartbeat_at,
            active_client_count: self.active_client_count,
        }
    }
}

/// Point-in-time view of a node, as handed to the transport layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Registry-assigned identifier
    pub id: NodeId,
    /// Address the node reports for itself
    pub internal_address: String,
    /// Informational OS label
    pub os_label: String,
    /// Last reported service state
    pub service_state: ServiceState,
    /// Source address of the last register/update
    pub observer_address: String,
    /// Last heartbeat, unix milliseconds
    pub last_heartbeat_at: u64,
    /// Viewers routed to this node
    pub active_client_count: u64,
}
