//! Node registry implementation
//!
//! The central registry that tracks every live edge node, evicts the ones
//! that stop heartbeating, and routes viewers to the least-loaded node.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::stats::{RegistryStats, StatsSnapshot};

use super::config::RegistryConfig;
use super::entry::{Node, NodeSnapshot, ServiceState};
use super::error::{RegistryError, Result};
use super::key::{IdAllocator, NodeId, StreamKey};

/// Outcome of a register or update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Id of the node that registered or reported in
    pub id: NodeId,
    /// Other nodes seen from the same observer address
    pub peers: Vec<NodeSnapshot>,
}

/// Central registry for all live edge nodes
///
/// Every operation runs under one `Mutex`: peer grouping and selection need
/// a consistent view of the whole fleet, and nothing done under the lock
/// performs I/O. Nodes are kept in registration order, which is also the
/// tie-break order for selection.
pub struct NodeRegistry {
    /// Live nodes, in registration order
    nodes: Mutex<Vec<Node>>,

    /// Source of fresh node ids
    ids: IdAllocator,

    /// Activity counters
    stats: RegistryStats,

    /// Configuration
    config: RegistryConfig,
}

impl NodeRegistry {
    /// Create a new node registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new node registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            nodes: Mutex::new(Vec::new()),
            ids: IdAllocator::new(config.id_seed),
            stats: RegistryStats::new(),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Get a snapshot of the activity counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Register a new edge node
    ///
    /// The node gets a fresh id and a zero client count. Returns the id
    /// together with the node's peers.
    pub async fn register(
        &self,
        internal_address: impl Into<String>,
        os_label: impl Into<String>,
        service_state: ServiceState,
        observer_address: impl Into<String>,
    ) -> Registration {
        let node = Node::new(
            self.ids.next(),
            internal_address.into(),
            os_label.into(),
            service_state,
            observer_address.into(),
        );
        let id = node.id().clone();

        let mut nodes = self.nodes.lock().await;

        tracing::info!(
            node = %id,
            addr = %node.internal_address,
            observer = %node.observer_address,
            os = %node.os_label,
            state = %service_state,
            "Node registered"
        );

        nodes.push(node);
        self.stats.record_registration();

        self.sweep_locked(&mut nodes);
        let peers = peers_of(&nodes, &id);

        Registration { id, peers }
    }

    /// Record a heartbeat from a registered node
    ///
    /// Refreshes the node's addresses, state and heartbeat time. A node that
    /// reports anything but `Running` loses its client count. Fails with
    /// `NotFound` if the id is unknown or the node was already swept; in
    /// that case nothing is changed.
    ///
    /// The node is looked up before this call sweeps, so a node past its
    /// deadline that no earlier call has swept yet is revived. How long a
    /// silent node survives therefore depends on whether any other call
    /// swept in between.
    pub async fn update(
        &self,
        id: &NodeId,
        internal_address: impl Into<String>,
        service_state: ServiceState,
        observer_address: impl Into<String>,
    ) -> Result<Registration> {
        let mut nodes = self.nodes.lock().await;

        let Some(node) = nodes.iter_mut().find(|n| n.id() == id) else {
            self.stats.record_heartbeat_miss();
            tracing::warn!(node = %id, "Heartbeat from unknown node");
            return Err(RegistryError::NotFound(id.clone()));
        };

        let previous = node.service_state;
        node.heartbeat(internal_address.into(), service_state, observer_address.into());
        self.stats.record_heartbeat();

        if previous != service_state {
            tracing::info!(
                node = %id,
                from = %previous,
                to = %service_state,
                clients = node.active_client_count(),
                "Node state changed"
            );
        } else {
            tracing::debug!(
                node = %id,
                observer = %node.observer_address,
                clients = node.active_client_count(),
                "Heartbeat"
            );
        }

        self.sweep_locked(&mut nodes);
        let peers = peers_of(&nodes, id);

        Ok(Registration {
            id: id.clone(),
            peers,
        })
    }

    /// Remove nodes that missed their heartbeat deadline
    ///
    /// Returns the number of nodes removed.
    pub async fn sweep(&self) -> usize {
        let mut nodes = self.nodes.lock().await;
        self.sweep_locked(&mut nodes)
    }

    /// Sweep, then list every remaining node in registration order
    pub async fn list_active(&self) -> Vec<NodeSnapshot> {
        let mut nodes = self.nodes.lock().await;
        self.sweep_locked(&mut nodes);
        nodes.iter().map(Node::snapshot).collect()
    }

    /// Look up a single node
    pub async fn get(&self, id: &NodeId) -> Option<NodeSnapshot> {
        let mut nodes = self.nodes.lock().await;
        self.sweep_locked(&mut nodes);
        nodes.iter().find(|n| n.id() == id).map(Node::snapshot)
    }

    /// Number of live nodes
    pub async fn node_count(&self) -> usize {
        let mut nodes = self.nodes.lock().await;
        self.sweep_locked(&mut nodes);
        nodes.len()
    }

    /// Pick the edge node that should serve a viewer
    ///
    /// Candidates are `Running` nodes whose observer address matches the
    /// viewer's. The one with the fewest routed clients wins, earliest
    /// registered first on ties, and its count is bumped before returning.
    /// Counts are never decremented here: the registry does not learn when
    /// a viewer leaves, so they only reset on a non-`Running` heartbeat.
    ///
    /// Returns the winner's internal address, or `None` when no node can
    /// serve the viewer and the caller should fall back to the origin.
    pub async fn select_for_playback(
        &self,
        observer_address: &str,
        stream: &StreamKey,
    ) -> Option<String> {
        let mut nodes = self.nodes.lock().await;
        self.sweep_locked(&mut nodes);

        let Some(target) = nodes
            .iter_mut()
            .filter(|n| n.can_serve(observer_address))
            .min_by_key(|n| n.active_client_count)
        else {
            self.stats.record_selection(false);
            tracing::debug!(
                observer = %observer_address,
                stream = %stream,
                "No edge node for viewer"
            );
            return None;
        };

        target.active_client_count = target.active_client_count.saturating_add(1);
        self.stats.record_selection(true);

        tracing::debug!(
            node = %target.id(),
            addr = %target.internal_address,
            observer = %observer_address,
            stream = %stream,
            clients = target.active_client_count,
            "Viewer routed to edge node"
        );

        Some(target.internal_address.clone())
    }

    /// Give back a client slot reserved by `select_for_playback`
    ///
    /// Nothing in the default flow calls this; it exists for transports that
    /// can observe viewer disconnects. The count saturates at zero. Dead
    /// nodes are swept first, so releasing on one fails with `NotFound`.
    pub async fn release(&self, id: &NodeId) -> Result<()> {
        let mut nodes = self.nodes.lock().await;
        self.sweep_locked(&mut nodes);

        let node = nodes
            .iter_mut()
            .find(|n| n.id() == id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;

        node.active_client_count = node.active_client_count.saturating_sub(1);

        tracing::debug!(
            node = %id,
            clients = node.active_client_count,
            "Client slot released"
        );

        Ok(())
    }

    /// Remove dead nodes while the lock is held
    ///
    /// `now` is taken once so every node is judged against the same instant.
    fn sweep_locked(&self, nodes: &mut Vec<Node>) -> usize {
        let now = Instant::now();
        let threshold = self.config.dead_node_threshold;
        let before = nodes.len();

        nodes.retain(|node| {
            if node.is_dead(now, threshold) {
                tracing::info!(
                    node = %node.id(),
                    addr = %node.internal_address,
                    observer = %node.observer_address,
                    "Node removed by sweep"
                );
                false
            } else {
                true
            }
        });

        let removed = before - nodes.len();
        self.stats.record_evictions(removed);
        removed
    }

    /// Spawn background sweep task
    ///
    /// Inline sweeps already bound staleness to one registry call; the task
    /// also frees dead nodes when no calls arrive. Returns a handle that can
    /// be used to abort the task.
    pub fn spawn_sweep_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        let interval = registry.config.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                registry.sweep().await;
            }
        })
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshots of the nodes sharing `id`'s observer address, excluding `id`
fn peers_of(nodes: &[Node], id: &NodeId) -> Vec<NodeSnapshot> {
    let Some(me) = nodes.iter().find(|n| n.id() == id) else {
        return Vec::new();
    };

    nodes
        .iter()
        .filter(|other| me.is_peer_of(other))
        .map(Node::snapshot)
        .collect()
}
