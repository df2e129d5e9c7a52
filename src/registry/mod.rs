//! Edge node registry
//!
//! The registry tracks edge delivery nodes, evicts the ones that stop
//! heartbeating, and picks the least-loaded node for each viewer.
//!
//! # Architecture
//!
//! ```text
//!                           Arc<NodeRegistry>
//!                     ┌──────────────────────────┐
//!                     │ nodes: Mutex<Vec<Node {  │
//!                     │   id, internal_address,  │
//!                     │   observer_address,      │
//!                     │   service_state,         │
//!                     │   active_client_count,   │
//!                     │ }>>                      │
//!                     └────────────┬─────────────┘
//!                                  │
//!         ┌────────────────────────┼────────────────────────┐
//!         │                        │                        │
//!         ▼                        ▼                        ▼
//!    [Edge node]              [Edge node]               [Viewer]
//!    register()               update()            select_for_playback()
//!         │                        │                        │
//!         └─────── sweep() ────────┴──► peers / least-loaded address
//! ```
//!
//! # Liveness
//!
//! There is no timer required for correctness: every call that exposes node
//! state sweeps first, so a dead node is never returned to a caller. An
//! optional background task (`spawn_sweep_task`) frees memory when the
//! registry is idle.
//!
//! # Grouping
//!
//! Nodes are grouped by the address the registry saw the request come from
//! (the observer address), never by anything the node reports. Nodes behind
//! the same NAT or proxy are peers, and viewers behind that vantage point
//! are routed to one of them.

pub mod config;
pub mod entry;
pub mod error;
pub mod key;
pub mod store;

pub use config::RegistryConfig;
pub use entry::{Node, NodeSnapshot, ServiceState};
pub use error::RegistryError;
pub use key::{NodeId, StreamKey};
pub use store::{NodeRegistry, Registration};
