//! Registry for a fleet of edge delivery nodes
//!
//! Edge servers register and heartbeat into a [`NodeRegistry`]; nodes that
//! go quiet for longer than the dead-node threshold are swept out, and each
//! viewer is routed to the least-loaded running node behind the same network
//! vantage point.
//!
//! ```no_run
//! use edge_registry::{NodeRegistry, ServiceState, StreamKey};
//!
//! # async fn demo() {
//! let registry = NodeRegistry::new();
//!
//! let reg = registry
//!     .register("10.0.0.1", "linux", ServiceState::Running, "1.2.3.4")
//!     .await;
//! println!("registered as {}", reg.id);
//!
//! let edge = registry
//!     .select_for_playback("1.2.3.4", &StreamKey::new("live", "livestream"))
//!     .await;
//! assert_eq!(edge.as_deref(), Some("10.0.0.1"));
//! # }
//! ```

pub mod api;
pub mod registry;
pub mod stats;

pub use registry::{
    NodeId, NodeRegistry, NodeSnapshot, Registration, RegistryConfig, RegistryError,
    ServiceState, StreamKey,
};
pub use stats::StatsSnapshot;
