//! Identifier types for nodes and streams
//!
//! Node ids are handed out by the registry; stream keys describe what a
//! viewer asked to play.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Registry-assigned identifier of an edge node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an id received from the transport layer
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Monotonic source of node ids, owned by a single registry
///
/// Ids are `seed + 1`, `seed + 2`, ... and never repeat for the lifetime of
/// the allocator.
#[derive(Debug)]
pub(super) struct IdAllocator {
    last: AtomicU64,
}

impl IdAllocator {
    pub(super) fn new(seed: u64) -> Self {
        Self {
            last: AtomicU64::new(seed),
        }
    }

    pub(super) fn next(&self) -> NodeId {
        NodeId::from(self.last.fetch_add(1, Ordering::Relaxed).wrapping_add(1))
    }
}

/// Stream a viewer wants to play (app + stream name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamKey {
    /// Application name (e.g., "live")
    pub app: String,
    /// Stream name (e.g., "livestream")
    pub name: String,
}

impl StreamKey {
    /// Create a new stream key
    pub fn new(app: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            name: name.into(),
        }
    }

    /// Parse an `app/stream` path, as used in player URLs
    pub fn parse(path: &str) -> Option<Self> {
        let (app, name) = path.trim_matches('/').split_once('/')?;
        if app.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(app, name))
    }
}

impl Default for StreamKey {
    fn default() -> Self {
        Self::new("live", "livestream")
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.app, self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_allocator_starts_after_seed() {
        let ids = IdAllocator::new(1000);
        assert_eq!(ids.next(), NodeId::from(1001));
        assert_eq!(ids.next(), NodeId::from(1002));
    }

    #[test]
    fn test_allocator_unique_across_threads() {
        let ids = Arc::new(IdAllocator::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_stream_key_parse() {
        assert_eq!(
            StreamKey::parse("live/livestream"),
            Some(StreamKey::new("live", "livestream"))
        );
        assert_eq!(
            StreamKey::parse("/live/cam1/"),
            Some(StreamKey::new("live", "cam1"))
        );
        assert_eq!(StreamKey::parse("livestream"), None);
        assert_eq!(StreamKey::parse("live/"), None);
    }

    #[test]
    fn test_stream_key_display() {
        assert_eq!(StreamKey::default().to_string(), "live/livestream");
    }
}
