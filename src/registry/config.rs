//! Registry configuration

use std::time::Duration;

/// Default time without a heartbeat after which a node is evicted
pub const DEFAULT_DEAD_NODE_THRESHOLD: Duration = Duration::from_secs(10);

/// Default period of the background sweep task
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Node registry configuration options
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Nodes silent for longer than this are removed by the next sweep
    pub dead_node_threshold: Duration,

    /// Tick period of `NodeRegistry::spawn_sweep_task`
    pub sweep_interval: Duration,

    /// Node ids start right after this value
    pub id_seed: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            dead_node_threshold: DEFAULT_DEAD_NODE_THRESHOLD,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            // Seeding from the pid keeps ids from colliding with those
            // handed out by a previous run of the registry.
            id_seed: u64::from(std::process::id()),
        }
    }
}

impl RegistryConfig {
    /// Set the dead node threshold
    pub fn dead_node_threshold(mut self, threshold: Duration) -> Self {
        self.dead_node_threshold = threshold;
        self
    }

    /// Set the background sweep interval
    ///
    /// Zero is not a valid tokio interval period and is bumped to 1ms.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the id seed
    pub fn id_seed(mut self, seed: u64) -> Self {
        self.id_seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();

        assert_eq!(config.dead_node_threshold, Duration::from_secs(10));
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.id_seed, u64::from(std::process::id()));
    }

    #[test]
    fn test_builder_chaining() {
        let config = RegistryConfig::default()
            .dead_node_threshold(Duration::from_secs(30))
            .sweep_interval(Duration::from_secs(1))
            .id_seed(1000);

        assert_eq!(config.dead_node_threshold, Duration::from_secs(30));
        assert_eq!(config.sweep_interval, Duration::from_secs(1));
        assert_eq!(config.id_seed, 1000);
    }

    #[test]
    fn test_builder_sweep_interval_floor() {
        let config = RegistryConfig::default().sweep_interval(Duration::ZERO);

        assert_eq!(config.sweep_interval, Duration::from_millis(1));
    }
}
