//! Glue between parsed requests and the registry
//!
//! The observer address is always the transport's view of the peer; it is
//! never taken from a request body.

use std::net::IpAddr;

use crate::registry::error::Result;
use crate::registry::{NodeId, NodeRegistry, Registration};

use super::types::{NodeResponse, PlaybackQuery, RegisterRequest, UpdateRequest};

impl From<Registration> for NodeResponse {
    fn from(reg: Registration) -> Self {
        Self {
            id: reg.id,
            peers: reg.peers,
        }
    }
}

/// Observer address as stored in the registry
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) from dual-stack listeners
/// are folded to plain IPv4 so they group with IPv4 listeners.
fn observer_key(observer: IpAddr) -> String {
    observer.to_canonical().to_string()
}

impl NodeRegistry {
    /// Validate and apply a registration posted by an edge node
    ///
    /// Invalid input is rejected before the registry is touched, so no id
    /// is consumed.
    pub async fn register_request(
        &self,
        req: &RegisterRequest,
        observer: IpAddr,
    ) -> Result<NodeResponse> {
        let state = req.validate()?;
        let reg = self
            .register(req.ip.trim(), req.os.trim(), state, observer_key(observer))
            .await;
        Ok(reg.into())
    }

    /// Validate and apply a heartbeat posted by an edge node
    pub async fn update_request(
        &self,
        id: &NodeId,
        req: &UpdateRequest,
        observer: IpAddr,
    ) -> Result<NodeResponse> {
        let state = req.validate()?;
        let reg = self
            .update(id, req.ip.trim(), state, observer_key(observer))
            .await?;
        Ok(reg.into())
    }

    /// Pick an edge address for a player, or `None` to use the origin
    pub async fn playback_request(&self, query: &PlaybackQuery, observer: IpAddr) -> Option<String> {
        let stream = query.stream_key();
        self.select_for_playback(&observer_key(observer), &stream).await
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;
    use crate::registry::{RegistryConfig, RegistryError, ServiceState};

    fn observer() -> IpAddr {
        "1.2.3.4".parse().unwrap()
    }

    fn register_body(ip: &str, srs: &str) -> RegisterRequest {
        RegisterRequest {
            ip: ip.to_string(),
            os: "linux".to_string(),
            srs: srs.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_then_peers() {
        let registry = NodeRegistry::with_config(RegistryConfig::default().id_seed(1000));

        let x = assert_ok!(
            registry
                .register_request(&register_body("10.0.0.1", "running"), observer())
                .await
        );
        assert_eq!(x.id, NodeId::from(1001));
        assert!(x.peers.is_empty());

        let y = assert_ok!(
            registry
                .register_request(&register_body("10.0.0.1", "running"), observer())
                .await
        );
        assert_eq!(y.peers.len(), 1);
        assert_eq!(y.peers[0].id, x.id);
        assert_eq!(y.peers[0].observer_address, "1.2.3.4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_register_consumes_nothing() {
        let registry = NodeRegistry::with_config(RegistryConfig::default().id_seed(1000));

        let result = registry
            .register_request(&register_body("", "running"), observer())
            .await;
        assert!(matches!(result, Err(RegistryError::InvalidInput(_))));
        assert_eq!(registry.node_count().await, 0);

        let ok = assert_ok!(
            registry
                .register_request(&register_body("10.0.0.1", "running"), observer())
                .await
        );
        assert_eq!(ok.id, NodeId::from(1001));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_request() {
        let registry = NodeRegistry::new();
        let x = assert_ok!(
            registry
                .register_request(&register_body("10.0.0.1", "running"), observer())
                .await
        );

        let body = UpdateRequest {
            ip: "10.0.0.2".into(),
            srs: "not_running".into(),
        };
        let resp = assert_ok!(registry.update_request(&x.id, &body, observer()).await);
        assert_eq!(resp.id, x.id);

        let node = registry.get(&x.id).await.unwrap();
        assert_eq!(node.internal_address, "10.0.0.2");
        assert_eq!(node.service_state, ServiceState::NotRunning);

        let missing = registry
            .update_request(&NodeId::new("nope"), &body, observer())
            .await;
        assert_eq!(missing, Err(RegistryError::NotFound(NodeId::new("nope"))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_request_uses_transport_observer() {
        let registry = NodeRegistry::new();
        assert_ok!(
            registry
                .register_request(&register_body("10.0.0.1", "running"), observer())
                .await
        );

        let query = PlaybackQuery {
            app: Some("live".into()),
            stream: Some("livestream".into()),
        };
        assert_eq!(
            registry.playback_request(&query, observer()).await,
            Some("10.0.0.1".to_string())
        );
        assert_eq!(
            registry
                .playback_request(&query, "9.9.9.9".parse().unwrap())
                .await,
            None
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mapped_ipv6_observer_groups_with_ipv4() {
        let registry = NodeRegistry::new();
        let mapped: IpAddr = "::ffff:1.2.3.4".parse().unwrap();

        let x = assert_ok!(
            registry
                .register_request(&register_body("10.0.0.1", "running"), observer())
                .await
        );
        let y = assert_ok!(
            registry
                .register_request(&register_body("10.0.0.2", "running"), mapped)
                .await
        );
        assert_eq!(y.peers.len(), 1);
        assert_eq!(y.peers[0].id, x.id);
        assert_eq!(registry.get(&y.id).await.unwrap().observer_address, "1.2.3.4");

        let query = PlaybackQuery {
            app: None,
            stream: None,
        };
        assert_eq!(
            registry.playback_request(&query, mapped).await,
            Some("10.0.0.1".to_string())
        );

        // Real IPv6 observers are kept as they are
        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        let z = assert_ok!(
            registry
                .register_request(&register_body("10.0.0.3", "running"), v6)
                .await
        );
        assert!(z.peers.is_empty());
        assert_eq!(registry.get(&z.id).await.unwrap().observer_address, "2001:db8::1");
    }

    #[test]
    fn test_node_response_json_shape() {
        let resp = NodeResponse {
            id: NodeId::from(1001),
            peers: Vec::new(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"id":"1001","peers":[]}"#);
    }
}
