//! Wire types exchanged with edge nodes and players

use serde::{Deserialize, Serialize};

use crate::registry::error::{RegistryError, Result};
use crate::registry::{NodeId, NodeSnapshot, ServiceState, StreamKey};

/// Body posted by an edge node when it first registers
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Address the node can be reached at
    #[serde(default)]
    pub ip: String,
    /// OS label, informational
    #[serde(default)]
    pub os: String,
    /// Service state label (`running`, `not_running`, ...)
    #[serde(default)]
    pub srs: String,
}

impl RegisterRequest {
    /// Check required fields and parse the service state
    pub fn validate(&self) -> Result<ServiceState> {
        require("ip", &self.ip)?;
        parse_state(&self.srs)
    }
}

/// Body posted by an edge node on every heartbeat
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    /// Address the node can be reached at
    #[serde(default)]
    pub ip: String,
    /// Service state label
    #[serde(default)]
    pub srs: String,
}

impl UpdateRequest {
    /// Check required fields and parse the service state
    pub fn validate(&self) -> Result<ServiceState> {
        require("ip", &self.ip)?;
        parse_state(&self.srs)
    }
}

/// Response to register and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeResponse {
    /// Id of the node
    pub id: NodeId,
    /// Nodes behind the same observer address
    pub peers: Vec<NodeSnapshot>,
}

/// Query string of a playback request
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackQuery {
    /// Application name; defaults to `live`
    #[serde(default)]
    pub app: Option<String>,
    /// Stream name; defaults to `livestream`
    #[serde(default)]
    pub stream: Option<String>,
}

impl PlaybackQuery {
    /// Resolve the requested stream, filling in defaults
    ///
    /// `stream` may also carry a full `app/stream` path.
    pub fn stream_key(&self) -> StreamKey {
        let fallback = StreamKey::default();

        match (self.app.as_deref(), self.stream.as_deref()) {
            (None, Some(path)) if path.contains('/') => {
                StreamKey::parse(path).unwrap_or(fallback)
            }
            (app, stream) => StreamKey::new(
                non_empty(app).unwrap_or(fallback.app.as_str()),
                non_empty(stream).unwrap_or(fallback.name.as_str()),
            ),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::invalid(format!("missing field `{}`", field)));
    }
    Ok(())
}

fn parse_state(label: &str) -> Result<ServiceState> {
    require("srs", label)?;
    // FromStr for ServiceState never fails
    Ok(label.parse().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_from_json() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"ip":"10.0.0.1","os":"linux","srs":"running"}"#).unwrap();

        assert_eq!(req.ip, "10.0.0.1");
        assert_eq!(req.os, "linux");
        assert_eq!(req.validate(), Ok(ServiceState::Running));
    }

    #[test]
    fn test_register_request_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"os":"linux","srs":"running"}"#).unwrap();
        assert!(matches!(req.validate(), Err(RegistryError::InvalidInput(_))));

        let req: RegisterRequest = serde_json::from_str(r#"{"ip":"10.0.0.1","srs":"  "}"#).unwrap();
        assert!(matches!(req.validate(), Err(RegistryError::InvalidInput(_))));
    }

    #[test]
    fn test_os_label_optional() {
        let req: RegisterRequest = serde_json::from_str(r#"{"ip":"10.0.0.1","srs":"x"}"#).unwrap();
        assert_eq!(req.validate(), Ok(ServiceState::Unknown));
    }

    #[test]
    fn test_update_request_validate() {
        let req = UpdateRequest {
            ip: "10.0.0.1".into(),
            srs: "not_running".into(),
        };
        assert_eq!(req.validate(), Ok(ServiceState::NotRunning));

        let req = UpdateRequest {
            ip: String::new(),
            srs: "running".into(),
        };
        assert_eq!(
            req.validate(),
            Err(RegistryError::invalid("missing field `ip`"))
        );
    }

    #[test]
    fn test_playback_query_defaults() {
        let q = PlaybackQuery {
            app: None,
            stream: None,
        };
        assert_eq!(q.stream_key(), StreamKey::new("live", "livestream"));

        let q = PlaybackQuery {
            app: Some("vod".into()),
            stream: Some("".into()),
        };
        assert_eq!(q.stream_key(), StreamKey::new("vod", "livestream"));
    }

    #[test]
    fn test_playback_query_path() {
        let q = PlaybackQuery {
            app: None,
            stream: Some("game/cam2".into()),
        };
        assert_eq!(q.stream_key(), StreamKey::new("game", "cam2"));
    }
}
