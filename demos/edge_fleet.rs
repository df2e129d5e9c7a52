//! Simulated edge fleet driving the registry
//!
//! Run with: cargo run --example edge_fleet
//!
//! Three edge nodes sit behind two NATs. They register, heartbeat once a
//! second, and viewers behind each NAT are routed to the least-loaded node.
//! Halfway through, one node stops heartbeating and is swept out.
//!
//! Set `RUST_LOG=edge_registry=debug` to see every heartbeat and selection.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use edge_registry::api::{PlaybackQuery, RegisterRequest, UpdateRequest};
use edge_registry::{NodeId, NodeRegistry, RegistryConfig};

const NAT_A: &str = "203.0.113.10";
const NAT_B: &str = "198.51.100.7";

struct EdgeNode {
    id: NodeId,
    ip: &'static str,
    observer: IpAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("edge_registry=info".parse()?)
                .add_directive("edge_fleet=info".parse()?),
        )
        .init();

    // Short threshold so the demo finishes quickly
    let config = RegistryConfig::default()
        .dead_node_threshold(Duration::from_secs(2))
        .sweep_interval(Duration::from_millis(500));
    let registry = Arc::new(NodeRegistry::with_config(config));
    let sweeper = registry.spawn_sweep_task();

    let mut fleet = Vec::new();
    for (ip, observer) in [("10.0.0.1", NAT_A), ("10.0.0.2", NAT_A), ("10.1.0.1", NAT_B)] {
        let observer: IpAddr = observer.parse()?;
        let body = RegisterRequest {
            ip: ip.to_string(),
            os: std::env::consts::OS.to_string(),
            srs: "running".to_string(),
        };
        let resp = registry.register_request(&body, observer).await?;
        println!(
            "{} registered as {} with {} peer(s)",
            ip,
            resp.id,
            resp.peers.len()
        );
        fleet.push(EdgeNode {
            id: resp.id,
            ip,
            observer,
        });
    }

    let query = PlaybackQuery {
        app: Some("live".to_string()),
        stream: Some("livestream".to_string()),
    };

    for round in 0..6 {
        // The last node goes silent after round 2
        let alive = if round < 2 { fleet.len() } else { fleet.len() - 1 };
        for node in &fleet[..alive] {
            let body = UpdateRequest {
                ip: node.ip.to_string(),
                srs: "running".to_string(),
            };
            if let Err(e) = registry.update_request(&node.id, &body, node.observer).await {
                eprintln!("heartbeat for {} failed: {}", node.id, e);
            }
        }

        for nat in [NAT_A, NAT_B] {
            match registry.playback_request(&query, nat.parse()?).await {
                Some(edge) => println!("round {}: viewer behind {} -> edge {}", round, nat, edge),
                None => println!("round {}: viewer behind {} -> origin", round, nat),
            }
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    println!();
    println!("=== Active nodes ===");
    for node in registry.list_active().await {
        println!(
            "{:>8} {:<10} {:<14} {:<12} clients={}",
            node.id,
            node.internal_address,
            node.observer_address,
            node.service_state,
            node.active_client_count
        );
    }
    println!();
    println!("{:?}", registry.stats());

    sweeper.abort();
    Ok(())
}
