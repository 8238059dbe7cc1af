//! Integration tests for the signal agent HTTP server

#[cfg(feature = "server")]
mod server_tests {
    use radio_signal_agent::platform::{RawCellReading, RawCellSignal, RawStrength};
    use radio_signal_agent::server::{run, ServerConfig};
    use radio_signal_agent::{AgentOptions, ReplaySnapshot, ReplaySource, SignalAgent};
    use std::sync::Arc;
    use std::time::Duration;

    fn agent(snapshot: ReplaySnapshot) -> Arc<SignalAgent> {
        Arc::new(SignalAgent::new(
            Arc::new(ReplaySource::new(snapshot)),
            AgentOptions::default(),
        ))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let config = ServerConfig::new(0);
        let (addr, shutdown_tx) = run(config, agent(ReplaySnapshot::default()))
            .await
            .expect("Failed to start server");

        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["tier"], "standard");
        assert!(body["version"].as_str().is_some());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_cell_endpoint() {
        let snapshot = ReplaySnapshot {
            cells: Some(vec![Some(RawCellReading::new(
                RawCellSignal::Lte(RawStrength { dbm: -85, level: 3 }),
                true,
                Some(1),
            ))]),
            ..Default::default()
        };
        let (addr, shutdown_tx) = run(ServerConfig::new(0), agent(snapshot))
            .await
            .expect("Failed to start server");

        tokio::time::sleep(Duration::from_millis(100)).await;

        let body: serde_json::Value = reqwest::get(format!("http://{}/cell", addr))
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");

        assert_eq!(body["primary"]["technology"], "LTE");
        assert_eq!(body["primary"]["dbm"], -85);
        assert_eq!(body["alternates"], serde_json::json!([]));

        let stats: serde_json::Value = reqwest::get(format!("http://{}/stats", addr))
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(stats["cell_queries"], 1);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_permission_denied_maps_to_forbidden() {
        let snapshot = ReplaySnapshot {
            permission_granted: false,
            ..Default::default()
        };
        let (addr, shutdown_tx) = run(ServerConfig::new(0), agent(snapshot))
            .await
            .expect("Failed to start server");

        tokio::time::sleep(Duration::from_millis(100)).await;

        let response = reqwest::get(format!("http://{}/cell", addr))
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["code"], "PERMISSION_DENIED");

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_wifi_endpoint_on_push_tier() {
        let snapshot = ReplaySnapshot {
            tier: radio_signal_agent::PlatformTier::Modern,
            wifi_enabled: true,
            wifi: None,
            ..Default::default()
        };
        let (addr, shutdown_tx) = run(ServerConfig::new(0), agent(snapshot))
            .await
            .expect("Failed to start server");

        tokio::time::sleep(Duration::from_millis(100)).await;

        let body: serde_json::Value = reqwest::get(format!("http://{}/wifi", addr))
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");

        assert_eq!(body["enabled"], true);
        assert_eq!(body["connected"], false);
        assert_eq!(body["reason"], "unavailable");

        let _ = shutdown_tx.send(());
    }
}
