//! Replay a device snapshot through the agent.
//!
//! Run with: cargo run --example replay_demo [path/to/snapshot.json]
//!
//! Edit the snapshot while the demo runs to see new readings flow through
//! the subscription.

use radio_signal_agent::{AgentOptions, PollTiming, ReplaySource, SignalAgent};
use std::sync::Arc;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/demos/device.json").to_string());
    println!("Replaying {path}");

    let source = ReplaySource::from_file(&path)?;
    let options = AgentOptions {
        poll_timing: PollTiming {
            initial_delay: Duration::from_millis(50),
            interval: Duration::from_secs(2),
        },
        ..Default::default()
    };
    let agent = SignalAgent::new(Arc::new(source), options);

    let cells = agent.get_cell_report()?;
    println!("Cells:\n{}", serde_json::to_string_pretty(&cells)?);

    let wifi = agent.get_wifi_report()?;
    println!("WiFi:\n{}", serde_json::to_string_pretty(&wifi)?);

    println!();
    println!("Watching for 10 seconds...");
    let events = agent.subscribe_channel();
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while let Some(remaining) = deadline.checked_duration_since(std::time::Instant::now()) {
        match events.recv_timeout(remaining) {
            Ok(event) => println!("{}", event.to_payload()?),
            Err(_) => break,
        }
    }
    agent.unsubscribe();

    println!();
    println!("{}", agent.stats().summary());
    Ok(())
}
