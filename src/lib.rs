//! Radio Signal Agent - normalized cellular and WiFi telemetry.
//!
//! This library reads heterogeneous radio readings from a host platform and
//! turns them into normalized reports, answered to direct queries and
//! streamed to a long-lived subscriber.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Radio Signal Agent                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Platform   │──▶│  Normalize  │──▶│  Primary    │       │
//! │  │  (source)   │   │  (samples)  │   │  selection  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │ notifications                      │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │ Acquisition │──▶│ Correlator  │   │  Event bus  │──▶ subscriber
//! │  │ (push/poll) │   │ (WiFi query)│   │             │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use radio_signal_agent::{AgentOptions, ReplaySource, SignalAgent};
//!
//! let source = ReplaySource::from_file("device.json").expect("Failed to load snapshot");
//! let agent = SignalAgent::new(Arc::new(source), AgentOptions::default());
//!
//! let report = agent.get_cell_report().expect("Failed to read cells");
//! println!("primary: {:?}", report.primary);
//!
//! // Live updates
//! let events = agent.subscribe_channel();
//! for event in events.iter().take(3) {
//!     println!("{}", event.event_type());
//! }
//! agent.unsubscribe();
//! ```

pub mod acquisition;
pub mod agent;
pub mod bus;
pub mod config;
pub mod core;
pub mod correlator;
pub mod error;
pub mod platform;
pub mod pool;
pub mod stats;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use acquisition::{AcquisitionShim, PollTiming};
pub use agent::{AgentOptions, SignalAgent};
pub use bus::{Event, EventBus};
pub use config::{Config, ConfigError};
pub use crate::core::{
    select_primary, CellReport, ConnectionStatus, DisconnectReason, SignalSample, Technology,
    WifiReport, WifiSample,
};
pub use correlator::{PendingQuery, RequestCorrelator};
pub use error::{Result, SignalError};
pub use platform::{NativeSource, PlatformSource, PlatformTier, ReplaySnapshot, ReplaySource};
pub use stats::{AgentStats, SharedStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
