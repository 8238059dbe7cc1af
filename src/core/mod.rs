//! Core report building for the Radio Signal Agent.
//!
//! This module contains:
//! - Normalization of raw per-technology cell readings
//! - Primary-cell selection into a cell report
//! - WiFi report construction

pub mod normalize;
pub mod report;
pub mod selector;
pub mod wifi;

// Re-export commonly used types
pub use normalize::{normalize, SENTINEL_DBM, SENTINEL_LEVEL};
pub use report::{
    CellReport, ConnectionStatus, DisconnectReason, SignalSample, Technology, WifiReport,
    WifiSample,
};
pub use selector::select_primary;
pub use wifi::{build_wifi_report, signal_level};
