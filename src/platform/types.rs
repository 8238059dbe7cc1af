//! Raw platform types consumed by the agent.
//!
//! These mirror what a host radio stack hands out: per-technology cell
//! readings, WiFi connection info, and asynchronous change notifications.
//! Nothing here is normalized yet.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

/// Raw connection-status code reported when a cell is not serving.
pub const CONNECTION_NONE: i32 = 0;
/// Raw connection-status code for the primary serving cell.
pub const CONNECTION_PRIMARY_SERVING: i32 = 1;
/// Raw connection-status code for a secondary serving cell (carrier aggregation).
pub const CONNECTION_SECONDARY_SERVING: i32 = 2;
/// Raw connection-status code when the modem cannot tell.
pub const CONNECTION_UNKNOWN: i32 = 0x7fff_ffff;

/// Signal strength as reported by one technology's signal-strength object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStrength {
    pub dbm: i32,
    pub level: i32,
}

/// Per-technology signal payload of a raw cell reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "technology", rename_all = "lowercase")]
pub enum RawCellSignal {
    Gsm(RawStrength),
    Cdma(RawStrength),
    Lte(RawStrength),
    Wcdma(RawStrength),
    Nr(RawStrength),
    Tdscdma(RawStrength),
    /// A cell type this agent does not know how to read.
    #[serde(other)]
    Unrecognized,
}

/// One opaque cell reading as returned by the platform's cell-info query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCellReading {
    pub signal: RawCellSignal,
    pub registered: bool,
    /// Raw connection-status code. `None` on tiers that do not expose one.
    #[serde(default)]
    pub connection_status: Option<i32>,
}

impl RawCellReading {
    pub fn new(signal: RawCellSignal, registered: bool, connection_status: Option<i32>) -> Self {
        Self {
            signal,
            registered,
            connection_status,
        }
    }
}

/// Raw WiFi connection info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWifiInfo {
    pub ssid: String,
    pub bssid: String,
    pub network_id: i32,
    pub rssi: i32,
    pub link_speed_mbps: i32,
    /// Platform-computed level, if the platform provides one.
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub tx_link_speed_mbps: Option<i32>,
    #[serde(default)]
    pub max_tx_link_speed_mbps: Option<i32>,
    #[serde(default)]
    pub rx_link_speed_mbps: Option<i32>,
    #[serde(default)]
    pub max_rx_link_speed_mbps: Option<i32>,
}

/// How samples are sourced on a platform tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionMode {
    /// Platform pushes change notifications; WiFi queries are asynchronous.
    Push,
    /// WiFi state is read synchronously and polled on a timer.
    Poll,
}

/// Platform capability tier.
///
/// - `Legacy`: no connection-status field, no extended link stats, polling.
/// - `Standard`: connection status and extended link stats, polling.
/// - `Modern`: everything, with push notifications and async WiFi queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTier {
    Legacy,
    Standard,
    Modern,
}

impl PlatformTier {
    pub fn has_connection_status(&self) -> bool {
        !matches!(self, PlatformTier::Legacy)
    }

    pub fn has_extended_link_stats(&self) -> bool {
        !matches!(self, PlatformTier::Legacy)
    }

    pub fn acquisition_mode(&self) -> AcquisitionMode {
        match self {
            PlatformTier::Modern => AcquisitionMode::Push,
            PlatformTier::Legacy | PlatformTier::Standard => AcquisitionMode::Poll,
        }
    }

    /// Parse a tier name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Some(PlatformTier::Legacy),
            "standard" => Some(PlatformTier::Standard),
            "modern" => Some(PlatformTier::Modern),
            _ => None,
        }
    }
}

/// Asynchronous notifications delivered by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformNotification {
    /// The set of visible cells changed.
    CellInfoChanged(Vec<Option<RawCellReading>>),
    /// Signal strengths changed; cell info has to be re-read.
    SignalStrengthsChanged,
    /// A WiFi network became available.
    NetworkAvailable,
    /// WiFi link properties changed. `None` when the transport carried no info.
    CapabilitiesChanged(Option<RawWifiInfo>),
    /// The WiFi network was lost.
    NetworkLost,
    /// No WiFi network could be obtained.
    NetworkUnavailable,
    /// The WiFi radio's state changed.
    WifiStateChanged { enabled: bool },
}

/// Sink the platform pushes notifications into.
pub type NotificationSender = Sender<PlatformNotification>;

/// Everything the agent needs from the host platform.
///
/// Implementations must be cheap to call from several threads at once.
pub trait PlatformSource: Send + Sync {
    /// Capability tier of this platform.
    fn tier(&self) -> PlatformTier;

    /// Whether the location permission needed for cell info is granted.
    fn permission_granted(&self) -> bool;

    /// All currently visible cells, or `None` if the source is unavailable.
    /// Individual entries may be `None`.
    fn all_cell_info(&self) -> Option<Vec<Option<RawCellReading>>>;

    /// Whether the WiFi radio is switched on.
    fn wifi_enabled(&self) -> bool;

    /// Current WiFi connection info, read synchronously.
    fn wifi_connection_info(&self) -> Option<RawWifiInfo>;

    /// Highest level `signal_level` may return on this platform.
    fn max_wifi_level(&self) -> i32 {
        4
    }

    /// Ask the platform for the WiFi network. The answer arrives later as a
    /// notification on `notifier`.
    fn request_wifi_network(&self, notifier: NotificationSender);

    /// Start delivering change notifications to `notifier`.
    fn register_listeners(&self, notifier: NotificationSender);

    /// Stop delivering change notifications.
    fn unregister_listeners(&self);
}
