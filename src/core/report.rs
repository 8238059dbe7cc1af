//! Normalized report types handed to callers and subscribers.

use serde::{Deserialize, Serialize};

/// Radio access technology of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Technology {
    Gsm,
    Cdma,
    Lte,
    Wcdma,
    Nr,
    Tdscdma,
    Unknown,
}

/// Serving classification of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionStatus {
    PrimaryServing,
    SecondaryServing,
    None,
    Unknown,
}

impl ConnectionStatus {
    /// Whether the cell is serving (primary or secondary).
    pub fn is_serving(&self) -> bool {
        matches!(
            self,
            ConnectionStatus::PrimaryServing | ConnectionStatus::SecondaryServing
        )
    }
}

/// One normalized cell reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSample {
    pub technology: Technology,
    pub dbm: i32,
    pub level: i32,
    pub connection_status: ConnectionStatus,
    /// True if `dbm` and `level` were read from the cell.
    pub data_loaded: bool,
    pub registered: bool,
    /// Serving flag derived during normalization. Cleared on alternates.
    pub primary: bool,
}

/// Aggregated cellular state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellReport {
    pub primary: Option<SignalSample>,
    pub alternates: Vec<SignalSample>,
}

impl CellReport {
    /// Report with no cells at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.alternates.is_empty()
    }

    /// Total number of samples in the report.
    pub fn sample_count(&self) -> usize {
        self.alternates.len() + usize::from(self.primary.is_some())
    }

    /// dBm of the effective primary cell, if any.
    pub fn primary_dbm(&self) -> Option<i32> {
        self.primary.as_ref().map(|p| p.dbm)
    }
}

/// Why a WiFi report carries no connection info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisconnectReason {
    LostConnection,
    Unavailable,
    Disabled,
}

/// Normalized WiFi connection info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiSample {
    pub ssid: String,
    pub bssid: String,
    pub network_id: i32,
    pub rssi: i32,
    pub link_speed_mbps: i32,
    pub level: i32,
    pub max_level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_link_speed_mbps: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tx_link_speed_mbps: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_link_speed_mbps: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rx_link_speed_mbps: Option<i32>,
}

/// Aggregated WiFi state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiReport {
    pub enabled: bool,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<WifiSample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DisconnectReason>,
}

impl WifiReport {
    /// Report for a radio that is not connected, tagged with the reason.
    pub fn disconnected(enabled: bool, reason: DisconnectReason) -> Self {
        Self {
            enabled,
            connected: false,
            info: None,
            reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cell_report() {
        let report = CellReport::empty();
        assert!(report.is_empty());
        assert_eq!(report.sample_count(), 0);
        assert_eq!(report.primary_dbm(), None);
    }

    #[test]
    fn test_serving_status() {
        assert!(ConnectionStatus::PrimaryServing.is_serving());
        assert!(ConnectionStatus::SecondaryServing.is_serving());
        assert!(!ConnectionStatus::None.is_serving());
        assert!(!ConnectionStatus::Unknown.is_serving());
    }

    #[test]
    fn test_disconnected_wifi_json() {
        let report = WifiReport::disconnected(false, DisconnectReason::Disabled);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["enabled"], false);
        assert_eq!(json["connected"], false);
        assert_eq!(json["reason"], "disabled");
        assert!(json.get("info").is_none());
    }
}
