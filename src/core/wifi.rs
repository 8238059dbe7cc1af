//! WiFi report construction.

use crate::core::report::{WifiReport, WifiSample};
use crate::platform::types::{PlatformTier, RawWifiInfo};

const MIN_RSSI: i32 = -100;
const MAX_RSSI: i32 = -55;

/// Bucket an RSSI into `0..=max_level`.
pub fn signal_level(rssi: i32, max_level: i32) -> i32 {
    if max_level <= 0 {
        return 0;
    }
    if rssi <= MIN_RSSI {
        0
    } else if rssi >= MAX_RSSI {
        max_level
    } else {
        (rssi - MIN_RSSI) * max_level / (MAX_RSSI - MIN_RSSI)
    }
}

/// Normalize raw connection info. Link-speed details are only kept on tiers
/// that expose extended link statistics.
pub fn wifi_sample(info: &RawWifiInfo, tier: PlatformTier, max_level: i32) -> WifiSample {
    let extended = tier.has_extended_link_stats();
    let keep = |v: Option<i32>| if extended { v } else { None };

    WifiSample {
        ssid: info.ssid.clone(),
        bssid: info.bssid.clone(),
        network_id: info.network_id,
        rssi: info.rssi,
        link_speed_mbps: info.link_speed_mbps,
        level: info
            .level
            .unwrap_or_else(|| signal_level(info.rssi, max_level)),
        max_level,
        tx_link_speed_mbps: keep(info.tx_link_speed_mbps),
        max_tx_link_speed_mbps: keep(info.max_tx_link_speed_mbps),
        rx_link_speed_mbps: keep(info.rx_link_speed_mbps),
        max_rx_link_speed_mbps: keep(info.max_rx_link_speed_mbps),
    }
}

/// Build a report from the radio state and optional connection info.
pub fn build_wifi_report(
    enabled: bool,
    info: Option<&RawWifiInfo>,
    tier: PlatformTier,
    max_level: i32,
) -> WifiReport {
    let info = info.map(|i| wifi_sample(i, tier, max_level));
    tracing::trace!(
        enabled,
        connected = info.is_some(),
        ssid = info.as_ref().map(|i| i.ssid.as_str()),
        "built wifi report"
    );
    WifiReport {
        enabled,
        connected: info.is_some(),
        info,
        reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> RawWifiInfo {
        RawWifiInfo {
            ssid: "\"lab\"".to_string(),
            bssid: "aa:bb:cc:dd:ee:ff".to_string(),
            network_id: 3,
            rssi: -60,
            link_speed_mbps: 433,
            level: None,
            tx_link_speed_mbps: Some(400),
            max_tx_link_speed_mbps: Some(866),
            rx_link_speed_mbps: Some(390),
            max_rx_link_speed_mbps: Some(866),
        }
    }

    #[test]
    fn test_signal_level_buckets() {
        assert_eq!(signal_level(-120, 4), 0);
        assert_eq!(signal_level(-100, 4), 0);
        assert_eq!(signal_level(-78, 4), 1);
        assert_eq!(signal_level(-60, 4), 3);
        assert_eq!(signal_level(-40, 4), 4);
        assert_eq!(signal_level(-60, 0), 0);
    }

    #[test]
    fn test_extended_stats_follow_tier() {
        let sample = wifi_sample(&info(), PlatformTier::Modern, 4);
        assert_eq!(sample.tx_link_speed_mbps, Some(400));
        assert_eq!(sample.max_rx_link_speed_mbps, Some(866));

        let sample = wifi_sample(&info(), PlatformTier::Legacy, 4);
        assert_eq!(sample.tx_link_speed_mbps, None);
        assert_eq!(sample.max_rx_link_speed_mbps, None);
        assert_eq!(sample.link_speed_mbps, 433);
    }

    #[test]
    fn test_platform_level_wins() {
        let mut raw = info();
        raw.level = Some(1);
        assert_eq!(wifi_sample(&raw, PlatformTier::Standard, 4).level, 1);
    }

    #[test]
    fn test_report_connected_flag() {
        let report = build_wifi_report(true, Some(&info()), PlatformTier::Modern, 4);
        assert!(report.connected);
        assert_eq!(report.info.unwrap().level, 3);

        let report = build_wifi_report(true, None, PlatformTier::Modern, 4);
        assert!(report.enabled);
        assert!(!report.connected);
        assert!(report.reason.is_none());
    }
}
