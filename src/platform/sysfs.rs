//! Linux implementation reading WiFi state from procfs and sysfs.
//!
//! Link quality comes from `/proc/net/wireless`; radio presence and link
//! state from `/sys/class/net/<iface>`. Linux exposes no cellular modem
//! readings here, so cell queries report the source as unavailable.
//! Everything is read synchronously, which puts this platform on the
//! polling tier.

use crate::platform::types::{
    NotificationSender, PlatformSource, PlatformTier, RawCellReading, RawWifiInfo,
};
use std::path::{Path, PathBuf};

/// SSID reported when the kernel interface does not expose one.
pub const UNKNOWN_SSID: &str = "<unknown ssid>";
/// BSSID reported when the access point address is not available.
pub const UNKNOWN_BSSID: &str = "02:00:00:00:00:00";
/// Link speed reported when the driver does not publish one.
pub const LINK_SPEED_UNKNOWN: i32 = -1;

/// One row of `/proc/net/wireless`.
#[derive(Debug, Clone, PartialEq)]
pub struct WirelessLink {
    pub interface: String,
    pub link_quality: f64,
    pub signal_dbm: i32,
}

/// Parse the contents of `/proc/net/wireless`.
pub fn parse_proc_wireless(content: &str) -> Vec<WirelessLink> {
    content
        .lines()
        .skip(2)
        .filter_map(|line| {
            let (interface, rest) = line.split_once(':')?;
            let fields: Vec<&str> = rest.split_whitespace().collect();
            // status, link, level, noise, ...
            let link_quality = fields.get(1)?.trim_end_matches('.').parse::<f64>().ok()?;
            let signal = fields.get(2)?.trim_end_matches('.').parse::<f64>().ok()?;
            Some(WirelessLink {
                interface: interface.trim().to_string(),
                link_quality,
                signal_dbm: signal.round() as i32,
            })
        })
        .collect()
}

/// Linux [`PlatformSource`].
pub struct SysfsSource {
    proc_wireless: PathBuf,
    sys_class_net: PathBuf,
}

impl SysfsSource {
    pub fn new() -> Self {
        Self::with_paths("/proc/net/wireless", "/sys/class/net")
    }

    /// Read from alternative locations (used by tests).
    pub fn with_paths(proc_wireless: impl AsRef<Path>, sys_class_net: impl AsRef<Path>) -> Self {
        Self {
            proc_wireless: proc_wireless.as_ref().to_path_buf(),
            sys_class_net: sys_class_net.as_ref().to_path_buf(),
        }
    }

    fn wireless_interfaces(&self) -> Vec<String> {
        std::fs::read_dir(&self.sys_class_net)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().join("wireless").exists())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn interface_attr(&self, interface: &str, attr: &str) -> Option<String> {
        std::fs::read_to_string(self.sys_class_net.join(interface).join(attr))
            .ok()
            .map(|s| s.trim().to_string())
    }

    fn active_link(&self) -> Option<WirelessLink> {
        let content = std::fs::read_to_string(&self.proc_wireless).ok()?;
        parse_proc_wireless(&content).into_iter().find(|link| {
            self.interface_attr(&link.interface, "operstate")
                .map_or(true, |state| state == "up")
        })
    }
}

impl Default for SysfsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformSource for SysfsSource {
    fn tier(&self) -> PlatformTier {
        PlatformTier::Standard
    }

    fn permission_granted(&self) -> bool {
        true
    }

    fn all_cell_info(&self) -> Option<Vec<Option<RawCellReading>>> {
        None
    }

    fn wifi_enabled(&self) -> bool {
        !self.wireless_interfaces().is_empty()
    }

    fn wifi_connection_info(&self) -> Option<RawWifiInfo> {
        let link = self.active_link()?;
        let bssid = self
            .interface_attr(&link.interface, "address")
            .unwrap_or_else(|| UNKNOWN_BSSID.to_string());
        let link_speed_mbps = self
            .interface_attr(&link.interface, "speed")
            .and_then(|s| s.parse().ok())
            .unwrap_or(LINK_SPEED_UNKNOWN);

        tracing::trace!(interface = %link.interface, rssi = link.signal_dbm, "wireless link");

        Some(RawWifiInfo {
            ssid: UNKNOWN_SSID.to_string(),
            bssid,
            network_id: -1,
            rssi: link.signal_dbm,
            link_speed_mbps,
            level: None,
            tx_link_speed_mbps: None,
            max_tx_link_speed_mbps: None,
            rx_link_speed_mbps: None,
            max_rx_link_speed_mbps: None,
        })
    }

    fn request_wifi_network(&self, _notifier: NotificationSender) {
        // Polling tier: WiFi state is always read synchronously.
    }

    /// procfs and sysfs have no change notifications. WiFi is covered by the
    /// poll timer.
    fn register_listeners(&self, _notifier: NotificationSender) {}

    fn unregister_listeners(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_WIRELESS: &str = "\
Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
 face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
wlp2s0: 0000   54.  -56.  -256        0      0      0      0      0        0
";

    #[test]
    fn test_parse_proc_wireless() {
        let links = parse_proc_wireless(PROC_WIRELESS);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].interface, "wlp2s0");
        assert_eq!(links[0].signal_dbm, -56);
        assert!((links[0].link_quality - 54.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_header_only() {
        let header: String = PROC_WIRELESS.lines().take(2).collect::<Vec<_>>().join("\n");
        assert!(parse_proc_wireless(&header).is_empty());
    }

    #[test]
    fn test_reads_fake_tree() {
        let root = std::env::temp_dir().join(format!("radio-signal-sysfs-{}", uuid::Uuid::new_v4()));
        let iface = root.join("net").join("wlp2s0");
        std::fs::create_dir_all(iface.join("wireless")).unwrap();
        std::fs::write(iface.join("operstate"), "up\n").unwrap();
        std::fs::write(iface.join("address"), "3c:22:fb:00:11:22\n").unwrap();
        std::fs::write(root.join("wireless"), PROC_WIRELESS).unwrap();

        let source = SysfsSource::with_paths(root.join("wireless"), root.join("net"));
        assert!(source.wifi_enabled());
        assert!(source.all_cell_info().is_none());

        let info = source.wifi_connection_info().unwrap();
        assert_eq!(info.rssi, -56);
        assert_eq!(info.bssid, "3c:22:fb:00:11:22");
        assert_eq!(info.ssid, UNKNOWN_SSID);
        assert_eq!(info.link_speed_mbps, LINK_SPEED_UNKNOWN);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_tree() {
        let source = SysfsSource::with_paths("/nonexistent/wireless", "/nonexistent/net");
        assert!(!source.wifi_enabled());
        assert!(source.wifi_connection_info().is_none());
    }

    #[test]
    fn test_listeners_do_not_retain_notifier() {
        let source = SysfsSource::with_paths("/nonexistent/wireless", "/nonexistent/net");
        let (tx, rx) = crossbeam_channel::unbounded();
        source.register_listeners(tx);
        assert_eq!(
            rx.try_recv(),
            Err(crossbeam_channel::TryRecvError::Disconnected)
        );
        source.unregister_listeners();
    }
}
