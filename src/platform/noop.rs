//! Non-Linux (noop) platform.
//!
//! This exists so the crate (and binary) can compile on targets without a
//! native signal backend. It reports no cells and no WiFi radio.

use crate::platform::types::{
    NotificationSender, PlatformSource, PlatformTier, RawCellReading, RawWifiInfo,
};

/// A platform that never has any readings.
#[derive(Debug, Default)]
pub struct NoopSource;

impl NoopSource {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformSource for NoopSource {
    fn tier(&self) -> PlatformTier {
        PlatformTier::Legacy
    }

    /// There is no permission gate without a backend.
    fn permission_granted(&self) -> bool {
        true
    }

    fn all_cell_info(&self) -> Option<Vec<Option<RawCellReading>>> {
        None
    }

    fn wifi_enabled(&self) -> bool {
        false
    }

    fn wifi_connection_info(&self) -> Option<RawWifiInfo> {
        None
    }

    fn request_wifi_network(&self, _notifier: NotificationSender) {}

    fn register_listeners(&self, _notifier: NotificationSender) {}

    fn unregister_listeners(&self) {}
}
