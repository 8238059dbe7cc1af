//! Replay platform backed by a JSON snapshot.
//!
//! The snapshot describes what a device would report: cell readings, WiFi
//! connection info, radio and permission state. When loaded from a file the
//! file is re-read on every query, so editing it changes what the agent sees.
//! Requests for the WiFi network are answered through the notifier the same
//! way a push-capable platform answers them.

use crate::platform::types::{
    NotificationSender, PlatformNotification, PlatformSource, PlatformTier, RawCellReading,
    RawWifiInfo,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

fn default_true() -> bool {
    true
}

fn default_tier() -> PlatformTier {
    PlatformTier::Standard
}

/// Device state served by a [`ReplaySource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySnapshot {
    #[serde(default = "default_tier")]
    pub tier: PlatformTier,
    #[serde(default = "default_true")]
    pub permission_granted: bool,
    /// `None` models a platform that returns no cell list at all.
    #[serde(default)]
    pub cells: Option<Vec<Option<RawCellReading>>>,
    #[serde(default = "default_true")]
    pub wifi_enabled: bool,
    #[serde(default)]
    pub wifi: Option<RawWifiInfo>,
    #[serde(default)]
    pub max_wifi_level: Option<i32>,
}

impl Default for ReplaySnapshot {
    fn default() -> Self {
        Self {
            tier: default_tier(),
            permission_granted: true,
            cells: Some(Vec::new()),
            wifi_enabled: true,
            wifi: None,
            max_wifi_level: None,
        }
    }
}

/// Errors loading a replay file.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// [`PlatformSource`] serving a [`ReplaySnapshot`].
pub struct ReplaySource {
    path: Option<PathBuf>,
    tier: PlatformTier,
    snapshot: Mutex<ReplaySnapshot>,
    listener: Mutex<Option<NotificationSender>>,
    answer_requests: AtomicBool,
}

impl ReplaySource {
    /// Serve a fixed snapshot.
    pub fn new(snapshot: ReplaySnapshot) -> Self {
        Self {
            path: None,
            tier: snapshot.tier,
            snapshot: Mutex::new(snapshot),
            listener: Mutex::new(None),
            answer_requests: AtomicBool::new(true),
        }
    }

    /// Serve the snapshot stored at `path`, re-reading it on each query.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = read_snapshot(&path)?;
        let mut source = Self::new(snapshot);
        source.path = Some(path);
        Ok(source)
    }

    /// Override the tier read from the snapshot.
    pub fn with_tier(mut self, tier: PlatformTier) -> Self {
        self.tier = tier;
        self
    }

    /// Stop answering WiFi network requests, like a platform whose callback
    /// never fires.
    pub fn set_answer_requests(&self, answer: bool) {
        self.answer_requests.store(answer, Ordering::SeqCst);
    }

    /// Replace the served state.
    pub fn set_snapshot(&self, snapshot: ReplaySnapshot) {
        *lock(&self.snapshot) = snapshot;
    }

    /// Push a notification to the registered listener, if any.
    pub fn notify(&self, notification: PlatformNotification) -> bool {
        match lock(&self.listener).as_ref() {
            Some(listener) => listener.send(notification).is_ok(),
            None => false,
        }
    }

    pub fn has_listener(&self) -> bool {
        lock(&self.listener).is_some()
    }

    fn current(&self) -> ReplaySnapshot {
        if let Some(ref path) = self.path {
            match read_snapshot(path) {
                Ok(snapshot) => self.set_snapshot(snapshot),
                Err(e) => tracing::warn!("keeping previous replay state: {e}"),
            }
        }
        lock(&self.snapshot).clone()
    }
}

impl PlatformSource for ReplaySource {
    fn tier(&self) -> PlatformTier {
        self.tier
    }

    fn permission_granted(&self) -> bool {
        self.current().permission_granted
    }

    fn all_cell_info(&self) -> Option<Vec<Option<RawCellReading>>> {
        self.current().cells
    }

    fn wifi_enabled(&self) -> bool {
        self.current().wifi_enabled
    }

    fn wifi_connection_info(&self) -> Option<RawWifiInfo> {
        self.current().wifi
    }

    fn max_wifi_level(&self) -> i32 {
        lock(&self.snapshot).max_wifi_level.unwrap_or(4)
    }

    fn request_wifi_network(&self, notifier: NotificationSender) {
        if !self.answer_requests.load(Ordering::SeqCst) {
            tracing::trace!("replay source ignoring wifi network request");
            return;
        }
        let snapshot = self.current();
        let notification = match snapshot.wifi {
            Some(info) if snapshot.wifi_enabled => {
                PlatformNotification::CapabilitiesChanged(Some(info))
            }
            _ => PlatformNotification::NetworkUnavailable,
        };
        let _ = notifier.send(notification);
    }

    fn register_listeners(&self, notifier: NotificationSender) {
        *lock(&self.listener) = Some(notifier);
    }

    fn unregister_listeners(&self) {
        lock(&self.listener).take();
    }
}

fn read_snapshot(path: &Path) -> Result<ReplaySnapshot, ReplayError> {
    let content = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ReplayError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
