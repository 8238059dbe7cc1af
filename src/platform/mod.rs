//! Platform sources for the Radio Signal Agent.
//!
//! A platform source supplies raw cell and WiFi readings plus change
//! notifications. The native backend is picked per target OS; the replay
//! backend serves a JSON snapshot and works everywhere.

pub mod replay;
pub mod types;

#[cfg(target_os = "linux")]
pub mod sysfs;

#[cfg(not(target_os = "linux"))]
pub mod noop;

// Re-export commonly used types
pub use replay::{ReplayError, ReplaySnapshot, ReplaySource};
pub use types::{
    AcquisitionMode, NotificationSender, PlatformNotification, PlatformSource, PlatformTier,
    RawCellReading, RawCellSignal, RawStrength, RawWifiInfo,
};

#[cfg(target_os = "linux")]
pub use sysfs::SysfsSource;

/// Platform-agnostic native source type alias
#[cfg(target_os = "linux")]
pub type NativeSource = SysfsSource;

#[cfg(not(target_os = "linux"))]
pub use noop::NoopSource;

/// Platform-agnostic native source type alias
#[cfg(not(target_os = "linux"))]
pub type NativeSource = NoopSource;
