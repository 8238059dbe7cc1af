//! Sample acquisition: push notifications or timer polling.
//!
//! The mode is picked once from the platform tier. Either way, readings go
//! through the same report builders and end up on the [`EventBus`].
//!
//! ```text
//!  platform ──notifications──▶ dispatcher thread ──▶ correlator (WiFi queries)
//!                                     │
//!  poll timer ──reads────────────────▶├──────────▶ event bus ──▶ subscriber
//! ```

use crate::bus::{Event, EventBus};
use crate::core::{build_wifi_report, select_primary, CellReport, DisconnectReason, WifiReport};
use crate::correlator::RequestCorrelator;
use crate::error::{Result, SignalError};
use crate::platform::types::{
    AcquisitionMode, NotificationSender, PlatformNotification, PlatformSource, PlatformTier,
    RawCellReading, RawWifiInfo,
};
use crate::stats::SharedStats;
use crossbeam_channel::{bounded, select, unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Poll cadence for tiers without push notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    /// Delay before the first read, kept short so a new subscriber gets data quickly
    pub initial_delay: Duration,
    /// Delay between subsequent reads
    pub interval: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(50),
            interval: Duration::from_secs(10),
        }
    }
}

/// Shared state every producer (query, dispatcher, poll timer) works on.
pub(crate) struct SignalContext {
    pub(crate) platform: Arc<dyn PlatformSource>,
    pub(crate) bus: Arc<EventBus>,
    pub(crate) correlator: RequestCorrelator<WifiReport>,
    pub(crate) stats: SharedStats,
    pub(crate) tier: PlatformTier,
    pub(crate) max_wifi_level: i32,
}

impl SignalContext {
    pub(crate) fn new(
        platform: Arc<dyn PlatformSource>,
        bus: Arc<EventBus>,
        stats: SharedStats,
        tier: Option<PlatformTier>,
        max_wifi_level: Option<i32>,
    ) -> Self {
        let tier = tier.unwrap_or_else(|| platform.tier());
        let max_wifi_level = max_wifi_level.unwrap_or_else(|| platform.max_wifi_level());
        Self {
            platform,
            bus,
            correlator: RequestCorrelator::new(),
            stats,
            tier,
            max_wifi_level,
        }
    }

    pub(crate) fn publish(&self, event: Event) {
        if self.bus.publish(event) {
            self.stats.record_event_published();
        }
    }

    /// Read all cells after checking permission.
    pub(crate) fn read_cell_report(&self) -> Result<CellReport> {
        if !self.platform.permission_granted() {
            tracing::warn!("location permission not granted");
            return Err(SignalError::PermissionDenied);
        }
        match self.platform.all_cell_info() {
            Some(readings) => Ok(select_primary(&readings, self.tier)),
            None => {
                tracing::warn!("failed to get cell info list");
                Err(SignalError::SourceUnavailable("cell info"))
            }
        }
    }

    /// Synchronous WiFi read for tiers that allow it.
    pub(crate) fn read_wifi_report(&self) -> WifiReport {
        let info = self.platform.wifi_connection_info();
        self.wifi_report(info.as_ref())
    }

    fn wifi_report(&self, info: Option<&RawWifiInfo>) -> WifiReport {
        build_wifi_report(
            self.platform.wifi_enabled(),
            info,
            self.tier,
            self.max_wifi_level,
        )
    }

    fn handle(&self, notification: PlatformNotification) {
        self.stats.record_notification();
        match notification {
            PlatformNotification::CellInfoChanged(readings) => self.cells_changed(&readings),
            PlatformNotification::SignalStrengthsChanged => self.refresh_cells(),
            PlatformNotification::NetworkAvailable => {
                tracing::debug!("wifi network available");
            }
            PlatformNotification::CapabilitiesChanged(info) => {
                tracing::debug!("wifi capabilities changed");
                let report = self.wifi_report(info.as_ref());
                self.correlator.resolve(Ok(report.clone()));
                self.publish(Event::WifiStateUpdated(report));
            }
            PlatformNotification::NetworkLost => {
                self.wifi_disconnected(DisconnectReason::LostConnection)
            }
            PlatformNotification::NetworkUnavailable => {
                self.wifi_disconnected(DisconnectReason::Unavailable)
            }
            PlatformNotification::WifiStateChanged { enabled } => {
                tracing::trace!(enabled, "wifi state changed");
                if !enabled {
                    self.wifi_disconnected(DisconnectReason::Disabled);
                }
            }
        }
    }

    fn cells_changed(&self, readings: &[Option<RawCellReading>]) {
        self.publish(Event::CellStateUpdated(select_primary(readings, self.tier)));
    }

    fn refresh_cells(&self) {
        match self.read_cell_report() {
            Ok(report) => self.publish(Event::CellStateUpdated(report)),
            Err(e) => tracing::warn!("cell refresh skipped: {e}"),
        }
    }

    fn wifi_disconnected(&self, reason: DisconnectReason) {
        tracing::debug!(?reason, "wifi disconnected");
        let report = WifiReport::disconnected(self.platform.wifi_enabled(), reason);
        self.correlator.resolve(Ok(report.clone()));
        self.publish(Event::WifiStateUpdated(report));
    }

    fn poll_wifi(&self) {
        tracing::trace!("polling wifi state");
        let report = self.read_wifi_report();
        self.publish(Event::WifiStateUpdated(report));
    }
}

struct PollTimer {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct ListenerState {
    registered: bool,
    poll: Option<PollTimer>,
}

/// Owns the notification dispatcher and the platform registrations.
pub struct AcquisitionShim {
    mode: AcquisitionMode,
    timing: PollTiming,
    context: Arc<SignalContext>,
    notifier: NotificationSender,
    dispatcher_stop: Option<Sender<()>>,
    dispatcher: Option<JoinHandle<()>>,
    listeners: Mutex<ListenerState>,
}

impl AcquisitionShim {
    /// Create the shim and start its notification dispatcher. Platform
    /// listeners are not registered until [`AcquisitionShim::start`].
    pub(crate) fn new(context: Arc<SignalContext>, timing: PollTiming) -> Self {
        let mode = context.tier.acquisition_mode();
        let (notifier, notifications) = unbounded();
        let (dispatcher_stop, stop_rx) = bounded(1);

        let ctx = context.clone();
        let dispatcher = thread::Builder::new()
            .name("signal-dispatcher".to_string())
            .spawn(move || run_dispatcher(ctx, notifications, stop_rx))
            .map_err(|e| tracing::error!("failed to spawn notification dispatcher: {e}"))
            .ok();

        tracing::debug!(?mode, "acquisition shim created");

        Self {
            mode,
            timing,
            context,
            notifier,
            dispatcher_stop: Some(dispatcher_stop),
            dispatcher,
            listeners: Mutex::new(ListenerState::default()),
        }
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    /// Sender the platform can push notifications into.
    pub fn notifier(&self) -> NotificationSender {
        self.notifier.clone()
    }

    /// Register platform listeners. Does nothing if already started.
    pub fn start(&self) {
        let mut state = self.lock();
        if state.registered {
            return;
        }

        let platform = &self.context.platform;
        platform.register_listeners(self.notifier());

        match self.mode {
            AcquisitionMode::Push => {
                platform.request_wifi_network(self.notifier());
                // The push channel may stay silent when starting with the
                // radio off, so report that state explicitly.
                if !platform.wifi_enabled() {
                    let _ = self
                        .notifier
                        .send(PlatformNotification::WifiStateChanged { enabled: false });
                }
            }
            AcquisitionMode::Poll => {
                state.poll = spawn_poll_timer(self.context.clone(), self.timing);
            }
        }

        state.registered = true;
        tracing::info!(mode = ?self.mode, "signal listeners registered");
    }

    /// Unregister platform listeners and stop polling. Safe to call any
    /// number of times, including before [`AcquisitionShim::start`].
    pub fn stop(&self) {
        let mut state = self.lock();
        if !state.registered {
            return;
        }

        self.context.platform.unregister_listeners();
        let timer = state.poll.take();
        state.registered = false;
        drop(state);

        if let Some(timer) = timer {
            let _ = timer.stop.send(());
            // A subscriber may unsubscribe from inside a poll-driven event.
            if timer.handle.thread().id() != thread::current().id() {
                let _ = timer.handle.join();
            }
        }

        tracing::info!("signal listeners unregistered");
    }

    pub fn is_started(&self) -> bool {
        self.lock().registered
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ListenerState> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for AcquisitionShim {
    fn drop(&mut self) {
        self.stop();
        self.dispatcher_stop.take();
        if let Some(handle) = self.dispatcher.take() {
            let _ = handle.join();
        }
        self.context.correlator.cancel();
    }
}

fn run_dispatcher(
    context: Arc<SignalContext>,
    notifications: Receiver<PlatformNotification>,
    stop: Receiver<()>,
) {
    loop {
        select! {
            recv(notifications) -> msg => match msg {
                Ok(notification) => context.handle(notification),
                Err(_) => break,
            },
            recv(stop) -> _ => break,
        }
    }
    tracing::debug!("notification dispatcher stopped");
}

fn spawn_poll_timer(context: Arc<SignalContext>, timing: PollTiming) -> Option<PollTimer> {
    let (stop, stop_rx) = bounded::<()>(1);
    let spawned = thread::Builder::new()
        .name("signal-poll".to_string())
        .spawn(move || {
            let mut delay = timing.initial_delay;
            loop {
                match stop_rx.recv_timeout(delay) {
                    Err(RecvTimeoutError::Timeout) => {
                        context.poll_wifi();
                        delay = timing.interval;
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

    match spawned {
        Ok(handle) => Some(PollTimer { stop, handle }),
        Err(e) => {
            tracing::error!("failed to spawn poll timer: {e}");
            None
        }
    }
}
