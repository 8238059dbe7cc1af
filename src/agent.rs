//! Query surface of the Radio Signal Agent.
//!
//! [`SignalAgent`] answers cell and WiFi queries, feeds every successful
//! answer to the event subscriber, and manages the platform registrations
//! that keep the subscriber updated.

use crate::acquisition::{AcquisitionShim, PollTiming, SignalContext};
use crate::bus::{Event, EventBus};
use crate::config::Config;
use crate::core::{CellReport, WifiReport};
use crate::correlator::PendingQuery;
use crate::error::{Result, SignalError};
use crate::platform::{AcquisitionMode, NotificationSender, PlatformSource, PlatformTier};
use crate::pool::WorkerPool;
use crate::stats::{AgentStats, SharedStats};
use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Tunables for a [`SignalAgent`].
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub poll_timing: PollTiming,
    pub worker_threads: usize,
    pub tier: Option<PlatformTier>,
    pub max_wifi_level: Option<i32>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AgentOptions {
    fn from(config: &Config) -> Self {
        Self {
            poll_timing: config.poll_timing(),
            worker_threads: config.worker_threads,
            tier: config.tier,
            max_wifi_level: config.max_wifi_level,
        }
    }
}

/// Query paths shared with worker-pool jobs.
struct QueryCore {
    context: Arc<SignalContext>,
    mode: AcquisitionMode,
    notifier: NotificationSender,
    closing: AtomicBool,
}

impl QueryCore {
    fn get_cell_report(&self) -> Result<CellReport> {
        tracing::trace!("get_cell_report()");
        self.context.stats.record_cell_query();
        let report = self.context.read_cell_report()?;
        self.context
            .publish(Event::CellStateUpdated(report.clone()));
        Ok(report)
    }

    fn begin_wifi_query(&self) -> PendingQuery<WifiReport> {
        tracing::trace!("begin_wifi_query()");
        self.context.stats.record_wifi_query();

        if self.closing.load(Ordering::SeqCst) {
            return PendingQuery::ready(Err(SignalError::Cancelled));
        }

        match self.mode {
            AcquisitionMode::Poll => {
                let report = self.context.read_wifi_report();
                self.context
                    .publish(Event::WifiStateUpdated(report.clone()));
                PendingQuery::ready(Ok(report))
            }
            AcquisitionMode::Push => {
                let (query, replaced) = self.context.correlator.begin_replacing();
                if replaced {
                    self.context.stats.record_request_overwritten();
                }
                if self.closing.load(Ordering::SeqCst) {
                    self.context.correlator.cancel();
                } else {
                    self.context
                        .platform
                        .request_wifi_network(self.notifier.clone());
                }
                query
            }
        }
    }

    fn get_wifi_report(&self) -> Result<WifiReport> {
        self.begin_wifi_query().wait()
    }
}

/// Cellular and WiFi telemetry agent.
pub struct SignalAgent {
    core: Arc<QueryCore>,
    shim: AcquisitionShim,
    pool: WorkerPool,
}

impl SignalAgent {
    pub fn new(platform: Arc<dyn PlatformSource>, options: AgentOptions) -> Self {
        let stats: SharedStats = Arc::new(AgentStats::new());
        let context = Arc::new(SignalContext::new(
            platform,
            Arc::new(EventBus::new()),
            stats,
            options.tier,
            options.max_wifi_level,
        ));
        let shim = AcquisitionShim::new(context.clone(), options.poll_timing);

        tracing::info!(
            tier = ?context.tier,
            mode = ?shim.mode(),
            "signal agent ready"
        );

        let core = Arc::new(QueryCore {
            context,
            mode: shim.mode(),
            notifier: shim.notifier(),
            closing: AtomicBool::new(false),
        });

        Self {
            core,
            shim,
            pool: WorkerPool::new(options.worker_threads),
        }
    }

    pub fn tier(&self) -> PlatformTier {
        self.core.context.tier
    }

    pub fn acquisition_mode(&self) -> AcquisitionMode {
        self.core.mode
    }

    pub fn stats(&self) -> SharedStats {
        self.core.context.stats.clone()
    }

    /// Read the current cell state.
    ///
    /// Fails with `PermissionDenied` when the location permission is missing
    /// and `SourceUnavailable` when the platform returns no cell list.
    pub fn get_cell_report(&self) -> Result<CellReport> {
        self.core.get_cell_report()
    }

    /// Legacy name for [`SignalAgent::get_cell_report`].
    #[deprecated(note = "use get_cell_report() instead")]
    pub fn get_dbm(&self) -> Result<CellReport> {
        self.get_cell_report()
    }

    /// Read the current WiFi state, blocking until it is available.
    ///
    /// On push tiers this waits for the platform's next capability
    /// notification with no timeout; a newer query makes this one fail with
    /// `Overwritten`.
    pub fn get_wifi_report(&self) -> Result<WifiReport> {
        self.core.get_wifi_report()
    }

    /// Start a WiFi query without blocking.
    ///
    /// On polling tiers the returned query is already resolved.
    pub fn begin_wifi_query(&self) -> PendingQuery<WifiReport> {
        self.core.begin_wifi_query()
    }

    /// Run [`SignalAgent::get_cell_report`] on the worker pool.
    pub fn request_cell_report<F>(&self, callback: F)
    where
        F: FnOnce(Result<CellReport>) + Send + 'static,
    {
        let core = self.core.clone();
        self.pool.execute(move || callback(core.get_cell_report()));
    }

    /// Run [`SignalAgent::get_wifi_report`] on the worker pool.
    pub fn request_wifi_report<F>(&self, callback: F)
    where
        F: FnOnce(Result<WifiReport>) + Send + 'static,
    {
        let core = self.core.clone();
        self.pool.execute(move || callback(core.get_wifi_report()));
    }

    /// Install the event handler (replacing any previous one) and register
    /// for platform updates.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(Event) + Send + Sync + 'static,
    {
        self.core.context.bus.subscribe(handler);
        self.shim.start();
    }

    /// Like [`SignalAgent::subscribe`], delivering events into a channel.
    pub fn subscribe_channel(&self) -> Receiver<Event> {
        let receiver = self.core.context.bus.subscribe_channel();
        self.shim.start();
        receiver
    }

    /// Stop platform updates and remove the handler. Safe to call at any time.
    pub fn unsubscribe(&self) {
        self.shim.stop();
        self.core.context.bus.unsubscribe();
    }

    pub fn is_subscribed(&self) -> bool {
        self.core.context.bus.has_subscriber()
    }

    /// Whether platform listeners are currently registered.
    pub fn is_listening(&self) -> bool {
        self.shim.is_started()
    }

    /// Stop everything and fail any pending WiFi query with `Cancelled`.
    pub fn shutdown(&self) {
        if self.core.closing.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("signal agent shutting down");
        self.unsubscribe();
        self.core.context.correlator.cancel();
    }
}

impl Drop for SignalAgent {
    fn drop(&mut self) {
        self.shutdown();
    }
}
