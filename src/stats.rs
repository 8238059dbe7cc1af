//! Runtime counters for the agent.
//!
//! Tracks what the agent has served during this process. Nothing is written
//! to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters shared by the agent, the acquisition layer and the dispatcher.
#[derive(Debug)]
pub struct AgentStats {
    /// Cell queries answered (successfully or not)
    cell_queries: AtomicU64,
    /// WiFi queries answered (successfully or not)
    wifi_queries: AtomicU64,
    /// Events handed to a subscriber
    events_published: AtomicU64,
    /// Pending WiFi queries superseded by a newer one
    requests_overwritten: AtomicU64,
    /// Platform notifications handled
    notifications_handled: AtomicU64,
    started_at: DateTime<Utc>,
}

impl AgentStats {
    pub fn new() -> Self {
        Self {
            cell_queries: AtomicU64::new(0),
            wifi_queries: AtomicU64::new(0),
            events_published: AtomicU64::new(0),
            requests_overwritten: AtomicU64::new(0),
            notifications_handled: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    pub fn record_cell_query(&self) {
        self.cell_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_wifi_query(&self) {
        self.wifi_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_overwritten(&self) {
        self.requests_overwritten.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification(&self) {
        self.notifications_handled.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cell_queries: self.cell_queries.load(Ordering::Relaxed),
            wifi_queries: self.wifi_queries.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            requests_overwritten: self.requests_overwritten.load(Ordering::Relaxed),
            notifications_handled: self.notifications_handled.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Agent Statistics:\n\
             - Cell queries: {}\n\
             - WiFi queries: {}\n\
             - Events published: {}\n\
             - Requests overwritten: {}\n\
             - Notifications handled: {}\n\
             - Uptime: {} seconds",
            stats.cell_queries,
            stats.wifi_queries,
            stats.events_published,
            stats.requests_overwritten,
            stats.notifications_handled,
            stats.uptime_secs
        )
    }
}

impl Default for AgentStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`AgentStats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub cell_queries: u64,
    pub wifi_queries: u64,
    pub events_published: u64,
    pub requests_overwritten: u64,
    pub notifications_handled: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// Thread-safe shared statistics.
pub type SharedStats = Arc<AgentStats>;
