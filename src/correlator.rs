//! Single-flight correlation of a query with the next platform notification.
//!
//! Used for WiFi queries on tiers where connection info only arrives through
//! an asynchronous capability notification. At most one request is pending;
//! a newer request fails the older one with [`SignalError::Overwritten`].
//!
//! There is no timeout. If the platform never answers, [`PendingQuery::wait`]
//! blocks until the correlator is resolved, superseded or cancelled.

use crate::error::{Result, SignalError};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::sync::Mutex;
use uuid::Uuid;

/// The request currently waiting for a notification.
struct PendingRequest<T> {
    id: Uuid,
    created_at: DateTime<Utc>,
    responder: Sender<Result<T>>,
}

impl<T> PendingRequest<T> {
    /// Deliver the outcome. The requester may have gone away; that is fine.
    fn complete(self, result: Result<T>) {
        let _ = self.responder.send(result);
    }
}

/// Caller-side handle of a pending request.
pub struct PendingQuery<T> {
    id: Uuid,
    receiver: Receiver<Result<T>>,
}

impl<T> PendingQuery<T> {
    /// A query that already has its outcome, for paths that bypass the
    /// correlator.
    pub(crate) fn ready(result: Result<T>) -> Self {
        let (sender, receiver) = bounded(1);
        let _ = sender.send(result);
        Self {
            id: Uuid::new_v4(),
            receiver,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Block until the request is resolved.
    pub fn wait(self) -> Result<T> {
        self.receiver.recv().unwrap_or(Err(SignalError::Cancelled))
    }

    /// Check for an outcome without blocking.
    pub fn try_wait(&self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SignalError::Cancelled)),
        }
    }
}

/// Holds zero or one pending request.
pub struct RequestCorrelator<T> {
    slot: Mutex<Option<PendingRequest<T>>>,
}

impl<T> RequestCorrelator<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Start a new request, failing any request already pending.
    pub fn begin(&self) -> PendingQuery<T> {
        self.begin_replacing().0
    }

    /// Like [`RequestCorrelator::begin`], also reporting whether a pending
    /// request was superseded.
    pub fn begin_replacing(&self) -> (PendingQuery<T>, bool) {
        let (responder, receiver) = bounded(1);
        let request = PendingRequest {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            responder,
        };
        let id = request.id;

        let superseded = self.lock().replace(request);
        let replaced = superseded.is_some();

        if let Some(old) = superseded {
            tracing::debug!(
                superseded = %old.id,
                by = %id,
                "pending request overwritten"
            );
            old.complete(Err(SignalError::Overwritten));
        } else {
            tracing::trace!(request = %id, "request pending");
        }

        (PendingQuery { id, receiver }, replaced)
    }

    /// Resolve the pending request, if any. The slot is cleared before the
    /// result is delivered. Returns whether a request was waiting.
    pub fn resolve(&self, result: Result<T>) -> bool {
        let pending = self.lock().take();
        match pending {
            Some(request) => {
                let waited = Utc::now() - request.created_at;
                tracing::debug!(
                    request = %request.id,
                    ok = result.is_ok(),
                    waited_ms = waited.num_milliseconds(),
                    "pending request resolved"
                );
                request.complete(result);
                true
            }
            None => {
                tracing::trace!("no pending request to resolve");
                false
            }
        }
    }

    /// Fail the pending request with [`SignalError::Cancelled`].
    pub fn cancel(&self) -> bool {
        self.resolve(Err(SignalError::Cancelled))
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    /// Id of the pending request, if any.
    pub fn pending_id(&self) -> Option<Uuid> {
        self.lock().as_ref().map(|r| r.id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PendingRequest<T>>> {
        // The slot is a plain Option; a panic while holding the lock cannot
        // leave it half-written.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Default for RequestCorrelator<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_resolve_delivers_once() {
        let correlator = RequestCorrelator::new();
        let query = correlator.begin();
        assert!(correlator.is_pending());
        assert_eq!(correlator.pending_id(), Some(query.id()));

        assert!(correlator.resolve(Ok(7)));
        assert!(!correlator.is_pending());
        assert!(!correlator.resolve(Ok(8)));

        assert_eq!(query.wait(), Ok(7));
    }

    #[test]
    fn test_newer_request_overwrites() {
        let correlator = RequestCorrelator::new();
        let first = correlator.begin();
        let second = correlator.begin();

        assert_eq!(first.try_wait(), Some(Err(SignalError::Overwritten)));
        assert_eq!(second.try_wait(), None);
        assert_eq!(correlator.pending_id(), Some(second.id()));

        correlator.resolve(Ok("fresh"));
        assert_eq!(second.wait(), Ok("fresh"));
    }

    #[test]
    fn test_begin_reports_supersession() {
        let correlator: RequestCorrelator<u8> = RequestCorrelator::new();
        let (first, replaced) = correlator.begin_replacing();
        assert!(!replaced);

        let (_second, replaced) = correlator.begin_replacing();
        assert!(replaced);
        assert_eq!(first.wait(), Err(SignalError::Overwritten));

        correlator.cancel();
        let (_third, replaced) = correlator.begin_replacing();
        assert!(!replaced);
    }

    #[test]
    fn test_error_result_is_delivered() {
        let correlator: RequestCorrelator<u8> = RequestCorrelator::new();
        let query = correlator.begin();
        correlator.resolve(Err(SignalError::SourceUnavailable("wifi info")));
        assert_eq!(
            query.wait(),
            Err(SignalError::SourceUnavailable("wifi info"))
        );
    }

    #[test]
    fn test_cancel_and_drop() {
        let correlator: RequestCorrelator<u8> = RequestCorrelator::new();
        assert!(!correlator.cancel());

        let query = correlator.begin();
        assert!(correlator.cancel());
        assert_eq!(query.wait(), Err(SignalError::Cancelled));

        let query = correlator.begin();
        drop(correlator);
        assert_eq!(query.wait(), Err(SignalError::Cancelled));
    }

    #[test]
    fn test_concurrent_begins_leave_one_pending() {
        let correlator = Arc::new(RequestCorrelator::<usize>::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = correlator.clone();
                thread::spawn(move || c.begin())
            })
            .collect();
        let queries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        correlator.resolve(Ok(1));

        let outcomes: Vec<_> = queries.into_iter().map(|q| q.wait()).collect();
        let resolved = outcomes.iter().filter(|r| r.is_ok()).count();
        let overwritten = outcomes
            .iter()
            .filter(|r| **r == Err(SignalError::Overwritten))
            .count();
        assert_eq!(resolved, 1);
        assert_eq!(overwritten, 7);
    }
}
