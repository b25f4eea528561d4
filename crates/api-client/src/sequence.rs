//! Last-request-wins sequencing for overlapping queries
//!
//! Each position update takes a [`RequestTicket`]. When responses come back
//! out of order, only the holder of the latest ticket may publish its result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Sequence number handed out for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// Issues tickets and holds the result of the most recent request
#[derive(Debug)]
pub struct RequestSequencer<T> {
    issued: AtomicU64,
    latest: Mutex<Option<(RequestTicket, T)>>,
}

impl<T> Default for RequestSequencer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestSequencer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// Issue a ticket newer than every ticket issued before it
    pub fn next(&self) -> RequestTicket {
        RequestTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True only for the most recently issued ticket
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Store `value` if `ticket` is still current; returns whether it was applied
    pub fn try_complete(&self, ticket: RequestTicket, value: T) -> bool {
        self.try_complete_with(ticket, value, |_| {})
    }

    /// Like [`RequestSequencer::try_complete`], then runs `publish` on the
    /// stored value before the slot is released.
    ///
    /// A newer completion blocks until `publish` returns, so whatever
    /// `publish` emits is never followed by output for an older ticket.
    pub fn try_complete_with(&self, ticket: RequestTicket, value: T, publish: impl FnOnce(&T)) -> bool {
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        if !self.is_current(ticket) {
            return false;
        }
        let (_, stored) = latest.insert((ticket, value));
        publish(stored);
        true
    }

    /// Take the most recently applied result, if any
    pub fn take_latest(&self) -> Option<(RequestTicket, T)> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

impl<T: Clone> RequestSequencer<T> {
    /// Clone of the most recently applied result
    pub fn latest(&self) -> Option<(RequestTicket, T)> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
