//! Quiet-period debouncing
//!
//! A `Debouncer` holds at most one pending event. Scheduling a new event
//! replaces the pending one and re-arms the deadline, so only the last event
//! of a burst is ever released. Time is passed in by the caller, which keeps
//! the debouncer deterministic in tests and lets the async driver use tokio's
//! clock.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet_period: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Replace any pending event with `event`, due one quiet period after `now`
    ///
    /// Returns true when a pending event was superseded.
    pub fn schedule(&mut self, event: T, now: Instant) -> bool {
        self.pending
            .replace((event, now + self.quiet_period))
            .is_some()
    }

    /// Release the pending event if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(event, _)| event),
            _ => None,
        }
    }

    /// Deadline of the pending event
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending event without releasing it
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(event, _)| event)
    }
}
