//! Debounce with a maximum wait.
//!
//! A value is released once input has been quiet for `wait`, or once
//! `max_wait` has passed since the first unreleased push, whichever
//! comes first. Only the latest value is kept; earlier pending values
//! are superseded, never queued.
//!
//! ```text
//! push  a   b   c            d d d d d d d d d d d d ...
//!       |---|---|----wait--► fire(c)
//!                            |-------- max_wait --------► fire(latest d)
//! ```
//!
//! The debouncer owns no thread or task. The caller asks for
//! [`Debouncer::deadline`], sleeps until then, and calls
//! [`Debouncer::poll`].

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    wait: Duration,
    max_wait: Option<Duration>,
    pending: Option<T>,
    /// Time of the most recent push.
    last_push: Option<Instant>,
    /// Time of the first push since the last release.
    first_push: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration, max_wait: Option<Duration>) -> Self {
        Self {
            wait,
            max_wait: max_wait.map(|m| m.max(wait)),
            pending: None,
            last_push: None,
            first_push: None,
        }
    }

    /// Record a new value, superseding any pending one and restarting
    /// the quiet window.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.last_push = Some(now);
        if self.first_push.is_none() {
            self.first_push = Some(now);
        }
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        let quiet = self.last_push? + self.wait;
        match (self.max_wait, self.first_push) {
            (Some(max), Some(first)) => Some(quiet.min(first + max)),
            _ => Some(quiet),
        }
    }

    /// Release the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(due) if now >= due => self.flush(),
            _ => None,
        }
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.last_push = None;
        self.first_push = None;
        self.pending.take()
    }

    /// Drop the pending value without releasing it.
    pub fn cancel(&mut self) {
        self.flush();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }
}
