//! Test doubles for the reporting client.
//!
//! Available to dependent crates through the `testing` feature.

use crate::client::ReportingClient;
use crate::event::Event;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// A [`ReportingClient`] that records captured events and flushes in memory.
#[derive(Debug, Default)]
pub struct RecordingClient {
    events: Mutex<Vec<Event>>,
    flush_calls: Mutex<Vec<Option<Duration>>>,
    flush_failure: AtomicBool,
}

impl RecordingClient {
    /// Creates a new recording client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes all subsequent [`flush`](ReportingClient::flush) calls report failure.
    pub fn fail_flushes(&self) {
        self.flush_failure.store(true, Ordering::SeqCst);
    }

    /// Returns a copy of every event captured so far, in capture order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Returns how many events have been captured.
    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns how many times [`flush`](ReportingClient::flush) was called.
    pub fn flush_count(&self) -> usize {
        self.flush_calls.lock().len()
    }

    /// Returns the timeout passed to each flush call, in call order.
    pub fn flush_timeouts(&self) -> Vec<Option<Duration>> {
        self.flush_calls.lock().clone()
    }
}

impl ReportingClient for RecordingClient {
    fn capture_event(&self, event: Event) {
        self.events.lock().push(event);
    }

    fn flush(&self, timeout: Option<Duration>) -> bool {
        self.flush_calls.lock().push(timeout);
        !self.flush_failure.load(Ordering::SeqCst)
    }
}
