//! Contract between the hub and the host's reporting backend.

use crate::event::Event;
use std::time::Duration;

/// Sink for captured events.
///
/// Implementations own transport, buffering, and retry. The hub only hands
/// events over and asks for synchronous flushes; delivery failures stay
/// internal to the implementation and are never surfaced through the hub.
pub trait ReportingClient: Send + Sync {
    /// Accepts one captured event for delivery.
    fn capture_event(&self, event: Event);

    /// Blocks until buffered events are delivered or `timeout` elapses.
    ///
    /// `None` means wait without a deadline. Returns `true` when the buffer
    /// drained in time.
    fn flush(&self, timeout: Option<Duration>) -> bool;
}
