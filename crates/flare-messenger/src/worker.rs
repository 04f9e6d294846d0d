//! The worker listener bridging lifecycle events to the hub.

use crate::event::{FailedEvent, HandledEvent, LifecycleEvent, ReceivedEvent};
use crate::memory;
use crate::tags::envelope_tags;
use flare_core::{Breadcrumb, Hub, MessengerConfig, SpanContext, TransactionContext};
use std::sync::Arc;

/// Operation tag recorded on message-handling spans.
pub const HANDLE_OPERATION: &str = "messenger.handle";

const BREADCRUMB_CATEGORY: &str = "rust";

/// Turns worker lifecycle events into spans, breadcrumbs, and captures.
///
/// One listener serves one worker. Each received envelope opens a span that
/// is made current on the hub; the matching handled or failed event finishes
/// it and restores the previous current span.
pub struct WorkerListener {
    hub: Arc<Hub>,
    capture_soft_fails: bool,
}

impl WorkerListener {
    /// Creates a listener reporting to `hub`.
    pub fn new(hub: Arc<Hub>, config: MessengerConfig) -> Self {
        Self {
            hub,
            capture_soft_fails: config.capture_soft_fails,
        }
    }

    /// Creates a listener with default messenger configuration.
    pub fn with_defaults(hub: Arc<Hub>) -> Self {
        Self::new(hub, MessengerConfig::default())
    }

    /// Dispatches one lifecycle event to the matching handler.
    pub fn handle(&self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::Received(event) => self.on_received(event),
            LifecycleEvent::Handled(event) => self.on_handled(event),
            LifecycleEvent::Failed(event) => self.on_failed(event),
        }
    }

    /// Opens a span for the received envelope and makes it current.
    ///
    /// Without a current span this starts a transaction named after the short
    /// message type. Beneath an existing span it starts a child instead,
    /// described by the fully qualified message type.
    pub fn on_received(&self, event: &ReceivedEvent) {
        let span = match self.hub.span() {
            None => self.hub.start_transaction(TransactionContext::new(
                event.envelope.short_message_type(),
                HANDLE_OPERATION,
            )),
            Some(current) => current.start_child(
                SpanContext::new(HANDLE_OPERATION)
                    .with_description(format!("Message: {}", event.envelope.message_type())),
            ),
        };
        span.set_tags(envelope_tags(&event.envelope, &event.receiver_name));
        self.hub.set_span(Some(span));
    }

    /// Records a success breadcrumb and finishes the current span.
    pub fn on_handled(&self, event: &HandledEvent) {
        tracing::debug!(
            message_type = event.envelope.message_type(),
            receiver = %event.receiver_name,
            "message handled"
        );
        self.hub.add_breadcrumb(handled_breadcrumb());
        self.finish_current_span();
    }

    /// Captures the failure and finishes the current span.
    ///
    /// Failures of envelopes the transport will redeliver are not captured
    /// unless `capture_soft_fails` is enabled. The span finishes either way,
    /// so a suppressed failure never leaks a current span.
    pub fn on_failed(&self, event: &FailedEvent) {
        if self.capture_soft_fails || !event.will_retry {
            self.capture(event);
            self.hub.flush();
        } else {
            tracing::debug!(
                message_type = event.envelope.message_type(),
                receiver = %event.receiver_name,
                "failure will be retried, capture skipped"
            );
        }
        self.finish_current_span();
    }

    fn capture(&self, event: &FailedEvent) {
        self.hub.with_scope(
            |scope| {
                for (key, value) in envelope_tags(&event.envelope, &event.receiver_name) {
                    scope.set_tag(key, value);
                }
            },
            || {
                for cause in event.failure.causes() {
                    self.hub.capture_error(cause);
                }
            },
        );
    }

    fn finish_current_span(&self) {
        if let Some(span) = self.hub.span() {
            span.finish();
            self.hub.set_span(span.parent());
        }
    }
}

fn handled_breadcrumb() -> Breadcrumb {
    let mut breadcrumb = Breadcrumb::new(BREADCRUMB_CATEGORY);
    if let Some(usage) = memory::sample() {
        breadcrumb = breadcrumb
            .with_data("memory_current_bytes", usage.current_bytes)
            .with_data("memory_peak_bytes", usage.peak_bytes);
    }
    breadcrumb
}
