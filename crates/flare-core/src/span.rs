//! Span and transaction primitives.
//!
//! A [`Span`] is a cheaply cloneable handle to shared timing state. Wall-clock
//! timestamps come from [`chrono`]; elapsed time is measured against a
//! monotonic [`Instant`], so a finished span always carries an end time at or
//! after its start time regardless of clock adjustments.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Unique identifier assigned to a span at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(Uuid);

impl SpanId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.simple().fmt(f)
    }
}

/// Parameters for starting a top-level transaction.
#[derive(Debug, Clone)]
pub struct TransactionContext {
    name: String,
    op: String,
}

impl TransactionContext {
    /// Creates a transaction context with the given name and operation.
    pub fn new(name: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: op.into(),
        }
    }

    /// The transaction name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The operation tag.
    pub fn op(&self) -> &str {
        &self.op
    }
}

/// Parameters for starting a child span.
#[derive(Debug, Clone)]
pub struct SpanContext {
    op: String,
    description: Option<String>,
}

impl SpanContext {
    /// Creates a span context with the given operation.
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            description: None,
        }
    }

    /// Sets a human-readable description of the work the span measures.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The operation tag.
    pub fn op(&self) -> &str {
        &self.op
    }

    /// The description, if set.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A timed unit of work within a trace.
///
/// Handles are cheap to clone and share the same underlying state; finishing
/// any clone finishes them all. [`finish`](Span::finish) is idempotent: only
/// the first call records an end time.
#[derive(Debug, Clone)]
pub struct Span {
    inner: Arc<SpanInner>,
}

#[derive(Debug)]
struct SpanInner {
    id: SpanId,
    op: String,
    name: Option<String>,
    description: Option<String>,
    parent: Option<Span>,
    started_at: DateTime<Utc>,
    started: Instant,
    state: Mutex<SpanState>,
}

#[derive(Debug, Default)]
struct SpanState {
    tags: BTreeMap<String, String>,
    finished_at: Option<DateTime<Utc>>,
    duration: Option<Duration>,
}

impl Span {
    pub(crate) fn transaction(context: TransactionContext) -> Self {
        Self::start(context.op, Some(context.name), None, None)
    }

    fn start(
        op: String,
        name: Option<String>,
        description: Option<String>,
        parent: Option<Span>,
    ) -> Self {
        Self {
            inner: Arc::new(SpanInner {
                id: SpanId::new(),
                op,
                name,
                description,
                parent,
                started_at: Utc::now(),
                started: Instant::now(),
                state: Mutex::new(SpanState::default()),
            }),
        }
    }

    /// Starts a child span of this span.
    pub fn start_child(&self, context: SpanContext) -> Span {
        Span::start(context.op, None, context.description, Some(self.clone()))
    }

    /// The identifier assigned at start.
    pub fn id(&self) -> SpanId {
        self.inner.id
    }

    /// The operation tag given at start.
    pub fn op(&self) -> &str {
        &self.inner.op
    }

    /// The transaction name, present only on spans started as transactions.
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// The description given at start, if any.
    pub fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    /// The parent span, if this is a child span.
    pub fn parent(&self) -> Option<Span> {
        self.inner.parent.clone()
    }

    /// Whether this span is a top-level transaction.
    pub fn is_transaction(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// The wall-clock time the span was started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Sets a tag, replacing any previous value for the key.
    pub fn set_tag(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.state.lock().tags.insert(key.into(), value.into());
    }

    /// Sets several tags at once, each replacing any previous value.
    pub fn set_tags<K, V>(&self, tags: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut state = self.inner.state.lock();
        for (key, value) in tags {
            state.tags.insert(key.into(), value.into());
        }
    }

    /// The value of a tag, if set.
    pub fn tag(&self, key: &str) -> Option<String> {
        self.inner.state.lock().tags.get(key).cloned()
    }

    /// A snapshot of all tags on the span.
    pub fn tags(&self) -> BTreeMap<String, String> {
        self.inner.state.lock().tags.clone()
    }

    /// Finishes the span, recording its end time.
    ///
    /// Only the first call has an effect; later calls are no-ops.
    pub fn finish(&self) {
        let mut state = self.inner.state.lock();
        if state.finished_at.is_some() {
            return;
        }
        let elapsed = self.inner.started.elapsed();
        state.duration = Some(elapsed);
        state.finished_at = Some(end_timestamp(self.inner.started_at, elapsed));
    }

    /// Whether the span has been finished.
    pub fn is_finished(&self) -> bool {
        self.inner.state.lock().finished_at.is_some()
    }

    /// The wall-clock end time, once finished.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state.lock().finished_at
    }

    /// Time between start and finish, once finished.
    pub fn duration(&self) -> Option<Duration> {
        self.inner.state.lock().duration
    }
}

fn end_timestamp(started_at: DateTime<Utc>, elapsed: Duration) -> DateTime<Utc> {
    ChronoDuration::from_std(elapsed)
        .ok()
        .and_then(|delta| started_at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_transaction() -> Span {
        Span::transaction(TransactionContext::new("OrderPlaced", "messenger.handle"))
    }

    #[test]
    fn test_transaction_has_name_and_no_parent() {
        let span = create_test_transaction();

        assert!(span.is_transaction());
        assert_eq!(span.name(), Some("OrderPlaced"));
        assert_eq!(span.op(), "messenger.handle");
        assert!(span.parent().is_none());
        assert!(!span.is_finished());
    }

    #[test]
    fn test_child_links_to_parent() {
        let parent = create_test_transaction();
        let child = parent.start_child(
            SpanContext::new("http.client").with_description("GET https://example.com"),
        );

        assert!(!child.is_transaction());
        assert_eq!(child.op(), "http.client");
        assert_eq!(child.description(), Some("GET https://example.com"));
        assert_eq!(child.parent().map(|p| p.id()), Some(parent.id()));
        assert!(child.name().is_none());
    }

    #[test]
    fn test_finish_is_idempotent() {
        let span = create_test_transaction();

        span.finish();
        let first_end = span.finished_at();
        let first_duration = span.duration();
        assert!(first_end.is_some());

        span.finish();
        assert_eq!(span.finished_at(), first_end);
        assert_eq!(span.duration(), first_duration);
    }

    #[test]
    fn test_finish_through_clone_is_shared() {
        let span = create_test_transaction();
        let handle = span.clone();

        handle.finish();
        assert!(span.is_finished());
        assert_eq!(span.id(), handle.id());
    }

    #[test]
    fn test_end_time_not_before_start_time() {
        let span = create_test_transaction();
        std::thread::sleep(Duration::from_millis(5));
        span.finish();

        let finished_at = span.finished_at().unwrap();
        assert!(finished_at >= span.started_at());
        assert!(span.duration().unwrap() >= Duration::from_millis(5));
    }

    #[test]
    fn test_tags_last_write_wins() {
        let span = create_test_transaction();

        span.set_tag("messenger.message_bus", "commands");
        span.set_tag("messenger.message_bus", "events");

        assert_eq!(span.tag("messenger.message_bus"), Some("events".to_string()));
        assert_eq!(span.tags().len(), 1);
    }

    #[test]
    fn test_set_tags_bulk() {
        let span = create_test_transaction();

        span.set_tags([
            ("messenger.receiver_name", "async"),
            ("messenger.message_class", "OrderPlaced"),
        ]);

        assert_eq!(span.tag("messenger.receiver_name"), Some("async".to_string()));
        assert_eq!(
            span.tag("messenger.message_class"),
            Some("OrderPlaced".to_string())
        );
    }

    #[test]
    fn test_tags_mutable_after_finish() {
        let span = create_test_transaction();
        span.finish();
        span.set_tag("http.response.status_code", "200");

        assert_eq!(
            span.tag("http.response.status_code"),
            Some("200".to_string())
        );
    }
}
