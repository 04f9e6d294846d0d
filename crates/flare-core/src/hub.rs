//! The hub: current-span holder, scope stack, and capture entry points.
//!
//! One hub serves one logical execution context, such as a worker processing
//! one message at a time or a single async task. Interior mutability makes
//! the handle shareable behind an [`Arc`], but the model stays cooperative:
//! lifecycle operations for the same context are not expected to race.

use crate::client::ReportingClient;
use crate::config::ReportingConfig;
use crate::event::{Breadcrumb, Event, EventId, Level};
use crate::scope::{Scope, ScopeGuard};
use crate::span::{Span, TransactionContext};
use chrono::Utc;
use parking_lot::Mutex;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Holder of the current span, the scope stack, and the reporting client.
pub struct Hub {
    scopes: Mutex<ScopeStack>,
    client: Option<Arc<dyn ReportingClient>>,
    config: ReportingConfig,
}

/// The active scope plus the scopes suspended beneath it. There is always an
/// active scope; unbalanced pops leave it untouched.
#[derive(Debug, Default)]
struct ScopeStack {
    active: Scope,
    suspended: Vec<Scope>,
}

impl ScopeStack {
    fn push(&mut self) {
        self.suspended.push(self.active.clone());
    }

    fn pop(&mut self) {
        if let Some(previous) = self.suspended.pop() {
            self.active = previous;
        }
    }
}

impl Hub {
    /// Creates a hub delivering events to `client`, with default reporting
    /// configuration.
    pub fn new(client: Arc<dyn ReportingClient>) -> Self {
        Self::with_config(Some(client), ReportingConfig::default())
    }

    /// Creates a hub with no reporting client.
    ///
    /// Spans, scopes, and breadcrumbs work as usual; captured events are
    /// dropped.
    pub fn without_client() -> Self {
        Self::with_config(None, ReportingConfig::default())
    }

    /// Creates a hub with explicit reporting configuration.
    pub fn with_config(client: Option<Arc<dyn ReportingClient>>, config: ReportingConfig) -> Self {
        Self {
            scopes: Mutex::new(ScopeStack::default()),
            client,
            config,
        }
    }

    /// The current span, if one is set on the active scope.
    pub fn span(&self) -> Option<Span> {
        self.scopes.lock().active.span()
    }

    /// Sets or clears the current span on the active scope.
    pub fn set_span(&self, span: Option<Span>) {
        self.scopes.lock().active.set_span(span);
    }

    /// Starts a new top-level transaction.
    ///
    /// The transaction is not made current automatically; call
    /// [`set_span`](Self::set_span) to attribute subsequent work to it.
    pub fn start_transaction(&self, context: TransactionContext) -> Span {
        Span::transaction(context)
    }

    /// Pushes an isolated scope, returning a guard that pops it on drop.
    ///
    /// The new scope starts as a clone of the active one, so existing tags,
    /// breadcrumbs, and the current span remain visible inside it.
    pub fn push_scope(&self) -> ScopeGuard<'_> {
        self.scopes.lock().push();
        ScopeGuard::new(self)
    }

    pub(crate) fn pop_scope(&self) {
        self.scopes.lock().pop();
    }

    /// Runs `callback` inside a pushed scope prepared by `configure`.
    ///
    /// The scope pops on every exit path, panics included.
    pub fn with_scope<C, F, R>(&self, configure: C, callback: F) -> R
    where
        C: FnOnce(&mut Scope),
        F: FnOnce() -> R,
    {
        let _guard = self.push_scope();
        self.configure_scope(configure);
        callback()
    }

    /// Gives `f` mutable access to the active scope.
    pub fn configure_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Scope) -> R,
    {
        f(&mut self.scopes.lock().active)
    }

    /// Records a breadcrumb on the active scope.
    ///
    /// The scope keeps at most the configured `max_breadcrumbs` entries,
    /// dropping the oldest first.
    pub fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
        let max = self.config.max_breadcrumbs;
        self.scopes.lock().active.add_breadcrumb(breadcrumb, max);
    }

    /// Captures an error as an event and hands it to the reporting client.
    ///
    /// The event snapshots the error's display message and `source()` chain
    /// together with the active scope's tags and breadcrumbs. Returns the id
    /// assigned to the event; without a configured client the event is
    /// dropped.
    pub fn capture_error(&self, error: &dyn Error) -> EventId {
        let event = self.build_event(error);
        let id = event.id;
        match &self.client {
            Some(client) => client.capture_event(event),
            None => {
                tracing::debug!(event_id = %id, "no reporting client configured, event dropped");
            }
        }
        id
    }

    /// The reporting client, if one is configured.
    pub fn client(&self) -> Option<Arc<dyn ReportingClient>> {
        self.client.clone()
    }

    /// Synchronously flushes the reporting client using the configured
    /// timeout.
    ///
    /// Returns `true` when everything pending went out, or when no client is
    /// configured.
    pub fn flush(&self) -> bool {
        let Some(client) = &self.client else {
            return true;
        };
        let flushed = client.flush(Some(self.config.flush_timeout));
        if !flushed {
            tracing::warn!(
                timeout_ms = self.config.flush_timeout.as_millis() as u64,
                "reporting client did not flush within the configured timeout"
            );
        }
        flushed
    }

    fn build_event(&self, error: &dyn Error) -> Event {
        let mut error_chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            error_chain.push(cause.to_string());
            source = cause.source();
        }

        let scopes = self.scopes.lock();
        Event {
            id: EventId::new(),
            timestamp: Utc::now(),
            level: Level::Error,
            message: error.to_string(),
            error_chain,
            tags: scopes.active.tags().clone(),
            breadcrumbs: scopes.active.breadcrumbs().cloned().collect(),
            environment: self.config.environment.clone(),
            release: self.config.release.clone(),
        }
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("has_client", &self.client.is_some())
            .finish_non_exhaustive()
    }
}
