//! Core tracing and error-reporting model shared by the flare crates.
//!
//! This crate provides the span/transaction hierarchy, the scope stack, and
//! the [`Hub`] that ties them to a host-supplied [`ReportingClient`]. The
//! instrumentation crates (`flare-messenger`, `flare-http`) drive these
//! primitives; nothing here talks to a network.
//!
//! # Example
//!
//! ```
//! use flare_core::hub::Hub;
//! use flare_core::span::TransactionContext;
//!
//! let hub = Hub::without_client();
//! let transaction =
//!     hub.start_transaction(TransactionContext::new("OrderPlaced", "messenger.handle"));
//! hub.set_span(Some(transaction.clone()));
//!
//! transaction.set_tag("messenger.receiver_name", "async");
//! transaction.finish();
//! assert!(transaction.is_finished());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod event;
pub mod hub;
pub mod scope;
pub mod span;
#[cfg(any(test, feature = "testing"))]
pub mod test_support;

pub use client::ReportingClient;
pub use config::{Config, ConfigBuilder, HttpConfig, MessengerConfig, ReportingConfig};
pub use event::{Breadcrumb, Event, EventId, Level};
pub use hub::Hub;
pub use scope::{Scope, ScopeGuard};
pub use span::{Span, SpanContext, SpanId, TransactionContext};
