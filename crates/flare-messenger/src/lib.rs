//! Message lifecycle instrumentation.
//!
//! [`WorkerListener`] turns the lifecycle events of a message worker into
//! spans, breadcrumbs, and captured failures on a [`flare_core::Hub`]:
//!
//! ```
//! use flare_core::Hub;
//! use flare_messenger::{Envelope, LifecycleEvent, ReceivedEvent, WorkerListener};
//! use std::sync::Arc;
//!
//! struct OrderPlaced;
//!
//! let hub = Arc::new(Hub::without_client());
//! let listener = WorkerListener::with_defaults(hub.clone());
//!
//! listener.handle(&LifecycleEvent::Received(ReceivedEvent {
//!     envelope: Envelope::new(OrderPlaced),
//!     receiver_name: "async".to_string(),
//! }));
//!
//! assert!(hub.span().is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod envelope;
pub mod event;
pub mod memory;
pub mod tags;
pub mod worker;

pub use envelope::{BusNameStamp, Envelope, Stamp};
pub use event::{
    BoxError, FailedEvent, HandledEvent, HandlerFailure, LifecycleEvent, ReceivedEvent,
};
pub use worker::{HANDLE_OPERATION, WorkerListener};
