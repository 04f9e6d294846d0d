//! Message envelopes and stamps.
//!
//! An [`Envelope`] carries one message together with the stamps middleware
//! attached on the way to the worker. Stamps are open-ended: any type
//! implementing [`Stamp`] can ride along, and consumers recover concrete
//! stamps by type with [`Envelope::last`].

use std::any::{Any, type_name};
use std::fmt;

/// Metadata attached to an envelope by dispatch or transport middleware.
///
/// The [`Any`] supertrait lets consumers recover concrete stamp types from
/// the type-erased collection on the envelope.
pub trait Stamp: Any + Send + Sync + fmt::Debug {}

/// Names the bus a message was dispatched through.
#[derive(Debug, Clone)]
pub struct BusNameStamp {
    bus_name: String,
}

impl BusNameStamp {
    /// Creates a stamp carrying the given bus name.
    pub fn new(bus_name: impl Into<String>) -> Self {
        Self {
            bus_name: bus_name.into(),
        }
    }

    /// The bus name.
    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }
}

impl Stamp for BusNameStamp {}

/// A message wrapped with its stamps.
pub struct Envelope {
    message_type: &'static str,
    message: Box<dyn Any + Send + Sync>,
    stamps: Vec<Box<dyn Stamp>>,
}

impl Envelope {
    /// Wraps a message in a new envelope with no stamps.
    pub fn new<M: Send + Sync + 'static>(message: M) -> Self {
        Self {
            message_type: type_name::<M>(),
            message: Box::new(message),
            stamps: Vec::new(),
        }
    }

    /// Attaches a stamp, keeping any stamps of the same type already present.
    #[must_use]
    pub fn with_stamp<S: Stamp>(mut self, stamp: S) -> Self {
        self.stamps.push(Box::new(stamp));
        self
    }

    /// The fully qualified type name of the wrapped message.
    pub fn message_type(&self) -> &'static str {
        self.message_type
    }

    /// The message type name without its module path or generic arguments.
    pub fn short_message_type(&self) -> &'static str {
        short_type_name(self.message_type)
    }

    /// The wrapped message, if it is of type `M`.
    pub fn message<M: Send + Sync + 'static>(&self) -> Option<&M> {
        self.message.downcast_ref::<M>()
    }

    /// The most recently attached stamp of type `S`, if any.
    pub fn last<S: Stamp>(&self) -> Option<&S> {
        self.stamps.iter().rev().find_map(|stamp| {
            let stamp: &dyn Any = &**stamp;
            stamp.downcast_ref::<S>()
        })
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("message_type", &self.message_type)
            .field("stamps", &self.stamps)
            .finish_non_exhaustive()
    }
}

/// Strips the module path and generic arguments from a type name.
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(index) => &base[index + 2..],
        None => base,
    }
}
