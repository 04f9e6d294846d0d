//! Worker lifecycle events.
//!
//! Transports emit one [`LifecycleEvent`] per stage of handling a message:
//! [`ReceivedEvent`] when the envelope is picked up, then exactly one of
//! [`HandledEvent`] or [`FailedEvent`].

use crate::envelope::Envelope;
use std::error::Error;
use std::slice;

/// Boxed error as handlers return it.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// What went wrong while handling a message.
///
/// Buses running several handlers for one message report every handler error
/// from the run as [`Composite`](HandlerFailure::Composite); a single failing
/// handler reports [`Single`](HandlerFailure::Single). The variant is part of
/// the contract so consumers never need to probe for a wrapper error type.
#[derive(Debug)]
pub enum HandlerFailure {
    /// One handler failed.
    Single(BoxError),
    /// Several handlers failed during the same run.
    Composite(Vec<BoxError>),
}

impl HandlerFailure {
    /// Iterates over every underlying handler error.
    ///
    /// Yields one error for [`Single`](Self::Single) and each collected error
    /// in order for [`Composite`](Self::Composite).
    pub fn causes(&self) -> impl Iterator<Item = &(dyn Error + 'static)> {
        fn as_dyn(error: &BoxError) -> &(dyn Error + 'static) {
            error.as_ref()
        }

        let errors = match self {
            Self::Single(error) => slice::from_ref(error),
            Self::Composite(errors) => errors.as_slice(),
        };
        errors.iter().map(as_dyn)
    }
}

impl<E: Error + Send + Sync + 'static> From<E> for HandlerFailure {
    fn from(error: E) -> Self {
        Self::Single(Box::new(error))
    }
}

/// An envelope was received from a transport and is about to be handled.
#[derive(Debug)]
pub struct ReceivedEvent {
    /// The received envelope.
    pub envelope: Envelope,
    /// Name of the receiver the envelope came in through.
    pub receiver_name: String,
}

/// An envelope was handled successfully.
#[derive(Debug)]
pub struct HandledEvent {
    /// The handled envelope.
    pub envelope: Envelope,
    /// Name of the receiver the envelope came in through.
    pub receiver_name: String,
}

/// Handling an envelope failed.
#[derive(Debug)]
pub struct FailedEvent {
    /// The envelope that failed.
    pub envelope: Envelope,
    /// Name of the receiver the envelope came in through.
    pub receiver_name: String,
    /// The handler error or errors.
    pub failure: HandlerFailure,
    /// Whether the transport will redeliver the envelope.
    pub will_retry: bool,
}

/// The stages of handling one envelope.
#[derive(Debug)]
pub enum LifecycleEvent {
    /// Envelope received, handling starts.
    Received(ReceivedEvent),
    /// Handling succeeded.
    Handled(HandledEvent),
    /// Handling failed.
    Failed(FailedEvent),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct HandlerError(&'static str);

    impl fmt::Display for HandlerError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl Error for HandlerError {}

    #[test]
    fn test_single_yields_one_cause() {
        let failure = HandlerFailure::from(HandlerError("invalid order total"));

        let messages: Vec<_> = failure.causes().map(|cause| cause.to_string()).collect();
        assert_eq!(messages, ["invalid order total"]);
    }

    #[test]
    fn test_composite_yields_causes_in_order() {
        let failure = HandlerFailure::Composite(vec![
            Box::new(HandlerError("invalid order total")),
            Box::new(HandlerError("inventory lookup failed")),
        ]);

        let messages: Vec<_> = failure.causes().map(|cause| cause.to_string()).collect();
        assert_eq!(messages, ["invalid order total", "inventory lookup failed"]);
    }

    #[test]
    fn test_empty_composite_yields_nothing() {
        let failure = HandlerFailure::Composite(Vec::new());
        assert_eq!(failure.causes().count(), 0);
    }
}
