//! Tag keys recorded on spans and capture scopes for message handling.

use crate::envelope::{BusNameStamp, Envelope};

/// Tag key for the receiver an envelope came in through.
pub const RECEIVER_NAME: &str = "messenger.receiver_name";

/// Tag key for the fully qualified message type.
pub const MESSAGE_CLASS: &str = "messenger.message_class";

/// Tag key for the bus a message was dispatched through.
pub const MESSAGE_BUS: &str = "messenger.message_bus";

/// Builds the tag set describing an envelope.
///
/// Receiver and message class are always present; the bus tag is added only
/// when the envelope carries a [`BusNameStamp`].
pub fn envelope_tags(envelope: &Envelope, receiver_name: &str) -> Vec<(&'static str, String)> {
    let mut tags = vec![
        (RECEIVER_NAME, receiver_name.to_owned()),
        (MESSAGE_CLASS, envelope.message_type().to_owned()),
    ];
    if let Some(stamp) = envelope.last::<BusNameStamp>() {
        tags.push((MESSAGE_BUS, stamp.bus_name().to_owned()));
    }
    tags
}
