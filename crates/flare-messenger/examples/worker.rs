//! Runs two messages through the listener and prints what was captured.

use flare_core::Hub;
use flare_core::test_support::RecordingClient;
use flare_messenger::{
    BusNameStamp, Envelope, FailedEvent, HandledEvent, LifecycleEvent, ReceivedEvent,
    WorkerListener,
};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
#[error("payment gateway rejected the card")]
struct BrokenHandler;

struct OrderPlaced;
struct OrderCancelled;

fn main() {
    let client = Arc::new(RecordingClient::new());
    let hub = Arc::new(Hub::new(client.clone()));
    let listener = WorkerListener::with_defaults(hub.clone());

    listener.handle(&LifecycleEvent::Received(ReceivedEvent {
        envelope: Envelope::new(OrderPlaced).with_stamp(BusNameStamp::new("commands")),
        receiver_name: "async".to_string(),
    }));
    listener.handle(&LifecycleEvent::Handled(HandledEvent {
        envelope: Envelope::new(OrderPlaced),
        receiver_name: "async".to_string(),
    }));

    listener.handle(&LifecycleEvent::Received(ReceivedEvent {
        envelope: Envelope::new(OrderCancelled),
        receiver_name: "async".to_string(),
    }));
    listener.handle(&LifecycleEvent::Failed(FailedEvent {
        envelope: Envelope::new(OrderCancelled),
        receiver_name: "async".to_string(),
        failure: BrokenHandler.into(),
        will_retry: false,
    }));

    for event in client.events() {
        println!("captured {}: {}", event.id, event.message);
        for (key, value) in &event.tags {
            println!("  {key} = {value}");
        }
    }
}
