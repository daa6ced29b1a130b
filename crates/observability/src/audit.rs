//! Audit log of published domain events.
//!
//! Every envelope that reaches the bus is written to the log at `info` with
//! its stream metadata, giving an operator-visible trail of seller, product
//! and offer changes.

use std::thread::JoinHandle;

use serde_json::Value as JsonValue;

use antiwaste_events::{EventEnvelope, Subscription};

/// Consume `subscription` on a dedicated thread until the bus is dropped.
pub fn spawn_audit_log(
    subscription: Subscription<EventEnvelope<JsonValue>>,
) -> std::io::Result<JoinHandle<usize>> {
    std::thread::Builder::new()
        .name("event-audit".to_string())
        .spawn(move || {
            let mut seen = 0;
            while let Ok(envelope) = subscription.recv() {
                record(&envelope);
                seen += 1;
            }
            tracing::debug!(seen, "event audit log stopped");
            seen
        })
}

fn record(envelope: &EventEnvelope<JsonValue>) {
    tracing::info!(
        event_id = %envelope.event_id(),
        event_type = envelope.event_type(),
        aggregate_type = envelope.aggregate_type(),
        aggregate_id = %envelope.aggregate_id(),
        sequence_number = envelope.sequence_number(),
        occurred_at = %envelope.occurred_at(),
        "domain event"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use antiwaste_core::AggregateId;
    use antiwaste_events::{EventBus, InMemoryEventBus};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn audit_thread_drains_bus_and_stops_when_bus_is_dropped() {
        let bus: InMemoryEventBus<EventEnvelope<JsonValue>> = InMemoryEventBus::new();
        let handle = spawn_audit_log(bus.subscribe()).unwrap();

        for seq in 1..=3 {
            bus.publish(EventEnvelope::new(
                Uuid::now_v7(),
                AggregateId::new(),
                "offers.offer",
                seq,
                "offers.offer.submitted",
                Utc::now(),
                JsonValue::Null,
            ))
            .unwrap();
        }
        drop(bus);

        assert_eq!(handle.join().unwrap(), 3);
    }
}
