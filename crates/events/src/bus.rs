//! Publish/subscribe seam between the lifecycle service and event consumers.
//!
//! Consumers today are the API's audit log and the service tests. Delivery is
//! best-effort: aggregates are saved before their events go out, and the
//! repositories stay the source of truth.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvError, TryRecvError};

/// Receiving end handed out by [`EventBus::subscribe`].
///
/// Sees every message published after it was created. Once the bus is
/// dropped, `recv` returns an error and consumers stop.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message, or fail once the bus is gone.
    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    /// Drain without blocking; tests use this to collect what was published.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }
}

/// Broadcast bus for event envelopes.
///
/// ```text
/// Marketplace use case → repository.add/update → bus.publish(envelope) → subscriptions
/// ```
///
/// The lifecycle layer logs a failed `publish` at `warn` and carries on.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
