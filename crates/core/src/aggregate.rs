//! Contract shared by the Seller, Product and Offer aggregates.

use crate::error::DomainError;

/// Identity and version of an aggregate root.
pub trait AggregateRoot {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied since creation.
    ///
    /// Used as the envelope sequence number when events are published. Stores
    /// keep the latest snapshot as-is, so this is not a concurrency token.
    fn version(&self) -> u64;
}

/// Command handling split into a pure decision and a state fold.
///
/// `handle` validates a command against the current state and returns the
/// events it produces; `apply` folds one event into the state. Neither reads
/// the clock or performs IO: timestamps travel inside commands as
/// `occurred_at`.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;

    /// Fold one event into the state and bump `version()` by one.
    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, DomainError>;

    /// Handle then apply. On error the aggregate is left untouched.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, DomainError> {
        let events = self.handle(command)?;
        events.iter().for_each(|event| self.apply(event));
        Ok(events)
    }
}
