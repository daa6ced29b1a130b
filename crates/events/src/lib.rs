//! Domain events and their distribution.
//!
//! Aggregates emit typed events (implementing [`Event`]); the lifecycle layer
//! wraps them in an [`EventEnvelope`] and hands them to an [`EventBus`] after
//! the aggregate state has been persisted.

pub mod bus;
pub mod envelope;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::{Event, EventEnvelope};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
