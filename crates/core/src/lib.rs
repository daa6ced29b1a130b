//! `antiwaste-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, typed identifiers, the aggregate execution contract and the
//! shared value objects (`Money`, `Address`).

pub mod address;
pub mod aggregate;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use address::Address;
pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, UserId};
pub use money::Money;
pub use value_object::ValueObject;
