//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity** - they are defined entirely by their
//! attribute values. Two value objects with the same values are equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new instance; there are no setters.
///
/// In this domain:
/// - [`Money`](crate::Money) is a value object (amount + currency).
/// - [`Address`](crate::Address) is a value object owned by a seller and
///   replaced wholesale on update.
/// - `Seller`, `Product` and `Offer` are aggregates (they have identity).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
