//! Value object trait: equality by value, not identity.
//!
//! Locations, equipment types and statuses are value objects: two `Location`s
//! spelled the same are the same location.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "change" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
