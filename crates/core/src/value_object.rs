//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Two `ReferenceNumber`s rendering the same string are the same number,
/// whichever counter produced them.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
