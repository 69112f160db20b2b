//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A `DocumentCounter` keeps its identity (the document type) across every
/// allocation and reset.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
