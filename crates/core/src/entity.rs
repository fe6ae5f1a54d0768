//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Users, items, requests, bookings and comments are all entities: two values
/// with the same id denote the same thing even when their fields differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
