//! Identity for reference data that is stored and looked up by key.

/// Something with a stable, copyable identifier.
///
/// Implemented by catalog reference data (items, sellers, inventory records) so
/// in-memory stores can key them without knowing the concrete type.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// The identifier by value.
    fn key(&self) -> Self::Id {
        *self.id()
    }
}
