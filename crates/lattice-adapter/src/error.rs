//! Error types for the adapter engine.

use crate::model::ViewType;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the adapter engine.
///
/// A second registration under an occupied order key is not an error: the
/// call returns `false`. A dispatch stage that finds its row gone after a
/// listener mutated the list is not an error either: the pipeline reports
/// [`DispatchOutcome::Aborted`](crate::DispatchOutcome::Aborted).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Global position outside `[0, item_count)`.
    #[error("position {position} is out of range (item count {item_count})")]
    InvalidPosition { position: usize, item_count: usize },

    /// Identifier-based lookup on an item without a defined identifier.
    #[error("item has no identifier; identifier-based lookups need one")]
    MissingIdentifier,

    /// No prototype was registered for the view type.
    ///
    /// Every item that enters a sub-collection is registered first, so this
    /// only happens when a host asks for a view type no item ever had.
    #[error("no prototype registered for view type {0}")]
    TypeNotRegistered(ViewType),

    /// No sub-collection is registered under the order key.
    #[error("no sub-collection registered under order {0}")]
    UnknownOrder(i32),
}

impl Error {
    /// Create an invalid-position error.
    pub fn invalid_position(position: usize, item_count: usize) -> Self {
        Self::InvalidPosition {
            position,
            item_count,
        }
    }
}
