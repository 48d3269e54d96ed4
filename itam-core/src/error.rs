use crate::id::RecordId;

/// Errors produced by the record store.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No record with the given identifier exists in the collection.
    #[error("{kind} not found")]
    NotFound {
        /// Human-readable resource label, e.g. `"Asset"`.
        kind: &'static str,
        /// The identifier that was looked up.
        id: RecordId,
    },

    /// A collection lock was poisoned by a panicking writer.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns `true` for the [`StoreError::NotFound`] variant.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
