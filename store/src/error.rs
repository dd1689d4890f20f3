use thiserror::Error;

/// Failures surfaced by any [`ArenaStore`](crate::ArenaStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The keyed row does not exist.
    #[error("no such record: {0}")]
    NotFound(String),

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("record encoding failed: {0}")]
    Serialization(String),

    /// A secondary index points at a row that is gone.
    #[error("inconsistent index: {0}")]
    Corruption(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
