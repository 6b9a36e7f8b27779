//! Store error types.

/// Errors from connection store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Operation not allowed in the store's current lifecycle state
    #[error("invalid store state: {0}")]
    InvalidState(&'static str),
}
