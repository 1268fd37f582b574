//! Client error types.

use stock::StockError;
use thiserror::Error;

/// Errors returned by an [`InventoryClient`](crate::InventoryClient).
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// A definite business-rule failure from the reservation engine.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Degraded-mode sentinel: the downstream could not be reached and
    /// no effect occurred. Callers must fail closed, never assume the
    /// operation happened.
    #[error("downstream unavailable: {reason}")]
    DownstreamUnavailable { reason: String },
}

impl ClientError {
    /// Builds the degraded-mode sentinel.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ClientError::DownstreamUnavailable {
            reason: reason.into(),
        }
    }

    /// Returns true if this is the degraded-mode sentinel.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClientError::DownstreamUnavailable { .. })
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
