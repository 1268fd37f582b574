//! Stock error types.

use common::ProductId;
use thiserror::Error;

/// Errors that can occur when operating on the stock ledger.
#[derive(Debug, Clone, Error)]
pub enum StockError {
    /// Not enough available stock to cover a reservation.
    #[error(
        "insufficient stock for {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Attempted to release more than is currently reserved.
    #[error("over-release for {product_id}: requested {requested}, reserved {reserved}")]
    OverRelease {
        product_id: ProductId,
        requested: u32,
        reserved: u32,
    },

    /// Attempted to confirm more than is currently reserved.
    #[error("over-confirm for {product_id}: requested {requested}, reserved {reserved}")]
    OverConfirm {
        product_id: ProductId,
        requested: u32,
        reserved: u32,
    },

    /// Quantity was zero; every operation requires a positive quantity.
    #[error("invalid quantity: {quantity}")]
    InvalidQuantity { quantity: u32 },

    /// The record changed under an optimistic update. Transient: reload
    /// and retry.
    #[error(
        "concurrent modification of {product_id}: expected revision {expected}, found {actual}"
    )]
    ConcurrentModification {
        product_id: ProductId,
        expected: u64,
        actual: u64,
    },

    /// No stock record exists for the product.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// A stock record already exists for the product.
    #[error("product already registered: {0}")]
    ProductExists(ProductId),
}

/// Result type for stock operations.
pub type Result<T> = std::result::Result<T, StockError>;
