//! Order error types.

use channel::ChannelError;
use client::ClientError;
use common::{OrderId, ProductId};
use thiserror::Error;

use crate::state::OrderStatus;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order creation requires at least one item.
    #[error("order has no items")]
    EmptyOrder,

    /// An item carried a zero quantity.
    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity {
        product_id: ProductId,
        quantity: u32,
    },

    /// The requested transition is not legal from the current state.
    /// The order is left unchanged.
    #[error("cannot {action} an order in {from} state")]
    IllegalTransition {
        from: OrderStatus,
        action: &'static str,
    },

    /// No order exists with the given ID.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// An order with the given ID already exists.
    #[error("order already exists: {0}")]
    AlreadyExists(OrderId),

    /// Stock reservation failed; order creation did not proceed.
    #[error("reservation failed: {0}")]
    Reservation(#[from] ClientError),

    /// Publishing a lifecycle event failed.
    #[error("event channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Result type for order operations.
pub type Result<T> = std::result::Result<T, OrderError>;
