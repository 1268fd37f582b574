//! Shared types for the order/inventory fulfillment pipeline.
//!
//! This crate provides the identifier newtypes and the `Money` value type
//! used across the order and inventory components.

pub mod types;

pub use types::{EventId, Money, OrderId, OrderNumber, ProductId};
