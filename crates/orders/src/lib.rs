//! Order lifecycle for the fulfillment pipeline.
//!
//! This crate owns the order aggregate and its state machine, and drives
//! the creation flow: synchronous stock reservation per line with
//! best-effort compensation on partial failure, then lifecycle events
//! onto the channel as the order moves through its states.

pub mod error;
pub mod order;
pub mod repository;
pub mod service;
pub mod state;

pub use error::{OrderError, Result};
pub use order::{Order, OrderItem};
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::OrderService;
pub use state::OrderStatus;
