//! Stock ledger and reservation engine.
//!
//! This crate is the inventory side of the fulfillment pipeline:
//! - [`StockRecord`] holds the per-product counters and enforces the
//!   `reserved <= on_hand` invariant;
//! - [`StockLedger`] is the authority over those records, providing the
//!   per-product exclusive hold and the optimistic revision check;
//! - [`ReservationEngine`] exposes the reserve/release/confirm protocol;
//! - [`InventoryEventListener`] reacts to order lifecycle events.

pub mod engine;
pub mod error;
pub mod ledger;
pub mod listener;
pub mod record;

pub use engine::{ReservationEngine, ReservationRequest};
pub use error::{Result, StockError};
pub use ledger::{ExclusiveHold, StockLedger};
pub use listener::InventoryEventListener;
pub use record::StockRecord;
