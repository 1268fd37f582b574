//! Per-product stock record.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StockError};

/// Authoritative counters for one product.
///
/// Invariant: `reserved <= on_hand` at all times, so
/// `available = on_hand - reserved` never underflows. The transition
/// methods reject anything that would break it; nothing else mutates the
/// counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// The product these counters belong to.
    product_id: ProductId,

    /// Physical units in stock.
    on_hand: u32,

    /// Units held by active reservations, not yet deducted.
    reserved: u32,

    /// Reorder is suggested once `on_hand` falls to this level.
    reorder_threshold: u32,

    /// Suggested quantity per reorder.
    reorder_batch_size: u32,

    /// Version counter for the optimistic (non-exclusive) update path.
    revision: u64,
}

impl StockRecord {
    /// Creates a record for a newly registered product with no
    /// outstanding reservations.
    pub fn new(
        product_id: impl Into<ProductId>,
        on_hand: u32,
        reorder_threshold: u32,
        reorder_batch_size: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            on_hand,
            reserved: 0,
            reorder_threshold,
            reorder_batch_size,
            revision: 0,
        }
    }

    /// Returns the product ID.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Returns the physical units in stock.
    pub fn on_hand(&self) -> u32 {
        self.on_hand
    }

    /// Returns the units held by reservations.
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    /// Returns the units free to reserve.
    pub fn available(&self) -> u32 {
        self.on_hand - self.reserved
    }

    /// Returns the reorder threshold.
    pub fn reorder_threshold(&self) -> u32 {
        self.reorder_threshold
    }

    /// Returns the reorder batch size.
    pub fn reorder_batch_size(&self) -> u32 {
        self.reorder_batch_size
    }

    /// Returns the current revision.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns true if stock has fallen to the reorder threshold.
    pub fn needs_reorder(&self) -> bool {
        self.on_hand <= self.reorder_threshold
    }

    /// Places a hold on `quantity` units.
    pub fn reserve(&mut self, quantity: u32) -> Result<()> {
        if quantity > self.available() {
            return Err(StockError::InsufficientStock {
                product_id: self.product_id.clone(),
                requested: quantity,
                available: self.available(),
            });
        }
        self.reserved += quantity;
        Ok(())
    }

    /// Returns `quantity` held units to available stock.
    pub fn release(&mut self, quantity: u32) -> Result<()> {
        if quantity > self.reserved {
            return Err(StockError::OverRelease {
                product_id: self.product_id.clone(),
                requested: quantity,
                reserved: self.reserved,
            });
        }
        self.reserved -= quantity;
        Ok(())
    }

    /// Converts `quantity` held units into a physical deduction.
    pub fn confirm(&mut self, quantity: u32) -> Result<()> {
        if quantity > self.reserved {
            return Err(StockError::OverConfirm {
                product_id: self.product_id.clone(),
                requested: quantity,
                reserved: self.reserved,
            });
        }
        self.reserved -= quantity;
        self.on_hand -= quantity;
        Ok(())
    }

    /// Adds received units to physical stock (administrative path).
    pub fn restock(&mut self, quantity: u32) {
        self.on_hand += quantity;
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }
}
