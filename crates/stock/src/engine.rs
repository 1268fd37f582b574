//! The reserve/release/confirm protocol over the stock ledger.

use common::{OrderNumber, ProductId};

use crate::error::{Result, StockError};
use crate::ledger::StockLedger;
use crate::record::StockRecord;

/// Input contract for the three reservation operations.
///
/// Ephemeral value; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    /// The product the operation targets.
    pub product_id: ProductId,
    /// Units to reserve, release, or confirm. Must be positive.
    pub quantity: u32,
    /// The order this operation is on behalf of.
    pub order_reference: OrderNumber,
}

impl ReservationRequest {
    /// Creates a new reservation request.
    pub fn new(
        product_id: impl Into<ProductId>,
        quantity: u32,
        order_reference: OrderNumber,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            order_reference,
        }
    }
}

/// Enforces the reservation state transitions over the ledger.
///
/// Each operation is atomic per product: it runs read-check-mutate-write
/// under that product's exclusive hold and nothing else. A multi-line
/// order is one call per line; compensating for partial failure is the
/// caller's job.
#[derive(Clone)]
pub struct ReservationEngine {
    ledger: StockLedger,
}

impl ReservationEngine {
    /// Creates an engine over the given ledger.
    pub fn new(ledger: StockLedger) -> Self {
        Self { ledger }
    }

    /// Returns the underlying ledger.
    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    /// Places a hold on stock for an order line.
    ///
    /// Fails with `InsufficientStock` without mutating anything if the
    /// available quantity does not cover the request.
    #[tracing::instrument(skip(self, req), fields(product = %req.product_id, order = %req.order_reference, quantity = req.quantity))]
    pub async fn reserve(&self, req: &ReservationRequest) -> Result<StockRecord> {
        Self::require_positive(req.quantity)?;

        let mut hold = self.ledger.load_for_update(&req.product_id).await?;
        hold.reserve(req.quantity)?;
        let record = self.ledger.commit(hold);

        metrics::counter!("stock_reserved_total").increment(u64::from(req.quantity));
        tracing::debug!(available = record.available(), "stock reserved");
        Ok(record)
    }

    /// Returns a held quantity to available stock.
    #[tracing::instrument(skip(self, req), fields(product = %req.product_id, order = %req.order_reference, quantity = req.quantity))]
    pub async fn release(&self, req: &ReservationRequest) -> Result<StockRecord> {
        Self::require_positive(req.quantity)?;

        let mut hold = self.ledger.load_for_update(&req.product_id).await?;
        hold.release(req.quantity)?;
        let record = self.ledger.commit(hold);

        metrics::counter!("stock_released_total").increment(u64::from(req.quantity));
        tracing::debug!(available = record.available(), "reservation released");
        Ok(record)
    }

    /// Converts a held quantity into a physical deduction.
    #[tracing::instrument(skip(self, req), fields(product = %req.product_id, order = %req.order_reference, quantity = req.quantity))]
    pub async fn confirm(&self, req: &ReservationRequest) -> Result<StockRecord> {
        Self::require_positive(req.quantity)?;

        let mut hold = self.ledger.load_for_update(&req.product_id).await?;
        hold.confirm(req.quantity)?;
        let record = self.ledger.commit(hold);

        metrics::counter!("stock_confirmed_total").increment(u64::from(req.quantity));
        tracing::debug!(on_hand = record.on_hand(), "reservation confirmed");
        Ok(record)
    }

    /// Returns whether `quantity` units are available for the product.
    ///
    /// Always answerable: an unknown product reports not available.
    pub async fn check_stock(&self, product_id: &ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        match self.ledger.load(product_id).await {
            Ok(record) => record.available() >= quantity,
            Err(_) => false,
        }
    }

    /// Returns the quantity currently free to reserve.
    pub async fn available_quantity(&self, product_id: &ProductId) -> Result<u32> {
        Ok(self.ledger.load(product_id).await?.available())
    }

    /// Returns true if the product has fallen to its reorder threshold.
    pub async fn needs_reorder(&self, product_id: &ProductId) -> Result<bool> {
        Ok(self.ledger.load(product_id).await?.needs_reorder())
    }

    /// Pre-flight bulk check: returns the subset of products that cannot
    /// cover `required` units. Never mutates state. Unknown products are
    /// reported as insufficient.
    pub async fn insufficient_among(
        &self,
        product_ids: &[ProductId],
        required: u32,
    ) -> Vec<ProductId> {
        let mut failing = Vec::new();
        for product_id in product_ids {
            if !self.check_stock(product_id, required).await {
                failing.push(product_id.clone());
            }
        }
        failing
    }

    /// Adds received units to physical stock.
    ///
    /// Administrative path: uses the optimistic revision check instead of
    /// the exclusive hold, retrying with a fresh record a bounded number
    /// of times on conflict.
    #[tracing::instrument(skip(self), fields(product = %product_id))]
    pub async fn restock(&self, product_id: &ProductId, quantity: u32) -> Result<StockRecord> {
        const MAX_ATTEMPTS: u32 = 3;

        Self::require_positive(quantity)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut record = self.ledger.load(product_id).await?;
            record.restock(quantity);

            match self.ledger.save(record).await {
                Ok(saved) => return Ok(saved),
                Err(StockError::ConcurrentModification { .. }) if attempt < MAX_ATTEMPTS => {
                    tracing::debug!(attempt, "restock conflicted, retrying with fresh record");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Administrative repair for reservations leaked by failed
    /// compensation: releases up to `quantity` units, clamped to what is
    /// actually reserved.
    #[tracing::instrument(skip(self, req), fields(product = %req.product_id, order = %req.order_reference))]
    pub async fn reconcile(&self, req: &ReservationRequest) -> Result<StockRecord> {
        let mut hold = self.ledger.load_for_update(&req.product_id).await?;

        let clamped = req.quantity.min(hold.reserved());
        if clamped < req.quantity {
            tracing::warn!(
                requested = req.quantity,
                released = clamped,
                "reconcile clamped to outstanding reservation"
            );
        }
        if clamped > 0 {
            hold.release(clamped)?;
        }
        let record = self.ledger.commit(hold);

        metrics::counter!("stock_reconciled_total").increment(u64::from(clamped));
        Ok(record)
    }

    fn require_positive(quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(StockError::InvalidQuantity { quantity });
        }
        Ok(())
    }
}
