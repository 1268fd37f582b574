//! In-memory stock authority with per-product exclusive holds.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use common::ProductId;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::error::{Result, StockError};
use crate::record::StockRecord;

/// An exclusive hold on one product's stock record.
///
/// While held, every other exclusive hold and every writer for the same
/// product blocks; operations on other products are unaffected. The hold
/// is released when the value is dropped, on every exit path.
pub struct ExclusiveHold {
    guard: OwnedMutexGuard<StockRecord>,
}

impl Deref for ExclusiveHold {
    type Target = StockRecord;

    fn deref(&self) -> &StockRecord {
        &self.guard
    }
}

impl DerefMut for ExclusiveHold {
    fn deref_mut(&mut self) -> &mut StockRecord {
        &mut self.guard
    }
}

/// In-memory authority over per-product stock records.
///
/// Each product gets its own lock slot, so contention is scoped to one
/// product; there is no global lock. Clones share the same state.
#[derive(Clone, Default)]
pub struct StockLedger {
    records: Arc<RwLock<HashMap<ProductId, Arc<Mutex<StockRecord>>>>>,
}

impl StockLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product's stock record.
    pub async fn register(&self, record: StockRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(record.product_id()) {
            return Err(StockError::ProductExists(record.product_id().clone()));
        }
        records.insert(record.product_id().clone(), Arc::new(Mutex::new(record)));
        Ok(())
    }

    /// Returns a snapshot of the current record.
    pub async fn load(&self, product_id: &ProductId) -> Result<StockRecord> {
        let slot = self.slot(product_id).await?;
        let record = slot.lock().await;
        Ok(record.clone())
    }

    /// Acquires the exclusive hold for a product.
    ///
    /// Used only around the reserve/release/confirm critical section:
    /// read, check, mutate through the hold, then [`commit`](Self::commit).
    pub async fn load_for_update(&self, product_id: &ProductId) -> Result<ExclusiveHold> {
        let slot = self.slot(product_id).await?;
        Ok(ExclusiveHold {
            guard: slot.lock_owned().await,
        })
    }

    /// Commits a mutation made through an exclusive hold.
    ///
    /// Bumps the revision, releases the hold, and returns the updated
    /// snapshot.
    pub fn commit(&self, mut hold: ExclusiveHold) -> StockRecord {
        hold.guard.bump_revision();
        hold.guard.clone()
    }

    /// Optimistic save for paths that do not need the exclusive hold
    /// (administrative updates such as restocking).
    ///
    /// Fails with `ConcurrentModification` if the stored revision no
    /// longer matches the revision the caller read; the caller must
    /// reload and retry.
    pub async fn save(&self, record: StockRecord) -> Result<StockRecord> {
        let slot = self.slot(record.product_id()).await?;
        let mut stored = slot.lock().await;

        if stored.revision() != record.revision() {
            return Err(StockError::ConcurrentModification {
                product_id: record.product_id().clone(),
                expected: record.revision(),
                actual: stored.revision(),
            });
        }

        let mut updated = record;
        updated.bump_revision();
        *stored = updated.clone();
        Ok(updated)
    }

    /// Returns true if a record exists for the product.
    pub async fn contains(&self, product_id: &ProductId) -> bool {
        self.records.read().await.contains_key(product_id)
    }

    async fn slot(&self, product_id: &ProductId) -> Result<Arc<Mutex<StockRecord>>> {
        self.records
            .read()
            .await
            .get(product_id)
            .cloned()
            .ok_or_else(|| StockError::ProductNotFound(product_id.clone()))
    }
}
