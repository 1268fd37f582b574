//! Inventory client trait and the in-process implementation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use common::ProductId;
use stock::{ReservationEngine, ReservationRequest, StockRecord};

use crate::error::{ClientError, Result};

/// The order component's outbound view of the reservation engine.
///
/// Every call carries a request timeout; on timeout the implementation
/// returns the degraded-mode result and never retries silently. Retries,
/// if any, belong to the caller's explicit compensation logic.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Returns whether the quantity is available. Degraded mode answers
    /// `false` rather than raising a transport error.
    async fn check_stock(&self, product_id: &ProductId, quantity: u32) -> bool;

    /// Reserves stock for one order line.
    async fn reserve(&self, req: &ReservationRequest) -> Result<StockRecord>;

    /// Releases a previously reserved quantity.
    async fn release(&self, req: &ReservationRequest) -> Result<StockRecord>;

    /// Confirms (deducts) a previously reserved quantity.
    async fn confirm(&self, req: &ReservationRequest) -> Result<StockRecord>;
}

/// Calls the reservation engine in-process, bounded by a per-call
/// timeout.
#[derive(Clone)]
pub struct DirectInventoryClient {
    engine: ReservationEngine,
    call_timeout: Duration,
}

impl DirectInventoryClient {
    /// Creates a client over the given engine.
    pub fn new(engine: ReservationEngine, call_timeout: Duration) -> Self {
        Self {
            engine,
            call_timeout,
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = stock::Result<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(ClientError::from),
            Err(_) => {
                metrics::counter!("inventory_client_timeouts_total").increment(1);
                tracing::warn!(operation, "inventory call timed out");
                Err(ClientError::unavailable(format!("{operation} timed out")))
            }
        }
    }
}

#[async_trait]
impl InventoryClient for DirectInventoryClient {
    async fn check_stock(&self, product_id: &ProductId, quantity: u32) -> bool {
        tokio::time::timeout(self.call_timeout, self.engine.check_stock(product_id, quantity))
            .await
            .unwrap_or(false)
    }

    async fn reserve(&self, req: &ReservationRequest) -> Result<StockRecord> {
        self.bounded("reserve", self.engine.reserve(req)).await
    }

    async fn release(&self, req: &ReservationRequest) -> Result<StockRecord> {
        self.bounded("release", self.engine.release(req)).await
    }

    async fn confirm(&self, req: &ReservationRequest) -> Result<StockRecord> {
        self.bounded("confirm", self.engine.confirm(req)).await
    }
}

#[cfg(test)]
mod tests {
    use common::OrderNumber;
    use stock::{StockLedger, StockRecord};

    use super::*;

    async fn client() -> DirectInventoryClient {
        let ledger = StockLedger::new();
        ledger
            .register(StockRecord::new("SKU-001", 10, 3, 20))
            .await
            .unwrap();
        DirectInventoryClient::new(ReservationEngine::new(ledger), Duration::from_secs(2))
    }

    fn req(quantity: u32) -> ReservationRequest {
        ReservationRequest::new("SKU-001", quantity, OrderNumber::new("ORD-TEST"))
    }

    #[tokio::test]
    async fn reserve_passes_through_to_the_engine() {
        let client = client().await;
        let record = client.reserve(&req(4)).await.unwrap();
        assert_eq!(record.reserved(), 4);
    }

    #[tokio::test]
    async fn business_failures_surface_as_stock_errors() {
        let client = client().await;
        let err = client.reserve(&req(11)).await.unwrap_err();
        assert!(matches!(err, ClientError::Stock(_)));
        assert!(!err.is_unavailable());
    }

    #[tokio::test]
    async fn check_stock_answers_for_known_and_unknown_products() {
        let client = client().await;
        assert!(client.check_stock(&ProductId::new("SKU-001"), 10).await);
        assert!(!client.check_stock(&ProductId::new("SKU-404"), 1).await);
    }
}
