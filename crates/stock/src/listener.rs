//! Inventory-side consumer of order lifecycle events.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use channel::{EventConsumer, LifecycleEvent, LifecycleEventType};
use common::EventId;
use tokio::sync::Mutex;

use crate::engine::{ReservationEngine, ReservationRequest};

/// Reacts to order lifecycle events by moving stock:
/// `Cancelled` releases each line, `Shipped` confirms each line.
/// Every other event type is a no-op for this consumer.
///
/// The channel is at-least-once, so the listener tracks processed event
/// IDs and skips duplicates; redelivery never double-applies a release or
/// confirm.
pub struct InventoryEventListener {
    engine: ReservationEngine,
    processed: Arc<Mutex<HashSet<EventId>>>,
}

impl InventoryEventListener {
    /// Creates a listener over the given engine.
    pub fn new(engine: ReservationEngine) -> Self {
        Self {
            engine,
            processed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Returns the number of distinct events applied so far.
    pub async fn processed_count(&self) -> usize {
        self.processed.lock().await.len()
    }
}

#[async_trait]
impl EventConsumer for InventoryEventListener {
    fn name(&self) -> &'static str {
        "inventory-listener"
    }

    #[tracing::instrument(skip(self, event), fields(event_id = %event.event_id, event_type = %event.event_type, order = %event.order_number))]
    async fn handle(&self, event: &LifecycleEvent) -> channel::Result<()> {
        if !event.event_type.moves_stock() {
            return Ok(());
        }

        {
            let mut processed = self.processed.lock().await;
            if !processed.insert(event.event_id) {
                metrics::counter!("duplicate_events_skipped_total").increment(1);
                tracing::debug!("duplicate delivery skipped");
                return Ok(());
            }
        }

        for line in &event.lines {
            let req = ReservationRequest::new(
                line.product_id.clone(),
                line.quantity,
                event.order_number.clone(),
            );

            let result = match event.event_type {
                LifecycleEventType::Cancelled => self.engine.release(&req).await,
                LifecycleEventType::Shipped => self.engine.confirm(&req).await,
                _ => unreachable!("filtered by moves_stock"),
            };

            // Known weak point: a failed line is logged and skipped; the
            // event is still acknowledged. `ReservationEngine::reconcile`
            // is the out-of-band repair for what piles up here.
            if let Err(e) = result {
                metrics::counter!("event_lines_dropped_total").increment(1);
                tracing::warn!(
                    product = %line.product_id,
                    quantity = line.quantity,
                    error = %e,
                    "line failed during event handling, continuing with remaining lines"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use channel::EventLine;
    use common::{OrderNumber, ProductId};

    use super::*;
    use crate::ledger::StockLedger;
    use crate::record::StockRecord;

    async fn setup() -> (ReservationEngine, InventoryEventListener) {
        let ledger = StockLedger::new();
        ledger
            .register(StockRecord::new("SKU-001", 10, 3, 20))
            .await
            .unwrap();
        ledger
            .register(StockRecord::new("SKU-002", 10, 3, 20))
            .await
            .unwrap();
        let engine = ReservationEngine::new(ledger);
        let listener = InventoryEventListener::new(engine.clone());
        (engine, listener)
    }

    async fn reserve(engine: &ReservationEngine, sku: &str, qty: u32) {
        engine
            .reserve(&ReservationRequest::new(sku, qty, OrderNumber::new("ORD-1")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_releases_every_line() {
        let (engine, listener) = setup().await;
        reserve(&engine, "SKU-001", 2).await;
        reserve(&engine, "SKU-002", 3).await;

        let event = LifecycleEvent::cancelled(
            OrderNumber::new("ORD-1"),
            vec![EventLine::new("SKU-001", 2), EventLine::new("SKU-002", 3)],
        );
        listener.handle(&event).await.unwrap();

        assert_eq!(engine.available_quantity(&ProductId::new("SKU-001")).await.unwrap(), 10);
        assert_eq!(engine.available_quantity(&ProductId::new("SKU-002")).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn shipped_confirms_every_line() {
        let (engine, listener) = setup().await;
        reserve(&engine, "SKU-001", 4).await;

        let event = LifecycleEvent::shipped(
            OrderNumber::new("ORD-1"),
            vec![EventLine::new("SKU-001", 4)],
        );
        listener.handle(&event).await.unwrap();

        let record = engine.ledger().load(&ProductId::new("SKU-001")).await.unwrap();
        assert_eq!(record.on_hand(), 6);
        assert_eq!(record.reserved(), 0);
    }

    #[tokio::test]
    async fn informational_events_are_noops() {
        let (engine, listener) = setup().await;
        reserve(&engine, "SKU-001", 2).await;

        for event in [
            LifecycleEvent::created(OrderNumber::new("ORD-1"), vec![EventLine::new("SKU-001", 2)]),
            LifecycleEvent::confirmed(OrderNumber::new("ORD-1"), vec![EventLine::new("SKU-001", 2)]),
            LifecycleEvent::delivered(OrderNumber::new("ORD-1"), vec![EventLine::new("SKU-001", 2)]),
        ] {
            listener.handle(&event).await.unwrap();
        }

        let record = engine.ledger().load(&ProductId::new("SKU-001")).await.unwrap();
        assert_eq!(record.reserved(), 2);
        assert_eq!(listener.processed_count().await, 0);
    }

    #[tokio::test]
    async fn redelivery_does_not_double_release() {
        let (engine, listener) = setup().await;
        reserve(&engine, "SKU-001", 2).await;
        // A second order holds stock the duplicate must not touch.
        reserve(&engine, "SKU-001", 3).await;

        let event = LifecycleEvent::cancelled(
            OrderNumber::new("ORD-1"),
            vec![EventLine::new("SKU-001", 2)],
        );
        listener.handle(&event).await.unwrap();
        listener.handle(&event).await.unwrap();

        let record = engine.ledger().load(&ProductId::new("SKU-001")).await.unwrap();
        assert_eq!(record.reserved(), 3);
        assert_eq!(listener.processed_count().await, 1);
    }

    #[tokio::test]
    async fn failing_line_does_not_block_remaining_lines() {
        let (engine, listener) = setup().await;
        // Only SKU-002 has a reservation; the SKU-001 line will over-release.
        reserve(&engine, "SKU-002", 3).await;

        let event = LifecycleEvent::cancelled(
            OrderNumber::new("ORD-1"),
            vec![EventLine::new("SKU-001", 2), EventLine::new("SKU-002", 3)],
        );
        listener.handle(&event).await.unwrap();

        let record = engine.ledger().load(&ProductId::new("SKU-002")).await.unwrap();
        assert_eq!(record.reserved(), 0);
    }
}
