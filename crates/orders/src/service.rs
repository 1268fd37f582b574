//! Order application service.
//!
//! Coordinates the synchronous reservation path with the asynchronous
//! lifecycle event stream. Reservations happen inline during order
//! creation; releases and confirmations travel through the event channel
//! and are applied by the inventory listener.

use std::sync::Arc;

use channel::{EventLine, EventPublisher, LifecycleEvent};
use client::{InventoryClient, NotificationSender};
use common::{OrderId, OrderNumber};
use stock::ReservationRequest;

use crate::error::{OrderError, Result};
use crate::order::{Order, OrderItem};
use crate::repository::OrderRepository;

/// Front door for everything order-shaped.
///
/// `create_order` is the only operation that touches inventory
/// synchronously; every later transition persists the new state first
/// and then publishes a lifecycle event for downstream consumers.
pub struct OrderService<R, C, P> {
    repository: R,
    inventory: C,
    publisher: P,
    notifier: Arc<dyn NotificationSender>,
    notification_recipient: String,
}

impl<R, C, P> OrderService<R, C, P>
where
    R: OrderRepository,
    C: InventoryClient,
    P: EventPublisher,
{
    /// Creates a new order service.
    pub fn new(
        repository: R,
        inventory: C,
        publisher: P,
        notifier: Arc<dyn NotificationSender>,
        notification_recipient: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            inventory,
            publisher,
            notifier,
            notification_recipient: notification_recipient.into(),
        }
    }

    /// Creates an order, reserving stock for every line before anything
    /// is persisted.
    ///
    /// Lines are reserved in item order. If any line fails, the lines
    /// already reserved are released in reverse order and the order is
    /// never stored; the caller sees the error that broke the chain.
    #[tracing::instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn create_order(&self, items: Vec<OrderItem>) -> Result<Order> {
        let order = Order::new(items)?;

        let mut reserved: Vec<ReservationRequest> = Vec::with_capacity(order.items().len());
        for item in order.items() {
            let request = ReservationRequest::new(
                item.product_id.clone(),
                item.quantity,
                order.order_number().clone(),
            );
            match self.inventory.reserve(&request).await {
                Ok(_) => reserved.push(request),
                Err(err) => {
                    tracing::warn!(
                        order_number = %order.order_number(),
                        product_id = %item.product_id,
                        error = %err,
                        "reservation failed, compensating"
                    );
                    self.compensate(order.order_number(), &reserved).await;
                    metrics::counter!("orders_rejected_total").increment(1);
                    return Err(err.into());
                }
            }
        }

        self.repository.insert(order.clone()).await?;
        self.publisher
            .publish(LifecycleEvent::created(
                order.order_number().clone(),
                event_lines(&order),
            ))
            .await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %order.order_id(),
            order_number = %order.order_number(),
            total = %order.total_amount(),
            "order created"
        );

        self.notifier
            .send(
                &self.notification_recipient,
                &format!("Order {} received", order.order_number()),
                &format!("Order total {}", order.total_amount()),
            )
            .await;

        Ok(order)
    }

    /// Confirms a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_order(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, Order::confirm, |order| {
            Some(LifecycleEvent::confirmed(
                order.order_number().clone(),
                event_lines(order),
            ))
        })
        .await
    }

    /// Cancels an order and announces the cancellation so the inventory
    /// listener can release the reserved stock.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order> {
        let order = self
            .transition(order_id, Order::cancel, |order| {
                Some(LifecycleEvent::cancelled(
                    order.order_number().clone(),
                    event_lines(order),
                ))
            })
            .await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        self.notifier
            .send(
                &self.notification_recipient,
                &format!("Order {} cancelled", order.order_number()),
                "Reserved stock will be released.",
            )
            .await;

        Ok(order)
    }

    /// Moves a confirmed order into payment.
    #[tracing::instrument(skip(self))]
    pub async fn begin_payment(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, Order::begin_payment, |_| None).await
    }

    /// Records a successful payment.
    #[tracing::instrument(skip(self))]
    pub async fn complete_payment(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, Order::complete_payment, |_| None)
            .await
    }

    /// Records a failed payment.
    #[tracing::instrument(skip(self))]
    pub async fn fail_payment(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, Order::fail_payment, |_| None).await
    }

    /// Starts fulfillment for a paid order.
    #[tracing::instrument(skip(self))]
    pub async fn start_processing(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, Order::start_processing, |_| None)
            .await
    }

    /// Ships an order and announces it so the inventory listener can
    /// turn the reservation into an actual deduction.
    #[tracing::instrument(skip(self))]
    pub async fn ship_order(&self, order_id: OrderId) -> Result<Order> {
        let order = self
            .transition(order_id, Order::mark_shipped, |order| {
                Some(LifecycleEvent::shipped(
                    order.order_number().clone(),
                    event_lines(order),
                ))
            })
            .await?;

        metrics::counter!("orders_shipped_total").increment(1);
        Ok(order)
    }

    /// Marks a shipped order delivered.
    #[tracing::instrument(skip(self))]
    pub async fn deliver_order(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, Order::mark_delivered, |order| {
            Some(LifecycleEvent::delivered(
                order.order_number().clone(),
                event_lines(order),
            ))
        })
        .await
    }

    /// Refunds a cancelled or payment-failed order.
    #[tracing::instrument(skip(self))]
    pub async fn refund_order(&self, order_id: OrderId) -> Result<Order> {
        self.transition(order_id, Order::refund, |_| None).await
    }

    /// Fetches an order by ID.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.repository
            .find(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }

    /// Fetches an order by its external order number.
    pub async fn get_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>> {
        self.repository.find_by_number(order_number).await
    }

    /// Applies one guarded transition, persists the result, then
    /// publishes the associated event if the transition carries one.
    async fn transition(
        &self,
        order_id: OrderId,
        apply: fn(&mut Order) -> Result<()>,
        event_for: fn(&Order) -> Option<LifecycleEvent>,
    ) -> Result<Order> {
        let mut order = self.get_order(order_id).await?;
        apply(&mut order)?;
        self.repository.update(order.clone()).await?;

        if let Some(event) = event_for(&order) {
            self.publisher.publish(event).await?;
        }

        tracing::info!(
            order_id = %order.order_id(),
            status = %order.status(),
            "order transitioned"
        );
        Ok(order)
    }

    /// Releases every already-reserved line of a failed creation, in
    /// reverse order. Compensation failures are logged and skipped so
    /// the caller always sees the error that triggered the unwind.
    async fn compensate(&self, order_number: &OrderNumber, reserved: &[ReservationRequest]) {
        for request in reserved.iter().rev() {
            if let Err(err) = self.inventory.release(request).await {
                metrics::counter!("order_compensation_failures_total").increment(1);
                tracing::error!(
                    order_number = %order_number,
                    product_id = %request.product_id,
                    quantity = request.quantity,
                    error = %err,
                    "compensating release failed, stock may need reconciliation"
                );
            }
        }
    }
}

fn event_lines(order: &Order) -> Vec<EventLine> {
    order
        .items()
        .iter()
        .map(|item| EventLine::new(item.product_id.clone(), item.quantity))
        .collect()
}
