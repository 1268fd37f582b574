//! Order aggregate.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderNumber, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};
use crate::state::OrderStatus;

/// One line of an order.
///
/// Plain value owned by its order; lines hold no reference back to the
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product ordered.
    pub product_id: ProductId,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line.
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Order aggregate root.
///
/// The order number is generated once at construction and immutable
/// afterwards; the total is derived from the items. All state changes go
/// through the transition methods, which enforce the state machine and
/// leave the order untouched on an illegal transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    order_id: OrderId,
    order_number: OrderNumber,
    status: OrderStatus,
    items: Vec<OrderItem>,
    total_amount: Money,
    created_at: DateTime<Utc>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a new order in `Pending` state.
    ///
    /// Validates the item list before anything else: it must be
    /// non-empty and every line quantity positive.
    pub fn new(items: Vec<OrderItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        for item in &items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                });
            }
        }

        let total_amount = items.iter().map(OrderItem::total_price).sum();
        Ok(Self {
            order_id: OrderId::new(),
            order_number: OrderNumber::generate(),
            status: OrderStatus::Pending,
            items,
            total_amount,
            created_at: Utc::now(),
            shipped_at: None,
            delivered_at: None,
        })
    }

    /// Returns the order ID.
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Returns the externally visible order number.
    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the order lines.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the derived total.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns when the order was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the order shipped, if it has.
    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    /// Returns when the order was delivered, if it has been.
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// Confirms the order. Legal only from `Pending`.
    pub fn confirm(&mut self) -> Result<()> {
        self.transition(OrderStatus::can_confirm, OrderStatus::Confirmed, "confirm")
    }

    /// Initiates payment. Legal only from `Confirmed`.
    pub fn begin_payment(&mut self) -> Result<()> {
        self.transition(
            OrderStatus::can_begin_payment,
            OrderStatus::PaymentPending,
            "begin payment for",
        )
    }

    /// Records a successful payment. Legal only from `PaymentPending`.
    pub fn complete_payment(&mut self) -> Result<()> {
        self.transition(
            OrderStatus::can_settle_payment,
            OrderStatus::PaymentCompleted,
            "complete payment for",
        )
    }

    /// Records a failed payment. Legal only from `PaymentPending`.
    pub fn fail_payment(&mut self) -> Result<()> {
        self.transition(
            OrderStatus::can_settle_payment,
            OrderStatus::PaymentFailed,
            "fail payment for",
        )
    }

    /// Starts fulfillment. Legal only from `PaymentCompleted`.
    pub fn start_processing(&mut self) -> Result<()> {
        self.transition(
            OrderStatus::can_start_processing,
            OrderStatus::Processing,
            "start processing",
        )
    }

    /// Marks the order shipped and stamps `shipped_at`.
    pub fn mark_shipped(&mut self) -> Result<()> {
        self.transition(OrderStatus::can_ship, OrderStatus::Shipped, "ship")?;
        self.shipped_at = Some(Utc::now());
        Ok(())
    }

    /// Marks the order delivered and stamps `delivered_at`.
    pub fn mark_delivered(&mut self) -> Result<()> {
        self.transition(OrderStatus::can_deliver, OrderStatus::Delivered, "deliver")?;
        self.delivered_at = Some(Utc::now());
        Ok(())
    }

    /// Cancels the order. Illegal once shipped or delivered.
    pub fn cancel(&mut self) -> Result<()> {
        self.transition(OrderStatus::can_cancel, OrderStatus::Cancelled, "cancel")
    }

    /// Refunds the order. Legal from `Cancelled` or `PaymentFailed`.
    pub fn refund(&mut self) -> Result<()> {
        self.transition(OrderStatus::can_refund, OrderStatus::Refunded, "refund")
    }

    fn transition(
        &mut self,
        allowed: fn(&OrderStatus) -> bool,
        next: OrderStatus,
        action: &'static str,
    ) -> Result<()> {
        if !allowed(&self.status) {
            return Err(OrderError::IllegalTransition {
                from: self.status,
                action,
            });
        }
        self.status = next;
        Ok(())
    }
}
