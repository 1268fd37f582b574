//! Order lifecycle event types.

use chrono::{DateTime, Utc};
use common::{EventId, OrderNumber, ProductId};
use serde::{Deserialize, Serialize};

/// The kind of order transition an event describes.
///
/// Only `Cancelled` and `Shipped` trigger inventory-side effects; the
/// rest are informational for downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEventType {
    Created,
    Confirmed,
    Cancelled,
    Shipped,
    Delivered,
}

impl LifecycleEventType {
    /// Returns the event type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEventType::Created => "Created",
            LifecycleEventType::Confirmed => "Confirmed",
            LifecycleEventType::Cancelled => "Cancelled",
            LifecycleEventType::Shipped => "Shipped",
            LifecycleEventType::Delivered => "Delivered",
        }
    }

    /// Returns true if this event type moves stock on the inventory side.
    pub fn moves_stock(&self) -> bool {
        matches!(
            self,
            LifecycleEventType::Cancelled | LifecycleEventType::Shipped
        )
    }
}

impl std::fmt::Display for LifecycleEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One order line carried inside a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLine {
    /// The product the line refers to.
    pub product_id: ProductId,
    /// Quantity ordered on this line.
    pub quantity: u32,
}

impl EventLine {
    /// Creates a new event line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// An immutable record of one order lifecycle transition.
///
/// Produced once per meaningful transition; may be delivered more than
/// once. `event_id` is the idempotency key, `order_number` the partition
/// key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Unique event identity, stable across redeliveries.
    pub event_id: EventId,

    /// The transition this event describes.
    pub event_type: LifecycleEventType,

    /// Partition key: all events for one order stay ordered.
    pub order_number: OrderNumber,

    /// The order lines as of the transition.
    pub lines: Vec<EventLine>,

    /// When the transition occurred.
    pub occurred_at: DateTime<Utc>,
}

impl LifecycleEvent {
    /// Creates a new event with a fresh ID and the current timestamp.
    pub fn new(
        event_type: LifecycleEventType,
        order_number: OrderNumber,
        lines: Vec<EventLine>,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            event_type,
            order_number,
            lines,
            occurred_at: Utc::now(),
        }
    }

    /// Creates a `Created` event.
    pub fn created(order_number: OrderNumber, lines: Vec<EventLine>) -> Self {
        Self::new(LifecycleEventType::Created, order_number, lines)
    }

    /// Creates a `Confirmed` event.
    pub fn confirmed(order_number: OrderNumber, lines: Vec<EventLine>) -> Self {
        Self::new(LifecycleEventType::Confirmed, order_number, lines)
    }

    /// Creates a `Cancelled` event.
    pub fn cancelled(order_number: OrderNumber, lines: Vec<EventLine>) -> Self {
        Self::new(LifecycleEventType::Cancelled, order_number, lines)
    }

    /// Creates a `Shipped` event.
    pub fn shipped(order_number: OrderNumber, lines: Vec<EventLine>) -> Self {
        Self::new(LifecycleEventType::Shipped, order_number, lines)
    }

    /// Creates a `Delivered` event.
    pub fn delivered(order_number: OrderNumber, lines: Vec<EventLine>) -> Self {
        Self::new(LifecycleEventType::Delivered, order_number, lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cancelled_and_shipped_move_stock() {
        assert!(!LifecycleEventType::Created.moves_stock());
        assert!(!LifecycleEventType::Confirmed.moves_stock());
        assert!(LifecycleEventType::Cancelled.moves_stock());
        assert!(LifecycleEventType::Shipped.moves_stock());
        assert!(!LifecycleEventType::Delivered.moves_stock());
    }

    #[test]
    fn constructors_assign_unique_event_ids() {
        let number = OrderNumber::new("ORD-TEST");
        let a = LifecycleEvent::created(number.clone(), vec![]);
        let b = LifecycleEvent::created(number, vec![]);
        assert_ne!(a.event_id, b.event_id);
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = LifecycleEvent::shipped(
            OrderNumber::new("ORD-TEST"),
            vec![EventLine::new("SKU-001", 2), EventLine::new("SKU-002", 1)],
        );

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: LifecycleEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(LifecycleEventType::Cancelled.to_string(), "Cancelled");
        assert_eq!(LifecycleEventType::Shipped.as_str(), "Shipped");
    }
}
