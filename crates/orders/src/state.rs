//! Order state machine.

use serde::{Deserialize, Serialize};

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Confirmed ──► PaymentPending ──┬──► PaymentCompleted ──► Processing ──► Shipped ──► Delivered
///    │            │               │          └──► PaymentFailed ──► Refunded
///    └────────────┴───────────────┴──► Cancelled ──► Refunded
/// ```
/// `Cancelled` is reachable from every non-terminal state except
/// `Shipped` and `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order created, stock reserved, awaiting confirmation.
    #[default]
    Pending,

    /// Order confirmed, awaiting payment initiation.
    Confirmed,

    /// Payment has been initiated.
    PaymentPending,

    /// Payment settled successfully.
    PaymentCompleted,

    /// Payment was rejected or timed out.
    PaymentFailed,

    /// Order is being picked and packed.
    Processing,

    /// Order has left the warehouse.
    Shipped,

    /// Order reached the customer (terminal state).
    Delivered,

    /// Order was cancelled before shipping.
    Cancelled,

    /// Payment was returned to the customer (terminal state).
    Refunded,
}

impl OrderStatus {
    /// Returns true if the order can be confirmed in this state.
    pub fn can_confirm(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be cancelled in this state.
    ///
    /// Once stock physically left the warehouse cancellation is off the
    /// table; everything earlier can still be cancelled.
    pub fn can_cancel(&self) -> bool {
        !matches!(
            self,
            OrderStatus::Shipped
                | OrderStatus::Delivered
                | OrderStatus::Cancelled
                | OrderStatus::Refunded
        )
    }

    /// Returns true if payment can be initiated in this state.
    pub fn can_begin_payment(&self) -> bool {
        matches!(self, OrderStatus::Confirmed)
    }

    /// Returns true if a payment outcome can be recorded in this state.
    pub fn can_settle_payment(&self) -> bool {
        matches!(self, OrderStatus::PaymentPending)
    }

    /// Returns true if fulfillment can start in this state.
    pub fn can_start_processing(&self) -> bool {
        matches!(self, OrderStatus::PaymentCompleted)
    }

    /// Returns true if the order can be marked shipped in this state.
    pub fn can_ship(&self) -> bool {
        matches!(self, OrderStatus::Processing)
    }

    /// Returns true if the order can be marked delivered in this state.
    pub fn can_deliver(&self) -> bool {
        matches!(self, OrderStatus::Shipped)
    }

    /// Returns true if the order can be refunded in this state.
    pub fn can_refund(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::PaymentFailed)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Refunded)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::PaymentPending => "PaymentPending",
            OrderStatus::PaymentCompleted => "PaymentCompleted",
            OrderStatus::PaymentFailed => "PaymentFailed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn only_pending_can_confirm() {
        assert!(OrderStatus::Pending.can_confirm());
        assert!(!OrderStatus::Confirmed.can_confirm());
        assert!(!OrderStatus::Shipped.can_confirm());
        assert!(!OrderStatus::Cancelled.can_confirm());
    }

    #[test]
    fn shipped_and_delivered_cannot_cancel() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(OrderStatus::Confirmed.can_cancel());
        assert!(OrderStatus::PaymentPending.can_cancel());
        assert!(OrderStatus::PaymentCompleted.can_cancel());
        assert!(OrderStatus::PaymentFailed.can_cancel());
        assert!(OrderStatus::Processing.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
        assert!(!OrderStatus::Refunded.can_cancel());
    }

    #[test]
    fn payment_flow_predicates() {
        assert!(OrderStatus::Confirmed.can_begin_payment());
        assert!(!OrderStatus::Pending.can_begin_payment());

        assert!(OrderStatus::PaymentPending.can_settle_payment());
        assert!(!OrderStatus::Confirmed.can_settle_payment());

        assert!(OrderStatus::PaymentCompleted.can_start_processing());
        assert!(!OrderStatus::PaymentPending.can_start_processing());
    }

    #[test]
    fn shipping_flow_predicates() {
        assert!(OrderStatus::Processing.can_ship());
        assert!(!OrderStatus::PaymentCompleted.can_ship());

        assert!(OrderStatus::Shipped.can_deliver());
        assert!(!OrderStatus::Processing.can_deliver());
    }

    #[test]
    fn refund_reachable_from_cancelled_and_payment_failed() {
        assert!(OrderStatus::Cancelled.can_refund());
        assert!(OrderStatus::PaymentFailed.can_refund());
        assert!(!OrderStatus::Delivered.can_refund());
        assert!(!OrderStatus::Pending.can_refund());
    }

    #[test]
    fn terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Refunded.is_terminal());
        assert!(!OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(OrderStatus::PaymentPending.to_string(), "PaymentPending");
        assert_eq!(OrderStatus::Refunded.to_string(), "Refunded");
    }

    #[test]
    fn status_serialization_roundtrip() {
        let status = OrderStatus::Processing;
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
