//! Outbound call abstractions for the order component.
//!
//! [`InventoryClient`] is the order side's only view of the reservation
//! engine. Implementations never surface raw transport errors: when the
//! downstream is unreachable they return a fixed fail-safe result, "not
//! available" for stock checks and [`ClientError::DownstreamUnavailable`]
//! for the mutating calls, which callers must treat as a hard failure.

pub mod breaker;
pub mod error;
pub mod inventory;
pub mod notify;

pub use breaker::CircuitBreakerClient;
pub use error::{ClientError, Result};
pub use inventory::{DirectInventoryClient, InventoryClient};
pub use notify::{LogNotificationSender, MockNotificationSender, NotificationSender, SentNotification};
