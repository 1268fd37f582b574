//! Event channel for order lifecycle events.
//!
//! This crate defines the channel contract between the order and inventory
//! components:
//! - events for the same order number are delivered in the order they were
//!   produced (the order number is the partition key);
//! - delivery is at-least-once, so consumers must tolerate duplicates;
//! - there is no ordering guarantee across different orders.

pub mod channel;
pub mod consumer;
pub mod error;
pub mod event;

pub use channel::{EventPublisher, InMemoryEventChannel};
pub use consumer::{ConsumerRunner, EventConsumer};
pub use error::{ChannelError, Result};
pub use event::{EventLine, LifecycleEvent, LifecycleEventType};
