//! Publisher contract and the in-memory partitioned channel.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderNumber;
use tokio::sync::{Mutex, Notify};

use crate::Result;
use crate::event::LifecycleEvent;

/// The producer side of the event channel.
///
/// This is the only view of the channel the order component holds.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Appends an event to its partition.
    async fn publish(&self, event: LifecycleEvent) -> Result<()>;
}

/// In-memory event channel partitioned by order number.
///
/// Events for one order number form a FIFO partition; nothing is ordered
/// across partitions. This implementation backs tests and single-process
/// deployments the same way a broker-backed implementation would back
/// production.
#[derive(Clone, Default)]
pub struct InMemoryEventChannel {
    partitions: Arc<Mutex<HashMap<OrderNumber, VecDeque<LifecycleEvent>>>>,
    notify: Arc<Notify>,
}

impl InMemoryEventChannel {
    /// Creates a new empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of undelivered events.
    pub async fn pending_count(&self) -> usize {
        self.partitions.lock().await.values().map(|q| q.len()).sum()
    }

    /// Waits until at least one event has been published.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    /// Takes every queued event, grouped per partition in FIFO order.
    ///
    /// Partition order within the result is arbitrary; the per-partition
    /// ordering is the guarantee.
    pub(crate) async fn take_partitions(&self) -> Vec<(OrderNumber, VecDeque<LifecycleEvent>)> {
        let mut partitions = self.partitions.lock().await;
        partitions.drain().collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventChannel {
    async fn publish(&self, event: LifecycleEvent) -> Result<()> {
        tracing::debug!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            order_number = %event.order_number,
            "event published"
        );

        let mut partitions = self.partitions.lock().await;
        partitions
            .entry(event.order_number.clone())
            .or_default()
            .push_back(event);
        drop(partitions);

        metrics::counter!("lifecycle_events_published_total").increment(1);
        self.notify.notify_one();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLine;

    #[tokio::test]
    async fn publish_appends_to_partition_in_order() {
        let channel = InMemoryEventChannel::new();
        let number = OrderNumber::new("ORD-A");

        let first = LifecycleEvent::created(number.clone(), vec![EventLine::new("SKU-001", 1)]);
        let second = LifecycleEvent::cancelled(number.clone(), vec![EventLine::new("SKU-001", 1)]);

        channel.publish(first.clone()).await.unwrap();
        channel.publish(second.clone()).await.unwrap();

        assert_eq!(channel.pending_count().await, 2);

        let mut partitions = channel.take_partitions().await;
        assert_eq!(partitions.len(), 1);
        let (key, queue) = partitions.pop().unwrap();
        assert_eq!(key, number);
        assert_eq!(queue[0].event_id, first.event_id);
        assert_eq!(queue[1].event_id, second.event_id);
    }

    #[tokio::test]
    async fn different_orders_land_in_different_partitions() {
        let channel = InMemoryEventChannel::new();

        channel
            .publish(LifecycleEvent::created(OrderNumber::new("ORD-A"), vec![]))
            .await
            .unwrap();
        channel
            .publish(LifecycleEvent::created(OrderNumber::new("ORD-B"), vec![]))
            .await
            .unwrap();

        let partitions = channel.take_partitions().await;
        assert_eq!(partitions.len(), 2);
    }

    #[tokio::test]
    async fn take_partitions_empties_the_channel() {
        let channel = InMemoryEventChannel::new();
        channel
            .publish(LifecycleEvent::created(OrderNumber::new("ORD-A"), vec![]))
            .await
            .unwrap();

        let _ = channel.take_partitions().await;
        assert_eq!(channel.pending_count().await, 0);
    }
}
