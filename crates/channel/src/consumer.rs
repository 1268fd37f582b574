//! Consumer contract and delivery loop.

use tokio::sync::watch;

use async_trait::async_trait;

use crate::Result;
use crate::channel::InMemoryEventChannel;
use crate::event::LifecycleEvent;

/// A consumer of order lifecycle events.
///
/// Handlers must tolerate duplicate delivery of the same `event_id`:
/// the channel is at-least-once.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    /// Stable consumer name, used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Processes a single event.
    async fn handle(&self, event: &LifecycleEvent) -> Result<()>;
}

/// Delivers channel events to registered consumers.
///
/// Each partition is drained single-threaded and in FIFO order, so
/// release/confirm events for one order can never interleave out of
/// order. A consumer error is logged and the event is acknowledged
/// regardless; the runner never redelivers.
pub struct ConsumerRunner {
    channel: InMemoryEventChannel,
    consumers: Vec<Box<dyn EventConsumer>>,
}

impl ConsumerRunner {
    /// Creates a runner over the given channel.
    pub fn new(channel: InMemoryEventChannel) -> Self {
        Self {
            channel,
            consumers: Vec::new(),
        }
    }

    /// Registers a consumer with this runner.
    pub fn register(&mut self, consumer: Box<dyn EventConsumer>) {
        self.consumers.push(consumer);
    }

    /// Returns the number of registered consumers.
    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    /// Delivers every queued event and returns how many were delivered.
    #[tracing::instrument(skip(self))]
    pub async fn drain(&self) -> usize {
        let mut delivered = 0;

        for (order_number, queue) in self.channel.take_partitions().await {
            for event in queue {
                self.dispatch(&event).await;
                delivered += 1;
            }
            tracing::debug!(order_number = %order_number, "partition drained");
        }

        delivered
    }

    /// Runs the delivery loop until the shutdown signal flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                () = self.channel.notified() => {
                    self.drain().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        // Deliver anything published before the signal arrived.
        let remaining = self.drain().await;
        tracing::info!(remaining, "consumer runner stopped");
    }

    async fn dispatch(&self, event: &LifecycleEvent) {
        for consumer in &self.consumers {
            match consumer.handle(event).await {
                Ok(()) => {
                    metrics::counter!("lifecycle_events_consumed_total").increment(1);
                }
                Err(e) => {
                    // Acknowledged anyway: per-event failures do not block
                    // the partition or trigger redelivery.
                    metrics::counter!("lifecycle_events_failed_total").increment(1);
                    tracing::warn!(
                        consumer = consumer.name(),
                        event_id = %event.event_id,
                        event_type = %event.event_type,
                        error = %e,
                        "consumer failed; event acknowledged without retry"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common::OrderNumber;
    use tokio::sync::Mutex;

    use super::*;
    use crate::ChannelError;
    use crate::channel::EventPublisher;

    struct RecordingConsumer {
        seen: Arc<Mutex<Vec<LifecycleEvent>>>,
        fail: bool,
    }

    #[async_trait]
    impl EventConsumer for RecordingConsumer {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn handle(&self, event: &LifecycleEvent) -> Result<()> {
            self.seen.lock().await.push(event.clone());
            if self.fail {
                return Err(ChannelError::consumer("recording", "boom"));
            }
            Ok(())
        }
    }

    fn harness(fail: bool) -> (InMemoryEventChannel, ConsumerRunner, Arc<Mutex<Vec<LifecycleEvent>>>) {
        let channel = InMemoryEventChannel::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut runner = ConsumerRunner::new(channel.clone());
        runner.register(Box::new(RecordingConsumer {
            seen: seen.clone(),
            fail,
        }));
        (channel, runner, seen)
    }

    #[tokio::test]
    async fn drain_delivers_partition_in_publish_order() {
        let (channel, runner, seen) = harness(false);
        let number = OrderNumber::new("ORD-A");

        let first = LifecycleEvent::created(number.clone(), vec![]);
        let second = LifecycleEvent::shipped(number.clone(), vec![]);
        channel.publish(first.clone()).await.unwrap();
        channel.publish(second.clone()).await.unwrap();

        let delivered = runner.drain().await;
        assert_eq!(delivered, 2);

        let seen = seen.lock().await;
        assert_eq!(seen[0].event_id, first.event_id);
        assert_eq!(seen[1].event_id, second.event_id);
    }

    #[tokio::test]
    async fn consumer_failure_still_acknowledges_the_event() {
        let (channel, runner, seen) = harness(true);

        channel
            .publish(LifecycleEvent::created(OrderNumber::new("ORD-A"), vec![]))
            .await
            .unwrap();

        let delivered = runner.drain().await;
        assert_eq!(delivered, 1);
        assert_eq!(seen.lock().await.len(), 1);
        // Nothing left to redeliver.
        assert_eq!(channel.pending_count().await, 0);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let (channel, runner, seen) = harness(false);
        let (tx, rx) = watch::channel(false);

        channel
            .publish(LifecycleEvent::created(OrderNumber::new("ORD-A"), vec![]))
            .await
            .unwrap();

        tx.send(true).unwrap();
        runner.run(rx).await;

        // The final drain picked up the pre-shutdown event.
        assert_eq!(seen.lock().await.len(), 1);
    }
}
