//! Service wiring for the fulfillment pipeline.
//!
//! [`bootstrap`] assembles the full stack from a [`Config`]: stock
//! ledger, reservation engine, event channel, inventory listener, and
//! the order service behind a circuit-broken inventory client.

pub mod config;

use std::sync::Arc;

use channel::{ConsumerRunner, InMemoryEventChannel};
use client::{
    CircuitBreakerClient, DirectInventoryClient, LogNotificationSender, MockNotificationSender,
    NotificationSender,
};
use orders::{InMemoryOrderRepository, OrderService};
use stock::{InventoryEventListener, ReservationEngine, StockLedger};

pub use config::{Config, NotifierKind};

/// The order service type produced by [`bootstrap`].
pub type FulfillmentService = OrderService<
    InMemoryOrderRepository,
    CircuitBreakerClient<DirectInventoryClient>,
    InMemoryEventChannel,
>;

/// Everything a running service needs.
pub struct App {
    pub service: FulfillmentService,
    pub engine: ReservationEngine,
    pub channel: InMemoryEventChannel,
    pub runner: ConsumerRunner,
}

/// Wires the whole pipeline from configuration.
///
/// The returned runner is not started; callers spawn `runner.run(..)`
/// with their own shutdown signal.
pub fn bootstrap(config: &Config, ledger: StockLedger, recipient: impl Into<String>) -> App {
    let engine = ReservationEngine::new(ledger);
    let channel = InMemoryEventChannel::new();

    let mut runner = ConsumerRunner::new(channel.clone());
    runner.register(Box::new(InventoryEventListener::new(engine.clone())));

    let inventory = CircuitBreakerClient::new(
        DirectInventoryClient::new(engine.clone(), config.reserve_timeout),
        config.breaker_threshold,
        config.breaker_open_interval,
    );

    let notifier: Arc<dyn NotificationSender> = match config.notifier {
        NotifierKind::Log => Arc::new(LogNotificationSender),
        NotifierKind::Mock => Arc::new(MockNotificationSender::new()),
    };

    let service = OrderService::new(
        InMemoryOrderRepository::new(),
        inventory,
        channel.clone(),
        notifier,
        recipient,
    );

    App {
        service,
        engine,
        channel,
        runner,
    }
}
