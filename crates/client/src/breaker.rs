//! Circuit breaker decorator for inventory clients.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::ProductId;
use stock::{ReservationRequest, StockRecord};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{ClientError, Result};
use crate::inventory::InventoryClient;

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

/// Wraps an [`InventoryClient`] with a circuit breaker.
///
/// After `failure_threshold` consecutive unavailable results the circuit
/// opens for `open_interval`: calls return the fixed degraded result
/// without touching the inner client. Once the interval elapses a single
/// probe call is let through; its outcome closes or re-opens the
/// circuit. Business failures never trip the breaker; they prove the
/// downstream is reachable.
pub struct CircuitBreakerClient<C> {
    inner: C,
    failure_threshold: u32,
    open_interval: Duration,
    state: Arc<Mutex<BreakerState>>,
}

impl<C> CircuitBreakerClient<C> {
    /// Creates a breaker around the given client.
    pub fn new(inner: C, failure_threshold: u32, open_interval: Duration) -> Self {
        Self {
            inner,
            failure_threshold,
            open_interval,
            state: Arc::new(Mutex::new(BreakerState::default())),
        }
    }

    /// Returns true if calls are currently short-circuited.
    pub async fn is_open(&self) -> bool {
        let state = self.state.lock().await;
        matches!(state.open_until, Some(until) if Instant::now() < until)
    }

    async fn record_outcome(&self, unavailable: bool) {
        let mut state = self.state.lock().await;
        if unavailable {
            state.consecutive_failures += 1;
            if state.consecutive_failures >= self.failure_threshold {
                state.open_until = Some(Instant::now() + self.open_interval);
                metrics::counter!("circuit_opened_total").increment(1);
                tracing::warn!(
                    failures = state.consecutive_failures,
                    open_for = ?self.open_interval,
                    "inventory circuit opened"
                );
            }
        } else {
            if state.open_until.is_some() {
                tracing::info!("inventory circuit closed");
            }
            state.consecutive_failures = 0;
            state.open_until = None;
        }
    }
}

impl<C: InventoryClient> CircuitBreakerClient<C> {
    async fn guarded(
        &self,
        call: impl Future<Output = Result<StockRecord>> + Send,
    ) -> Result<StockRecord> {
        if self.is_open().await {
            return Err(ClientError::unavailable("circuit open"));
        }

        let result = call.await;
        match &result {
            Err(e) if e.is_unavailable() => self.record_outcome(true).await,
            _ => self.record_outcome(false).await,
        }
        result
    }
}

#[async_trait]
impl<C: InventoryClient> InventoryClient for CircuitBreakerClient<C> {
    async fn check_stock(&self, product_id: &ProductId, quantity: u32) -> bool {
        if self.is_open().await {
            // Fixed fail-safe answer while the circuit is open.
            return false;
        }
        self.inner.check_stock(product_id, quantity).await
    }

    async fn reserve(&self, req: &ReservationRequest) -> Result<StockRecord> {
        self.guarded(self.inner.reserve(req)).await
    }

    async fn release(&self, req: &ReservationRequest) -> Result<StockRecord> {
        self.guarded(self.inner.release(req)).await
    }

    async fn confirm(&self, req: &ReservationRequest) -> Result<StockRecord> {
        self.guarded(self.inner.confirm(req)).await
    }
}
