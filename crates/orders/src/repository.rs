//! Order persistence.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, OrderNumber};
use tokio::sync::RwLock;

use crate::error::{OrderError, Result};
use crate::order::Order;

/// Storage seam for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order. Fails if the ID is already taken.
    async fn insert(&self, order: Order) -> Result<()>;

    /// Replaces an existing order. Fails if it was never inserted.
    async fn update(&self, order: Order) -> Result<()>;

    /// Looks up an order by ID.
    async fn find(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Looks up an order by its external order number.
    async fn find_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>>;
}

/// In-memory order repository backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.order_id()) {
            return Err(OrderError::AlreadyExists(order.order_id()));
        }
        orders.insert(order.order_id(), order);
        Ok(())
    }

    async fn update(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if !orders.contains_key(&order.order_id()) {
            return Err(OrderError::NotFound(order.order_id()));
        }
        orders.insert(order.order_id(), order);
        Ok(())
    }

    async fn find(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }

    async fn find_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|order| order.order_number() == order_number)
            .cloned())
    }
}
