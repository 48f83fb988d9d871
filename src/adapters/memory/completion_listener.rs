//! Completion listener that records completed orders.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::billing::Order;
use crate::domain::foundation::{DomainError, OrderId};
use crate::ports::OrderCompletionListener;

#[derive(Debug, Clone, Default)]
pub struct RecordingCompletionListener {
    completed: Arc<RwLock<Vec<OrderId>>>,
}

impl RecordingCompletionListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders reported as completed, in notification order.
    pub async fn completed(&self) -> Vec<OrderId> {
        self.completed.read().await.clone()
    }
}

#[async_trait]
impl OrderCompletionListener for RecordingCompletionListener {
    async fn order_completed(&self, order: &Order) -> Result<(), DomainError> {
        self.completed.write().await.push(order.id);
        Ok(())
    }
}
