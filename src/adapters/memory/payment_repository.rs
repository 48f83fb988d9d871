//! In-memory payment repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::billing::Payment;
use crate::domain::foundation::{DomainError, ErrorCode, OrderId, PaymentId};
use crate::ports::PaymentRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Null the order reference of every payment of `order_id`.
    pub async fn detach_order(&self, order_id: &OrderId) {
        let mut payments = self.payments.write().await;
        for payment in payments.values_mut() {
            if payment.order_id.as_ref() == Some(order_id) {
                payment.order_id = None;
            }
        }
    }

    /// Get the number of stored payments
    pub async fn count(&self) -> usize {
        self.payments.read().await.len()
    }

    /// Snapshot of all stored payments, oldest first.
    pub async fn all(&self) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self.payments.read().await.values().cloned().collect();
        payments.sort_by_key(|p| p.created_at);
        payments
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        self.payments.write().await.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&payment.id) {
            Some(stored) => {
                *stored = payment.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment not found: {}", payment.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.payments.read().await.get(id).cloned())
    }

    async fn find_by_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, DomainError> {
        let mut payments: Vec<Payment> = self
            .payments
            .read()
            .await
            .values()
            .filter(|p| p.order_id.as_ref() == Some(order_id))
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }
}
