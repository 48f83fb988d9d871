//! In-memory order repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::billing::Order;
use crate::domain::foundation::{DomainError, ErrorCode, OrderId};
use crate::ports::OrderRepository;

use super::InMemoryPaymentRepository;

/// Orders kept in memory. Deleting an order detaches its payments in the
/// linked payment repository.
#[derive(Debug, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    payments: InMemoryPaymentRepository,
}

impl InMemoryOrderRepository {
    pub fn new(payments: InMemoryPaymentRepository) -> Self {
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
            payments,
        }
    }

    /// Get the number of stored orders
    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), DomainError> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id) {
            Some(stored) => {
                *stored = order.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("Order not found: {}", order.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &OrderId) -> Result<(), DomainError> {
        self.orders.write().await.remove(id);
        self.payments.detach_order(id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::Payment;
    use crate::domain::foundation::{PlanId, UserId};
    use crate::ports::PaymentRepository;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn deleting_order_keeps_its_payments_without_order() {
        let payments = InMemoryPaymentRepository::new();
        let orders = InMemoryOrderRepository::new(payments.clone());
        let order = Order::new(
            UserId::new("user-1").unwrap(),
            PlanId::new(),
            None,
            "Premium",
            Decimal::new(1000, 2),
            None,
            "EUR",
        );
        let payment = Payment::new("default", Some(order.id));
        orders.save(&order).await.unwrap();
        payments.save(&payment).await.unwrap();

        orders.delete(&order.id).await.unwrap();

        assert!(orders.find_by_id(&order.id).await.unwrap().is_none());
        let stored = payments.find_by_id(&payment.id).await.unwrap().unwrap();
        assert_eq!(stored.order_id, None);
    }
}
