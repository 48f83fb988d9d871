//! Payment repository port.
//!
//! Persists payment records. Payments are never deleted through this port;
//! deleting an order only nulls the `order_id` of its payments.

use async_trait::async_trait;

use crate::domain::billing::Payment;
use crate::domain::foundation::{DomainError, OrderId, PaymentId};

/// Repository port for Payment persistence.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Save a new payment.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Update an existing payment.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if the payment doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Find a payment by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    /// All payments of an order, oldest first.
    async fn find_by_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentRepository) {}
    }
}
