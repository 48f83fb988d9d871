//! Order repository port.

use async_trait::async_trait;

use crate::domain::billing::Order;
use crate::domain::foundation::{DomainError, OrderId};

/// Repository port for Order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Save a new order.
    async fn save(&self, order: &Order) -> Result<(), DomainError>;

    /// Update an existing order.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, order: &Order) -> Result<(), DomainError>;

    /// Find an order by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Delete an order. Payments referencing it keep existing with no order.
    async fn delete(&self, id: &OrderId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn OrderRepository) {}
    }
}
