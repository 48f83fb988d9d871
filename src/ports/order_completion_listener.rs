//! Order completion port.
//!
//! Activating the bought plan and issuing invoices belong to the plans
//! system. The status handlers notify it through this port exactly once per
//! order, on the call that actually completed it.

use async_trait::async_trait;

use crate::domain::billing::Order;
use crate::domain::foundation::DomainError;

#[async_trait]
pub trait OrderCompletionListener: Send + Sync {
    /// Called after `order` was completed and persisted.
    async fn order_completed(&self, order: &Order) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_completion_listener_is_object_safe() {
        fn _accepts_dyn(_listener: &dyn OrderCompletionListener) {}
    }
}
