//! Plan-system adapters.
//!
//! The plans system owns plan activation. Inside this service a completed
//! order is only announced through the log; deployments embedding the plans
//! system register their own `OrderCompletionListener`.

use async_trait::async_trait;

use crate::domain::billing::Order;
use crate::domain::foundation::DomainError;
use crate::ports::OrderCompletionListener;

/// Logs each completed order at `info`.
#[derive(Debug, Clone, Default)]
pub struct LoggingCompletionListener;

impl LoggingCompletionListener {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OrderCompletionListener for LoggingCompletionListener {
    async fn order_completed(&self, order: &Order) -> Result<(), DomainError> {
        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            plan_id = %order.plan_id,
            amount = %order.amount,
            currency = %order.currency,
            "Order completed, plan ready for activation"
        );
        Ok(())
    }
}
