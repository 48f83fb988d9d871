//! HandleStatusChangeHandler - Reacts to a persisted payment status change.
//!
//! Looks up the payment's order, decides the reaction from the status table
//! in `domain::billing::reaction`, and applies it to the order and the user's
//! recurring record.

use std::sync::Arc;

use crate::domain::billing::{
    react, OrderReaction, OrderStatus, Payment, PaymentsError, StatusReaction, TokenEffect,
};
use crate::domain::foundation::{OrderId, Timestamp};
use crate::ports::{OrderCompletionListener, OrderRepository, RecurringPlanRepository};

/// Result of reacting to a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleStatusChangeResult {
    /// The payment has no order; nothing to react on.
    NoOrder,
    Applied {
        order_id: OrderId,
        order_status: OrderStatus,
        reaction: StatusReaction,
        /// True only for the change that completed the order.
        completed_now: bool,
    },
}

pub struct HandleStatusChangeHandler {
    orders: Arc<dyn OrderRepository>,
    recurring: Arc<dyn RecurringPlanRepository>,
    completion: Arc<dyn OrderCompletionListener>,
    return_order_on_refund: bool,
}

impl HandleStatusChangeHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        recurring: Arc<dyn RecurringPlanRepository>,
        completion: Arc<dyn OrderCompletionListener>,
        return_order_on_refund: bool,
    ) -> Self {
        Self {
            orders,
            recurring,
            completion,
            return_order_on_refund,
        }
    }

    pub async fn handle(&self, payment: &Payment) -> Result<HandleStatusChangeResult, PaymentsError> {
        let Some(order_id) = payment.order_id else {
            return Ok(HandleStatusChangeResult::NoOrder);
        };
        let mut order = self
            .orders
            .find_by_id(&order_id)
            .await?
            .ok_or(PaymentsError::OrderNotFound(order_id))?;

        let reaction = react(payment.status, order.status, self.return_order_on_refund);

        tracing::info!(
            payment_id = %payment.id,
            order_id = %order.id,
            payment_status = %payment.status,
            order_status = %order.status,
            reaction = ?reaction,
            "Reacting to payment status change"
        );

        let mut completed_now = false;
        match reaction.order {
            OrderReaction::Complete => {
                if order.complete(Timestamp::now())? {
                    self.orders.update(&order).await?;
                    self.completion.order_completed(&order).await?;
                    completed_now = true;
                }
            }
            OrderReaction::Return => {
                if let Err(err) = order.mark_returned() {
                    tracing::error!(
                        order_id = %order.id,
                        order_status = %order.status,
                        "Refunded payment cannot return order"
                    );
                    return Err(err);
                }
                self.orders.update(&order).await?;
            }
            OrderReaction::Cancel => {
                if order.cancel()? {
                    self.orders.update(&order).await?;
                }
            }
            OrderReaction::Keep => {}
        }

        // Only after the order change went through.
        if reaction.token != TokenEffect::Keep {
            if let Some(mut recurring) = self.recurring.find_by_user(&order.user_id).await? {
                match reaction.token {
                    TokenEffect::Verify => recurring.verify_token(),
                    TokenEffect::Invalidate => recurring.invalidate_token(),
                    TokenEffect::Keep => {}
                }
                self.recurring.upsert(&recurring).await?;
            }
        }

        Ok(HandleStatusChangeResult::Applied {
            order_id: order.id,
            order_status: order.status,
            reaction,
            completed_now,
        })
    }
}
