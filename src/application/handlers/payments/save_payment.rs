//! SavePaymentHandler - Persists a payment after refreshing its transaction fee.
//!
//! Every write of a payment goes through this handler so the fee is
//! recomputed on each save. Validated saves (edits coming from an operator)
//! additionally refuse to leave a completed order without a confirmed
//! payment; status updates reported by gateways skip that check.

use std::sync::Arc;

use crate::domain::billing::{FeeAssessment, FeePolicy, Payment, PaymentsError};
use crate::ports::{OrderRepository, PaymentRepository};

/// Command to save a payment.
#[derive(Debug, Clone)]
pub struct SavePaymentCommand {
    pub payment: Payment,
    /// Run entity validation before saving.
    pub validate: bool,
}

/// Result of a save.
#[derive(Debug, Clone)]
pub struct SavePaymentResult {
    pub payment: Payment,
    pub fee: FeeAssessment,
    /// True when the payment did not exist before.
    pub created: bool,
}

pub struct SavePaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    orders: Arc<dyn OrderRepository>,
    fee_policy: FeePolicy,
}

impl SavePaymentHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        orders: Arc<dyn OrderRepository>,
        fee_policy: FeePolicy,
    ) -> Self {
        Self {
            payments,
            orders,
            fee_policy,
        }
    }

    pub async fn handle(&self, cmd: SavePaymentCommand) -> Result<SavePaymentResult, PaymentsError> {
        let mut payment = cmd.payment;

        if cmd.validate {
            self.validate(&payment).await?;
        }

        let fee_before = payment.transaction_fee;
        let fee = payment.refresh_transaction_fee(&self.fee_policy);
        match &fee {
            FeeAssessment::NotReported if fee_before.is_zero() => {
                tracing::warn!(
                    payment_id = %payment.id,
                    variant = %payment.variant,
                    "Transaction fee missing from gateway payload"
                );
            }
            FeeAssessment::Unreadable(reason) => {
                tracing::warn!(
                    payment_id = %payment.id,
                    variant = %payment.variant,
                    reason = %reason,
                    "Could not read transaction fee from gateway payload"
                );
            }
            _ => {}
        }

        let created = self.payments.find_by_id(&payment.id).await?.is_none();
        if created {
            self.payments.save(&payment).await?;
        } else {
            self.payments.update(&payment).await?;
        }

        tracing::debug!(
            payment_id = %payment.id,
            status = %payment.status,
            transaction_fee = %payment.transaction_fee,
            created,
            "Payment saved"
        );

        Ok(SavePaymentResult {
            payment,
            fee,
            created,
        })
    }

    async fn validate(&self, payment: &Payment) -> Result<(), PaymentsError> {
        let Some(order_id) = payment.order_id else {
            return Ok(());
        };
        let order = self
            .orders
            .find_by_id(&order_id)
            .await?
            .ok_or(PaymentsError::OrderNotFound(order_id))?;
        let order_payments = self.payments.find_by_order(&order_id).await?;
        payment.ensure_order_keeps_confirmed_payment(&order, &order_payments)
    }
}
