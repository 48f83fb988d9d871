//! ChangePaymentStatusHandler - Applies a gateway-reported status to a payment.
//!
//! Persists the new status (recomputing the fee like any other save) and then
//! runs the status reaction for the payment's order. The reaction runs on
//! every call, so duplicate gateway notifications are harmless.

use std::sync::Arc;

use crate::domain::billing::{Payment, PaymentStatus, PaymentsError};
use crate::domain::foundation::PaymentId;
use crate::ports::PaymentRepository;

use super::{
    HandleStatusChangeHandler, HandleStatusChangeResult, SavePaymentCommand, SavePaymentHandler,
};

/// Command to change a payment's status.
#[derive(Debug, Clone)]
pub struct ChangePaymentStatusCommand {
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
    /// Gateway message; keeps the stored one when `None`.
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChangePaymentStatusResult {
    pub payment: Payment,
    pub previous_status: PaymentStatus,
    pub reaction: HandleStatusChangeResult,
}

pub struct ChangePaymentStatusHandler {
    payments: Arc<dyn PaymentRepository>,
    save: Arc<SavePaymentHandler>,
    status_change: Arc<HandleStatusChangeHandler>,
}

impl ChangePaymentStatusHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        save: Arc<SavePaymentHandler>,
        status_change: Arc<HandleStatusChangeHandler>,
    ) -> Self {
        Self {
            payments,
            save,
            status_change,
        }
    }

    pub async fn handle(
        &self,
        cmd: ChangePaymentStatusCommand,
    ) -> Result<ChangePaymentStatusResult, PaymentsError> {
        let mut payment = self
            .payments
            .find_by_id(&cmd.payment_id)
            .await?
            .ok_or(PaymentsError::PaymentNotFound(cmd.payment_id))?;

        let previous_status = payment.change_status(cmd.status, cmd.message);
        tracing::info!(
            payment_id = %payment.id,
            previous_status = %previous_status,
            status = %payment.status,
            "Payment status changed"
        );

        let payment = self
            .save
            .handle(SavePaymentCommand {
                payment,
                validate: false,
            })
            .await?
            .payment;

        let reaction = self.status_change.handle(&payment).await?;

        Ok(ChangePaymentStatusResult {
            payment,
            previous_status,
            reaction,
        })
    }
}
