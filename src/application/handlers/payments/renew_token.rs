//! Renew-token accessor and mutator.
//!
//! Gateways that support unattended charges store the customer's token with
//! `SetRenewTokenHandler` and read it back through `GetRenewTokenHandler`
//! when charging. The token is only returned once a confirmed payment
//! verified it, and only to the provider that issued it.

use std::sync::Arc;

use crate::domain::billing::{
    CardDetails, Order, Payment, PaymentsError, RecurringUserPlan, RenewalTriggeredBy,
};
use crate::domain::foundation::{PaymentId, RecurringPlanId};
use crate::ports::{OrderRepository, PaymentRepository, RecurringPlanRepository};

/// Resolve the renewal trigger from the deprecated flag and the explicit
/// classification, logging any deprecation.
///
/// # Errors
///
/// `InvalidRenewalTrigger` for an unknown classification string.
pub fn resolve_renewal_trigger(
    automatic_renewal: Option<bool>,
    classification: Option<&str>,
) -> Result<RenewalTriggeredBy, PaymentsError> {
    let resolved = RenewalTriggeredBy::resolve(automatic_renewal, classification)?;
    if let Some(warning) = &resolved.deprecation {
        tracing::warn!(trigger = %resolved.trigger, "{}", warning);
    }
    Ok(resolved.trigger)
}

/// Query for the stored renewal token of a payment's user.
#[derive(Debug, Clone)]
pub struct GetRenewTokenQuery {
    pub payment_id: PaymentId,
}

pub struct GetRenewTokenHandler {
    payments: Arc<dyn PaymentRepository>,
    orders: Arc<dyn OrderRepository>,
    recurring: Arc<dyn RecurringPlanRepository>,
}

impl GetRenewTokenHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        orders: Arc<dyn OrderRepository>,
        recurring: Arc<dyn RecurringPlanRepository>,
    ) -> Self {
        Self {
            payments,
            orders,
            recurring,
        }
    }

    /// The verified token issued by the payment's variant, if any.
    pub async fn handle(&self, query: GetRenewTokenQuery) -> Result<Option<String>, PaymentsError> {
        let payment = load_payment(self.payments.as_ref(), query.payment_id).await?;
        let Some(order) = load_order(self.orders.as_ref(), &payment).await? else {
            return Ok(None);
        };
        let token = self
            .recurring
            .find_by_user(&order.user_id)
            .await?
            .and_then(|plan| plan.token_for(&payment.variant).map(str::to_string));
        Ok(token)
    }
}

/// Command to store a renewal token for a payment's user plan.
#[derive(Debug, Clone)]
pub struct SetRenewTokenCommand {
    pub payment_id: PaymentId,
    pub token: String,
    pub card: CardDetails,
    pub renewal_triggered_by: RenewalTriggeredBy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRenewTokenResult {
    pub recurring_plan_id: RecurringPlanId,
    pub token_verified: bool,
}

pub struct SetRenewTokenHandler {
    payments: Arc<dyn PaymentRepository>,
    orders: Arc<dyn OrderRepository>,
    recurring: Arc<dyn RecurringPlanRepository>,
}

impl SetRenewTokenHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        orders: Arc<dyn OrderRepository>,
        recurring: Arc<dyn RecurringPlanRepository>,
    ) -> Self {
        Self {
            payments,
            orders,
            recurring,
        }
    }

    pub async fn handle(&self, cmd: SetRenewTokenCommand) -> Result<SetRenewTokenResult, PaymentsError> {
        let payment = load_payment(self.payments.as_ref(), cmd.payment_id).await?;
        let order = load_order(self.orders.as_ref(), &payment)
            .await?
            .ok_or_else(|| PaymentsError::validation("order", "Payment has no order"))?;

        let plan = match self.recurring.find_by_user(&order.user_id).await? {
            Some(mut plan) => {
                plan.renew_with(
                    &order,
                    payment.variant.as_str(),
                    cmd.token,
                    cmd.card,
                    cmd.renewal_triggered_by,
                );
                plan
            }
            None => RecurringUserPlan::from_order(
                &order,
                payment.variant.as_str(),
                cmd.token,
                cmd.card,
                cmd.renewal_triggered_by,
            ),
        };
        self.recurring.upsert(&plan).await?;

        tracing::info!(
            user_id = %plan.user_id,
            payment_id = %payment.id,
            provider = %plan.payment_provider,
            trigger = %plan.renewal_triggered_by,
            token_verified = plan.token_verified,
            "Renewal token stored"
        );

        Ok(SetRenewTokenResult {
            recurring_plan_id: plan.id,
            token_verified: plan.token_verified,
        })
    }
}

async fn load_payment(
    payments: &dyn PaymentRepository,
    payment_id: PaymentId,
) -> Result<Payment, PaymentsError> {
    payments
        .find_by_id(&payment_id)
        .await?
        .ok_or(PaymentsError::PaymentNotFound(payment_id))
}

async fn load_order(
    orders: &dyn OrderRepository,
    payment: &Payment,
) -> Result<Option<Order>, PaymentsError> {
    match payment.order_id {
        Some(order_id) => Ok(orders.find_by_id(&order_id).await?),
        None => Ok(None),
    }
}
