//! CreatePaymentHandler - Creates a payment for a plan order.
//!
//! The payment charges the full order total and copies the user's billing
//! profile. A recurring record issued by a different provider than the
//! requested variant is deleted first, since its token cannot be used with
//! the new gateway.

use std::sync::Arc;

use crate::domain::billing::{BillingDetails, Payment, PaymentsError};
use crate::domain::foundation::{OrderId, UserId};
use crate::ports::{BillingProfileReader, OrderRepository, PaymentGateways, RecurringPlanRepository};

use super::{SavePaymentCommand, SavePaymentHandler};

/// Command to create a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentCommand {
    pub variant: String,
    pub order_id: OrderId,
    /// Requesting user; the order must belong to them. `None` for system calls.
    pub requested_by: Option<UserId>,
    /// Client address of the request; system calls record `127.0.0.1`.
    pub customer_ip_address: Option<String>,
    pub autorenewed_payment: bool,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentResult {
    pub payment: Payment,
}

pub struct CreatePaymentHandler {
    orders: Arc<dyn OrderRepository>,
    recurring: Arc<dyn RecurringPlanRepository>,
    billing_profiles: Arc<dyn BillingProfileReader>,
    gateways: PaymentGateways,
    save: Arc<SavePaymentHandler>,
}

impl CreatePaymentHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        recurring: Arc<dyn RecurringPlanRepository>,
        billing_profiles: Arc<dyn BillingProfileReader>,
        gateways: PaymentGateways,
        save: Arc<SavePaymentHandler>,
    ) -> Self {
        Self {
            orders,
            recurring,
            billing_profiles,
            gateways,
            save,
        }
    }

    pub async fn handle(&self, cmd: CreatePaymentCommand) -> Result<CreatePaymentResult, PaymentsError> {
        if !self.gateways.contains(&cmd.variant) {
            return Err(PaymentsError::UnknownVariant(cmd.variant));
        }

        let order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .filter(|order| {
                cmd.requested_by
                    .as_ref()
                    .map_or(true, |user_id| *user_id == order.user_id)
            })
            .ok_or(PaymentsError::OrderNotFound(cmd.order_id))?;

        if let Some(recurring) = self.recurring.find_by_user(&order.user_id).await? {
            if recurring.payment_provider != cmd.variant {
                tracing::info!(
                    user_id = %order.user_id,
                    old_provider = %recurring.payment_provider,
                    variant = %cmd.variant,
                    "Dropping recurring record of another provider"
                );
                self.recurring.delete_for_user(&order.user_id).await?;
            }
        }

        let billing: BillingDetails = self
            .billing_profiles
            .find_by_user(&order.user_id)
            .await?
            .map(Into::into)
            .unwrap_or_default();

        let payment = Payment::for_order(
            cmd.variant,
            &order,
            billing,
            cmd.customer_ip_address,
            cmd.autorenewed_payment,
        );

        let payment = self
            .save
            .handle(SavePaymentCommand {
                payment,
                validate: false,
            })
            .await?
            .payment;

        tracing::info!(
            payment_id = %payment.id,
            order_id = %order.id,
            variant = %payment.variant,
            autorenewed = payment.autorenewed_payment,
            "Payment created"
        );

        Ok(CreatePaymentResult { payment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::DummyGateway;
    use crate::adapters::memory::{
        InMemoryBillingProfileReader, InMemoryOrderRepository, InMemoryPaymentRepository,
        InMemoryRecurringPlanRepository,
    };
    use crate::domain::billing::{
        CardDetails, FeePolicy, Order, RecurringUserPlan, RenewalTriggeredBy, SYSTEM_IP_ADDRESS,
    };
    use crate::domain::foundation::PlanId;
    use crate::ports::{BillingProfile, PaymentRepository};
    use rust_decimal::Decimal;

    struct Fixture {
        payments: InMemoryPaymentRepository,
        orders: InMemoryOrderRepository,
        recurring: InMemoryRecurringPlanRepository,
        profiles: InMemoryBillingProfileReader,
        handler: CreatePaymentHandler,
    }

    fn fixture() -> Fixture {
        let payments = InMemoryPaymentRepository::new();
        let orders = InMemoryOrderRepository::new(payments.clone());
        let recurring = InMemoryRecurringPlanRepository::new();
        let profiles = InMemoryBillingProfileReader::new();
        let gateways = PaymentGateways::new()
            .with_variant("default", Arc::new(DummyGateway::new()))
            .with_variant("payu", Arc::new(DummyGateway::new()));
        let save = Arc::new(SavePaymentHandler::new(
            Arc::new(payments.clone()),
            Arc::new(orders.clone()),
            FeePolicy::default(),
        ));
        let handler = CreatePaymentHandler::new(
            Arc::new(orders.clone()),
            Arc::new(recurring.clone()),
            Arc::new(profiles.clone()),
            gateways,
            save,
        );
        Fixture {
            payments,
            orders,
            recurring,
            profiles,
            handler,
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    async fn saved_order(f: &Fixture) -> Order {
        let order = Order::new(
            user(),
            PlanId::new(),
            None,
            "Premium yearly",
            Decimal::new(10000, 2),
            Some(Decimal::new(21, 0)),
            "EUR",
        );
        f.orders.save(&order).await.unwrap();
        order
    }

    fn command(variant: &str, order: &Order) -> CreatePaymentCommand {
        CreatePaymentCommand {
            variant: variant.to_string(),
            order_id: order.id,
            requested_by: Some(user()),
            customer_ip_address: Some("192.0.2.1".to_string()),
            autorenewed_payment: false,
        }
    }

    #[tokio::test]
    async fn creates_payment_from_order_and_profile() {
        let f = fixture();
        let order = saved_order(&f).await;
        f.profiles
            .insert(
                user(),
                BillingProfile {
                    first_name: "Jane".to_string(),
                    last_name: "Doe".to_string(),
                    email: "jane@example.com".to_string(),
                    street: "Main 1".to_string(),
                    city: "Prague".to_string(),
                    zipcode: "11000".to_string(),
                    country: "CZ".to_string(),
                },
            )
            .await;

        let payment = f.handler.handle(command("default", &order)).await.unwrap().payment;

        assert_eq!(payment.description, "Premium yearly purchase");
        assert_eq!(payment.total, Decimal::new(12100, 2));
        assert_eq!(payment.tax, Decimal::new(2100, 2));
        assert_eq!(payment.billing.city, "Prague");
        assert_eq!(payment.customer_ip_address.as_deref(), Some("192.0.2.1"));
        assert!(f.payments.find_by_id(&payment.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_profile_leaves_billing_empty() {
        let f = fixture();
        let order = saved_order(&f).await;

        let payment = f.handler.handle(command("default", &order)).await.unwrap().payment;

        assert_eq!(payment.billing, BillingDetails::default());
    }

    #[tokio::test]
    async fn system_payment_records_local_ip() {
        let f = fixture();
        let order = saved_order(&f).await;
        let mut cmd = command("default", &order);
        cmd.requested_by = None;
        cmd.customer_ip_address = None;
        cmd.autorenewed_payment = true;

        let payment = f.handler.handle(cmd).await.unwrap().payment;

        assert_eq!(payment.customer_ip_address.as_deref(), Some(SYSTEM_IP_ADDRESS));
        assert!(payment.autorenewed_payment);
    }

    #[tokio::test]
    async fn other_users_order_is_not_found() {
        let f = fixture();
        let order = saved_order(&f).await;
        let mut cmd = command("default", &order);
        cmd.requested_by = Some(UserId::new("intruder").unwrap());

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert_eq!(err, PaymentsError::OrderNotFound(order.id));
        assert_eq!(f.payments.count().await, 0);
    }

    #[tokio::test]
    async fn unknown_variant_is_rejected() {
        let f = fixture();
        let order = saved_order(&f).await;

        let err = f.handler.handle(command("paypal", &order)).await.unwrap_err();

        assert_eq!(err, PaymentsError::UnknownVariant("paypal".to_string()));
    }

    #[tokio::test]
    async fn switching_provider_drops_recurring_record() {
        let f = fixture();
        let order = saved_order(&f).await;
        let plan = RecurringUserPlan::from_order(
            &order,
            "payu",
            "tok_1",
            CardDetails::default(),
            RenewalTriggeredBy::Task,
        );
        f.recurring.upsert(&plan).await.unwrap();

        f.handler.handle(command("default", &order)).await.unwrap();

        assert!(f.recurring.find_by_user(&user()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn same_provider_keeps_recurring_record() {
        let f = fixture();
        let order = saved_order(&f).await;
        let plan = RecurringUserPlan::from_order(
            &order,
            "payu",
            "tok_1",
            CardDetails::default(),
            RenewalTriggeredBy::Task,
        );
        f.recurring.upsert(&plan).await.unwrap();

        f.handler.handle(command("payu", &order)).await.unwrap();

        assert!(f.recurring.find_by_user(&user()).await.unwrap().is_some());
    }
}
