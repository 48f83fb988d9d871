//! RenewAccountHandler - Unattended renewal of a user's plan.
//!
//! Triggered by the periodic renewal task for one user. Only recurring
//! records that are task-triggered and belong to a configured variant are
//! renewed; everything else is skipped without error.
//!
//! A renewal creates a new order and an auto-renewed payment for it, then
//! asks the gateway to charge the stored token:
//!
//! - charged: the reported status goes through the regular status change,
//!   which completes the order when confirmed
//! - verification needed: the user gets an email with the challenge link
//! - gateway failure: logged, the attempt is abandoned

use std::sync::Arc;

use crate::domain::billing::{Payment, PaymentStatus, PaymentsError, RecurringUserPlan};
use crate::domain::foundation::{OrderId, PaymentId, UserId};
use crate::ports::{
    ChargeOutcome, EmailMessage, EmailSender, OrderRepository, PaymentGateways,
    RecurringPlanRepository,
};

use super::{
    ChangePaymentStatusCommand, ChangePaymentStatusHandler, CreatePaymentCommand,
    CreatePaymentHandler,
};

/// Command to renew a user's plan.
#[derive(Debug, Clone)]
pub struct RenewAccountCommand {
    pub user_id: UserId,
}

/// Why a renewal was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoRecurringPlan,
    ProviderNotConfigured,
    NotTaskTriggered,
}

/// Result of a renewal attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewAccountResult {
    Skipped(SkipReason),
    /// The gateway charged the token.
    Charged {
        order_id: OrderId,
        payment_id: PaymentId,
        status: PaymentStatus,
        order_completed: bool,
    },
    /// The user has to confirm the charge at `url`.
    VerificationRequired {
        order_id: OrderId,
        payment_id: PaymentId,
        url: String,
        email_sent: bool,
    },
    /// The gateway failed; nothing was charged.
    Abandoned {
        order_id: OrderId,
        payment_id: PaymentId,
        reason: String,
    },
}

/// Collaborators of the renewal handler.
pub struct RenewAccountDeps {
    pub recurring: Arc<dyn RecurringPlanRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub gateways: PaymentGateways,
    pub email: Arc<dyn EmailSender>,
    pub create_payment: Arc<CreatePaymentHandler>,
    pub change_status: Arc<ChangePaymentStatusHandler>,
}

pub struct RenewAccountHandler {
    deps: RenewAccountDeps,
    variants: Vec<String>,
}

impl RenewAccountHandler {
    /// `variants` are the payment variants renewals may be charged through.
    pub fn new(deps: RenewAccountDeps, variants: Vec<String>) -> Self {
        Self { deps, variants }
    }

    pub async fn handle(&self, cmd: RenewAccountCommand) -> Result<RenewAccountResult, PaymentsError> {
        let Some(recurring) = self.deps.recurring.find_by_user(&cmd.user_id).await? else {
            return Ok(self.skip(&cmd.user_id, SkipReason::NoRecurringPlan));
        };
        if !self.variants.contains(&recurring.payment_provider) {
            return Ok(self.skip(&cmd.user_id, SkipReason::ProviderNotConfigured));
        }
        if !recurring.is_automatic() {
            return Ok(self.skip(&cmd.user_id, SkipReason::NotTaskTriggered));
        }

        let order = recurring.renewal_order();
        self.deps.orders.save(&order).await?;

        let payment = self
            .deps
            .create_payment
            .handle(CreatePaymentCommand {
                variant: recurring.payment_provider.clone(),
                order_id: order.id,
                requested_by: None,
                customer_ip_address: None,
                autorenewed_payment: true,
            })
            .await?
            .payment;

        tracing::info!(
            user_id = %cmd.user_id,
            order_id = %order.id,
            payment_id = %payment.id,
            variant = %payment.variant,
            "Charging renewal"
        );

        let gateway = self.deps.gateways.get(&payment.variant)?;
        let items = payment.purchased_items(&order);
        match gateway.auto_charge(&payment, &items, &recurring.token).await {
            Ok(ChargeOutcome::Charged { status, message }) => {
                let changed = self
                    .deps
                    .change_status
                    .handle(ChangePaymentStatusCommand {
                        payment_id: payment.id,
                        status,
                        message,
                    })
                    .await?;
                let order_completed = self
                    .deps
                    .orders
                    .find_by_id(&order.id)
                    .await?
                    .is_some_and(|o| o.is_completed());
                Ok(RenewAccountResult::Charged {
                    order_id: order.id,
                    payment_id: changed.payment.id,
                    status: changed.payment.status,
                    order_completed,
                })
            }
            Ok(ChargeOutcome::RedirectNeeded { url }) => {
                let email_sent = self.send_verification_email(&recurring, &payment, &url).await;
                Ok(RenewAccountResult::VerificationRequired {
                    order_id: order.id,
                    payment_id: payment.id,
                    url,
                    email_sent,
                })
            }
            Err(err) => {
                tracing::error!(
                    user_id = %cmd.user_id,
                    payment_id = %payment.id,
                    code = %err.code,
                    error = %err.message,
                    "Renewal charge failed"
                );
                Ok(RenewAccountResult::Abandoned {
                    order_id: order.id,
                    payment_id: payment.id,
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Renew each of `user_ids` in turn and return how many failed.
    ///
    /// A malformed id or a failing renewal counts as a failure and the run
    /// moves on to the next user.
    pub async fn handle_all(&self, user_ids: &[String]) -> usize {
        let mut failures = 0;
        for raw in user_ids {
            let user_id = match UserId::new(raw.as_str()) {
                Ok(user_id) => user_id,
                Err(err) => {
                    failures += 1;
                    tracing::error!(user_id = %raw, error = %err, "Invalid user id");
                    continue;
                }
            };
            match self.handle(RenewAccountCommand { user_id }).await {
                Ok(result) => tracing::info!(user_id = %raw, ?result, "Renewal finished"),
                Err(err) => {
                    failures += 1;
                    tracing::error!(user_id = %raw, error = %err, "Renewal failed");
                }
            }
        }
        failures
    }

    fn skip(&self, user_id: &UserId, reason: SkipReason) -> RenewAccountResult {
        tracing::debug!(user_id = %user_id, reason = ?reason, "Renewal skipped");
        RenewAccountResult::Skipped(reason)
    }

    async fn send_verification_email(
        &self,
        recurring: &RecurringUserPlan,
        payment: &Payment,
        url: &str,
    ) -> bool {
        if payment.billing.email.is_empty() {
            tracing::warn!(
                user_id = %recurring.user_id,
                payment_id = %payment.id,
                "Renewal needs verification but the user has no email"
            );
            return false;
        }

        let message = EmailMessage {
            to: payment.billing.email.clone(),
            subject: "Confirm your plan renewal".to_string(),
            body_text: format!(
                "Your card issuer asks you to confirm the renewal payment of {} {}.\n\n\
                 Please confirm it here: {}\n",
                payment.total, payment.currency, url
            ),
        };
        match self.deps.email.send(&message).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    user_id = %recurring.user_id,
                    payment_id = %payment.id,
                    error = %err,
                    "Failed to send renewal verification email"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::DummyGateway;
    use crate::adapters::memory::{
        InMemoryBillingProfileReader, InMemoryOrderRepository, InMemoryPaymentRepository,
        InMemoryRecurringPlanRepository, RecordingCompletionListener, RecordingEmailSender,
    };
    use crate::application::handlers::payments::{HandleStatusChangeHandler, SavePaymentHandler};
    use crate::domain::billing::{
        CardDetails, FeePolicy, Order, OrderStatus, RenewalTriggeredBy, RENEWAL_ORDER_NAME,
    };
    use crate::domain::foundation::PlanId;
    use crate::ports::{BillingProfile, GatewayError, PaymentRepository};
    use rust_decimal::Decimal;

    struct Fixture {
        payments: InMemoryPaymentRepository,
        orders: InMemoryOrderRepository,
        recurring: InMemoryRecurringPlanRepository,
        profiles: InMemoryBillingProfileReader,
        email: RecordingEmailSender,
        gateway: DummyGateway,
        listener: RecordingCompletionListener,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_email(RecordingEmailSender::new())
        }

        fn with_email(email: RecordingEmailSender) -> Self {
            let payments = InMemoryPaymentRepository::new();
            Self {
                orders: InMemoryOrderRepository::new(payments.clone()),
                payments,
                recurring: InMemoryRecurringPlanRepository::new(),
                profiles: InMemoryBillingProfileReader::new(),
                email,
                gateway: DummyGateway::new(),
                listener: RecordingCompletionListener::new(),
            }
        }

        fn handler(&self) -> RenewAccountHandler {
            let gateways = PaymentGateways::new().with_variant("payu", Arc::new(self.gateway.clone()));
            let save = Arc::new(SavePaymentHandler::new(
                Arc::new(self.payments.clone()),
                Arc::new(self.orders.clone()),
                FeePolicy::default(),
            ));
            let status_change = Arc::new(HandleStatusChangeHandler::new(
                Arc::new(self.orders.clone()),
                Arc::new(self.recurring.clone()),
                Arc::new(self.listener.clone()),
                false,
            ));
            let create_payment = Arc::new(CreatePaymentHandler::new(
                Arc::new(self.orders.clone()),
                Arc::new(self.recurring.clone()),
                Arc::new(self.profiles.clone()),
                gateways.clone(),
                save.clone(),
            ));
            let change_status = Arc::new(ChangePaymentStatusHandler::new(
                Arc::new(self.payments.clone()),
                save,
                status_change,
            ));
            RenewAccountHandler::new(
                RenewAccountDeps {
                    recurring: Arc::new(self.recurring.clone()),
                    orders: Arc::new(self.orders.clone()),
                    gateways,
                    email: Arc::new(self.email.clone()),
                    create_payment,
                    change_status,
                },
                vec!["payu".to_string()],
            )
        }

        async fn recurring(&self, provider: &str, trigger: RenewalTriggeredBy) {
            let first_order = Order::new(
                user(),
                PlanId::new(),
                None,
                "Premium",
                Decimal::new(1000, 2),
                None,
                "EUR",
            );
            let mut plan = RecurringUserPlan::from_order(
                &first_order,
                provider,
                "tok_1",
                CardDetails::default(),
                trigger,
            );
            plan.verify_token();
            self.recurring.upsert(&plan).await.unwrap();
            self.profiles
                .insert(
                    user(),
                    BillingProfile {
                        email: "jane@example.com".to_string(),
                        ..BillingProfile::default()
                    },
                )
                .await;
        }

        async fn renew(&self) -> RenewAccountResult {
            self.handler()
                .handle(RenewAccountCommand { user_id: user() })
                .await
                .unwrap()
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[tokio::test]
    async fn user_without_recurring_plan_is_skipped() {
        let f = Fixture::new();
        assert_eq!(
            f.renew().await,
            RenewAccountResult::Skipped(SkipReason::NoRecurringPlan)
        );
    }

    #[tokio::test]
    async fn user_and_other_triggered_plans_are_skipped() {
        for trigger in [RenewalTriggeredBy::User, RenewalTriggeredBy::Other] {
            let f = Fixture::new();
            f.recurring("payu", trigger).await;

            assert_eq!(
                f.renew().await,
                RenewAccountResult::Skipped(SkipReason::NotTaskTriggered)
            );
            assert_eq!(f.orders.count().await, 0);
            assert_eq!(f.payments.count().await, 0);
        }
    }

    #[tokio::test]
    async fn unconfigured_provider_is_skipped() {
        let f = Fixture::new();
        f.recurring("paypal", RenewalTriggeredBy::Task).await;

        assert_eq!(
            f.renew().await,
            RenewAccountResult::Skipped(SkipReason::ProviderNotConfigured)
        );
        assert!(!f.gateway.was_called("auto_charge"));
    }

    #[tokio::test]
    async fn task_renewal_creates_one_order_and_autorenewed_payment() {
        let f = Fixture::new();
        f.recurring("payu", RenewalTriggeredBy::Task).await;

        let result = f.renew().await;

        let RenewAccountResult::Charged {
            order_id,
            status,
            order_completed,
            ..
        } = result
        else {
            panic!("expected a charge, got {:?}", result);
        };
        assert_eq!(status, PaymentStatus::Confirmed);
        assert!(order_completed);
        assert_eq!(f.orders.count().await, 1);
        let payments = f.payments.all().await;
        assert_eq!(payments.len(), 1);
        assert!(payments[0].autorenewed_payment);
        assert_eq!(payments[0].order_id, Some(order_id));
        assert_eq!(f.listener.completed().await, vec![order_id]);
        assert_eq!(f.gateway.calls()[0].token.as_deref(), Some("tok_1"));
        let items = &f.gateway.calls()[0].items;
        assert_eq!(items[0].name, RENEWAL_ORDER_NAME);
        assert_eq!(items[0].price, Decimal::new(1000, 2));
    }

    #[tokio::test]
    async fn rejected_charge_cancels_renewal_order() {
        let f = Fixture::new();
        f.recurring("payu", RenewalTriggeredBy::Task).await;
        f.gateway.set_charge_outcome(ChargeOutcome::Charged {
            status: PaymentStatus::Rejected,
            message: Some("insufficient funds".to_string()),
        });

        let result = f.renew().await;

        let RenewAccountResult::Charged {
            order_id,
            order_completed,
            ..
        } = result
        else {
            panic!("expected a charge, got {:?}", result);
        };
        assert!(!order_completed);
        let order = f.orders.find_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Canceled);
        let plan = f.recurring.find_by_user(&user()).await.unwrap().unwrap();
        assert!(!plan.token_verified);
    }

    #[tokio::test]
    async fn verification_redirect_emails_the_user() {
        let f = Fixture::new();
        f.recurring("payu", RenewalTriggeredBy::Task).await;
        f.gateway.set_charge_outcome(ChargeOutcome::RedirectNeeded {
            url: "https://bank.test/3ds/abc".to_string(),
        });

        let result = f.renew().await;

        let RenewAccountResult::VerificationRequired {
            order_id,
            email_sent,
            ..
        } = result
        else {
            panic!("expected verification, got {:?}", result);
        };
        assert!(email_sent);
        let sent = f.email.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@example.com");
        assert!(sent[0].body_text.contains("https://bank.test/3ds/abc"));
        let order = f.orders.find_by_id(&order_id).await.unwrap().unwrap();
        assert!(!order.is_completed());
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_renewal() {
        let f = Fixture::with_email(RecordingEmailSender::failing());
        f.recurring("payu", RenewalTriggeredBy::Task).await;
        f.gateway.set_charge_outcome(ChargeOutcome::RedirectNeeded {
            url: "https://bank.test/3ds/abc".to_string(),
        });

        let result = f.renew().await;

        assert!(matches!(
            result,
            RenewAccountResult::VerificationRequired {
                email_sent: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn gateway_failure_is_swallowed() {
        let f = Fixture::new();
        f.recurring("payu", RenewalTriggeredBy::Task).await;
        f.gateway.set_charge_error(GatewayError::network("connection reset"));

        let result = f.renew().await;

        let RenewAccountResult::Abandoned { order_id, reason, .. } = result else {
            panic!("expected abandonment, got {:?}", result);
        };
        assert!(reason.contains("connection reset"));
        let order = f.orders.find_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::New);
        assert!(f.listener.completed().await.is_empty());
    }

    #[tokio::test]
    async fn batch_renewal_continues_after_malformed_id() {
        let f = Fixture::new();
        f.recurring("payu", RenewalTriggeredBy::Task).await;
        let ids = vec!["  ".to_string(), user().to_string(), "nobody".to_string()];

        let failures = f.handler().handle_all(&ids).await;

        assert_eq!(failures, 1);
        assert_eq!(f.orders.count().await, 1);
        assert!(f.gateway.was_called("auto_charge"));
    }
}
