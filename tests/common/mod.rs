//! Shared fixture: application state over in-memory adapters.

#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;

use plans_payments::adapters::gateway::DummyGateway;
use plans_payments::adapters::http::PaymentsAppState;
use plans_payments::adapters::memory::{
    InMemoryBillingProfileReader, InMemoryOrderRepository, InMemoryPaymentRepository,
    InMemoryRecurringPlanRepository, RecordingCompletionListener, RecordingEmailSender,
};
use plans_payments::domain::billing::{FeePolicy, Order};
use plans_payments::domain::foundation::{PlanId, PricingId, UserId};
use plans_payments::ports::{BillingProfile, OrderRepository, PaymentGateways};

pub struct TestApp {
    pub state: PaymentsAppState,
    pub payments: InMemoryPaymentRepository,
    pub orders: InMemoryOrderRepository,
    pub recurring: InMemoryRecurringPlanRepository,
    pub profiles: InMemoryBillingProfileReader,
    pub completion: RecordingCompletionListener,
    pub email: RecordingEmailSender,
    pub default_gateway: DummyGateway,
    pub payu_gateway: DummyGateway,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_refund_return(false)
    }

    pub fn with_refund_return(return_order_on_refund: bool) -> Self {
        let payments = InMemoryPaymentRepository::new();
        let orders = InMemoryOrderRepository::new(payments.clone());
        let recurring = InMemoryRecurringPlanRepository::new();
        let profiles = InMemoryBillingProfileReader::new();
        let completion = RecordingCompletionListener::new();
        let email = RecordingEmailSender::new();
        let default_gateway = DummyGateway::new();
        let payu_gateway = DummyGateway::new();

        let state = PaymentsAppState {
            payments: Arc::new(payments.clone()),
            orders: Arc::new(orders.clone()),
            recurring: Arc::new(recurring.clone()),
            billing_profiles: Arc::new(profiles.clone()),
            completion: Arc::new(completion.clone()),
            email: Arc::new(email.clone()),
            gateways: PaymentGateways::new()
                .with_variant("default", Arc::new(default_gateway.clone()))
                .with_variant("payu", Arc::new(payu_gateway.clone())),
            fee_policy: FeePolicy::default(),
            return_order_on_refund,
        };

        Self {
            state,
            payments,
            orders,
            recurring,
            profiles,
            completion,
            email,
            default_gateway,
            payu_gateway,
        }
    }

    /// Store a 100.00 EUR order with 23% tax for `user`.
    pub async fn order_for(&self, user: &str) -> Order {
        let order = Order::new(
            user_id(user),
            PlanId::new(),
            Some(PricingId::new()),
            "Premium",
            Decimal::new(10000, 2),
            Some(Decimal::new(23, 0)),
            "EUR",
        );
        self.orders.save(&order).await.unwrap();
        order
    }

    pub async fn with_profile(&self, user: &str, email: &str) {
        self.profiles
            .insert(
                user_id(user),
                BillingProfile {
                    first_name: "Jane".to_string(),
                    last_name: "Doe".to_string(),
                    email: email.to_string(),
                    street: "Main 1".to_string(),
                    city: "Prague".to_string(),
                    zipcode: "11000".to_string(),
                    country: "CZ".to_string(),
                },
            )
            .await;
    }
}

pub fn user_id(raw: &str) -> UserId {
    UserId::new(raw).unwrap()
}
