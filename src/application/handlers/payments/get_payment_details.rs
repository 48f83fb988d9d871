//! GetPaymentDetailsHandler - Payment form for the payment's owner.
//!
//! Payments are only visible to the user who placed their order; anybody
//! else gets `PaymentNotFound`, the same as for a missing payment.

use std::sync::Arc;

use crate::domain::billing::{Payment, PaymentsError};
use crate::domain::foundation::{PaymentId, UserId};
use crate::ports::{FormOutcome, OrderRepository, PaymentForm, PaymentGateways, PaymentRepository};

use super::{SavePaymentCommand, SavePaymentHandler};

/// Query for a payment's detail page.
#[derive(Debug, Clone)]
pub struct GetPaymentDetailsQuery {
    pub payment_id: PaymentId,
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub enum GetPaymentDetailsResult {
    Form { payment: Payment, form: PaymentForm },
    /// The gateway sends the customer elsewhere; the payment was saved.
    Redirect { url: String },
}

pub struct GetPaymentDetailsHandler {
    payments: Arc<dyn PaymentRepository>,
    orders: Arc<dyn OrderRepository>,
    gateways: PaymentGateways,
    save: Arc<SavePaymentHandler>,
}

impl GetPaymentDetailsHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        orders: Arc<dyn OrderRepository>,
        gateways: PaymentGateways,
        save: Arc<SavePaymentHandler>,
    ) -> Self {
        Self {
            payments,
            orders,
            gateways,
            save,
        }
    }

    pub async fn handle(
        &self,
        query: GetPaymentDetailsQuery,
    ) -> Result<GetPaymentDetailsResult, PaymentsError> {
        let not_found = PaymentsError::PaymentNotFound(query.payment_id);

        let payment = self
            .payments
            .find_by_id(&query.payment_id)
            .await?
            .ok_or_else(|| not_found.clone())?;
        let Some(order_id) = payment.order_id else {
            return Err(not_found);
        };
        let Some(order) = self
            .orders
            .find_by_id(&order_id)
            .await?
            .filter(|order| order.user_id == query.user_id)
        else {
            return Err(not_found);
        };

        let gateway = self.gateways.get(&payment.variant)?;
        let items = payment.purchased_items(&order);
        match gateway.get_form(&payment, &items).await? {
            FormOutcome::Form(form) => Ok(GetPaymentDetailsResult::Form { payment, form }),
            FormOutcome::RedirectNeeded { url } => {
                self.save
                    .handle(SavePaymentCommand {
                        payment,
                        validate: false,
                    })
                    .await?;
                Ok(GetPaymentDetailsResult::Redirect { url })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::DummyGateway;
    use crate::adapters::memory::{InMemoryOrderRepository, InMemoryPaymentRepository};
    use crate::domain::billing::{FeePolicy, Order};
    use crate::domain::foundation::PlanId;
    use rust_decimal::Decimal;

    struct Fixture {
        payments: InMemoryPaymentRepository,
        orders: InMemoryOrderRepository,
        gateway: DummyGateway,
        handler: GetPaymentDetailsHandler,
    }

    fn fixture() -> Fixture {
        let payments = InMemoryPaymentRepository::new();
        let orders = InMemoryOrderRepository::new(payments.clone());
        let gateway = DummyGateway::new();
        let save = Arc::new(SavePaymentHandler::new(
            Arc::new(payments.clone()),
            Arc::new(orders.clone()),
            FeePolicy::default(),
        ));
        let handler = GetPaymentDetailsHandler::new(
            Arc::new(payments.clone()),
            Arc::new(orders.clone()),
            PaymentGateways::new().with_variant("default", Arc::new(gateway.clone())),
            save,
        );
        Fixture {
            payments,
            orders,
            gateway,
            handler,
        }
    }

    fn owner() -> UserId {
        UserId::new("owner").unwrap()
    }

    async fn owned_payment(f: &Fixture, variant: &str) -> Payment {
        let order = Order::new(owner(), PlanId::new(), None, "Premium", Decimal::ONE, None, "EUR");
        f.orders.save(&order).await.unwrap();
        let payment = Payment::new(variant, Some(order.id));
        f.payments.save(&payment).await.unwrap();
        payment
    }

    fn query(payment: &Payment, user: UserId) -> GetPaymentDetailsQuery {
        GetPaymentDetailsQuery {
            payment_id: payment.id,
            user_id: user,
        }
    }

    #[tokio::test]
    async fn owner_gets_form() {
        let f = fixture();
        let payment = owned_payment(&f, "default").await;

        let result = f.handler.handle(query(&payment, owner())).await.unwrap();

        assert!(matches!(result, GetPaymentDetailsResult::Form { .. }));
    }

    #[tokio::test]
    async fn gateway_receives_the_order_as_line_item() {
        let f = fixture();
        let payment = owned_payment(&f, "default").await;

        f.handler.handle(query(&payment, owner())).await.unwrap();

        let items = &f.gateway.calls()[0].items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Premium");
        assert_eq!(items[0].sku, "BSKV");
        assert_eq!(items[0].price, Decimal::ONE);
    }

    #[tokio::test]
    async fn other_user_gets_not_found() {
        let f = fixture();
        let payment = owned_payment(&f, "default").await;

        let err = f
            .handler
            .handle(query(&payment, UserId::new("someone-else").unwrap()))
            .await
            .unwrap_err();

        assert_eq!(err, PaymentsError::PaymentNotFound(payment.id));
        assert!(!f.gateway.was_called("get_form"));
    }

    #[tokio::test]
    async fn payment_without_order_is_not_found() {
        let f = fixture();
        let payment = Payment::new("default", None);
        f.payments.save(&payment).await.unwrap();

        let err = f.handler.handle(query(&payment, owner())).await.unwrap_err();

        assert!(matches!(err, PaymentsError::PaymentNotFound(_)));
    }

    #[tokio::test]
    async fn gateway_redirect_saves_payment_and_redirects() {
        let f = fixture();
        let payment = owned_payment(&f, "default").await;
        f.gateway.set_form_redirect("https://gateway.test/pay/1");

        let result = f.handler.handle(query(&payment, owner())).await.unwrap();

        let GetPaymentDetailsResult::Redirect { url } = result else {
            panic!("expected redirect");
        };
        assert_eq!(url, "https://gateway.test/pay/1");
    }

    #[tokio::test]
    async fn unknown_variant_is_reported() {
        let f = fixture();
        let payment = owned_payment(&f, "paypal").await;

        let err = f.handler.handle(query(&payment, owner())).await.unwrap_err();

        assert_eq!(err, PaymentsError::UnknownVariant("paypal".to_string()));
    }
}
