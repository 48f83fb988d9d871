//! Payment entity.
//!
//! A payment is one attempt to pay for an order through a gateway variant.
//! It keeps the gateway payload (`extra_data`) verbatim so the transaction
//! fee can be re-derived on every save.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, PaymentId, Timestamp};

use super::fee::{self, FeeAssessment, FeePolicy};
use super::{FraudStatus, Order, PaymentStatus, PaymentsError};

/// Stock keeping unit reported for plan purchases.
pub const PLAN_SKU: &str = "BSKV";

/// IP address recorded for payments created without a client request.
pub const SYSTEM_IP_ADDRESS: &str = "127.0.0.1";

/// Billing contact copied from the user's billing profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address_1: String,
    pub city: String,
    pub postcode: String,
    pub country_code: String,
}

/// Line item handed to gateways that itemize purchases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasedItem {
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub price: Decimal,
    pub currency: String,
}

/// Payment record.
///
/// # Invariants
///
/// - `transaction_fee` has two decimal places
/// - `order_id` is `None` only when the order was deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,

    /// Owning order; nulled when the order is deleted.
    pub order_id: Option<OrderId>,

    /// Gateway variant name, e.g. `default` or `payu`.
    pub variant: String,

    pub status: PaymentStatus,

    pub fraud_status: FraudStatus,

    pub description: String,

    pub currency: String,

    pub total: Decimal,

    pub delivery: Decimal,

    pub tax: Decimal,

    pub transaction_fee: Decimal,

    /// True for payments created by automatic renewal.
    pub autorenewed_payment: bool,

    pub billing: BillingDetails,

    pub customer_ip_address: Option<String>,

    /// Raw gateway payload (JSON text), empty when none was stored.
    pub extra_data: String,

    /// Last message from the gateway.
    pub message: String,

    /// Gateway-side transaction reference.
    pub transaction_id: String,

    pub created_at: Timestamp,

    pub modified_at: Timestamp,
}

impl Payment {
    /// Create an empty waiting payment for the given variant.
    pub fn new(variant: impl Into<String>, order_id: Option<OrderId>) -> Self {
        let now = Timestamp::now();
        Self {
            id: PaymentId::new(),
            order_id,
            variant: variant.into(),
            status: PaymentStatus::Waiting,
            fraud_status: FraudStatus::Unknown,
            description: String::new(),
            currency: String::new(),
            total: Decimal::ZERO,
            delivery: Decimal::ZERO,
            tax: Decimal::ZERO,
            transaction_fee: Decimal::new(0, 2),
            autorenewed_payment: false,
            billing: BillingDetails::default(),
            customer_ip_address: None,
            extra_data: String::new(),
            message: String::new(),
            transaction_id: String::new(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Create a payment charging the full order total.
    ///
    /// The description reads `"<order name> purchase"` and delivery is zero.
    pub fn for_order(
        variant: impl Into<String>,
        order: &Order,
        billing: BillingDetails,
        customer_ip_address: Option<String>,
        autorenewed_payment: bool,
    ) -> Self {
        let mut payment = Self::new(variant, Some(order.id));
        payment.description = format!("{} purchase", order.name);
        payment.total = order.total();
        payment.tax = order.tax_total();
        payment.currency = order.currency.clone();
        payment.billing = billing;
        payment.customer_ip_address =
            Some(customer_ip_address.unwrap_or_else(|| SYSTEM_IP_ADDRESS.to_string()));
        payment.autorenewed_payment = autorenewed_payment;
        payment
    }

    /// Set a new gateway status.
    ///
    /// Returns the previous status. Status changes come from the gateway and
    /// are not validated against the order.
    pub fn change_status(&mut self, status: PaymentStatus, message: Option<String>) -> PaymentStatus {
        let previous = self.status;
        self.status = status;
        if let Some(message) = message {
            self.message = message;
        }
        self.modified_at = Timestamp::now();
        previous
    }

    /// Recompute the transaction fee from the variant and gateway payload.
    ///
    /// The fee is overwritten when the assessment yields one and left alone
    /// otherwise.
    pub fn refresh_transaction_fee(&mut self, policy: &FeePolicy) -> FeeAssessment {
        let assessment = fee::assess(policy, &self.variant, self.total, &self.extra_data);
        if let Some(fee) = assessment.fee() {
            self.transaction_fee = fee;
        }
        assessment
    }

    /// Line items for the gateway: the plan order as a single item.
    pub fn purchased_items(&self, order: &Order) -> Vec<PurchasedItem> {
        vec![PurchasedItem {
            name: order.name.clone(),
            sku: PLAN_SKU.to_string(),
            quantity: 1,
            price: order.amount,
            currency: order.currency.clone(),
        }]
    }

    /// Reject edits that leave a completed order without a confirmed payment.
    ///
    /// `order_payments` are all payments of the order; this payment is
    /// excluded by id before checking.
    pub fn ensure_order_keeps_confirmed_payment(
        &self,
        order: &Order,
        order_payments: &[Payment],
    ) -> Result<(), PaymentsError> {
        if !order.is_completed() || self.status == PaymentStatus::Confirmed {
            return Ok(());
        }
        let other_confirmed = order_payments
            .iter()
            .any(|p| p.id != self.id && p.status == PaymentStatus::Confirmed);
        if other_confirmed {
            Ok(())
        } else {
            Err(PaymentsError::validation(
                "status",
                "Can't leave confirmed order without any confirmed payment.",
            ))
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == PaymentStatus::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::OrderStatus;
    use crate::domain::foundation::{PlanId, PricingId, UserId};
    use serde_json::json;

    fn order() -> Order {
        Order::new(
            UserId::new("user-1").unwrap(),
            PlanId::new(),
            Some(PricingId::new()),
            "Premium monthly",
            Decimal::new(1000, 2),
            Some(Decimal::new(21, 0)),
            "EUR",
        )
    }

    fn completed_order() -> Order {
        let mut order = order();
        order.complete(Timestamp::now()).unwrap();
        order
    }

    fn payment_with_status(order: &Order, status: PaymentStatus) -> Payment {
        let mut payment = Payment::new("default", Some(order.id));
        payment.status = status;
        payment
    }

    #[test]
    fn new_payment_defaults() {
        let payment = Payment::new("default", None);
        assert_eq!(payment.status, PaymentStatus::Waiting);
        assert_eq!(payment.fraud_status, FraudStatus::Unknown);
        assert_eq!(payment.transaction_fee, Decimal::ZERO);
        assert!(!payment.autorenewed_payment);
    }

    #[test]
    fn for_order_copies_amounts_from_order() {
        let order = order();
        let billing = BillingDetails {
            first_name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            ..BillingDetails::default()
        };

        let payment = Payment::for_order("payu", &order, billing.clone(), None, true);

        assert_eq!(payment.order_id, Some(order.id));
        assert_eq!(payment.description, "Premium monthly purchase");
        assert_eq!(payment.total, Decimal::new(1210, 2));
        assert_eq!(payment.tax, Decimal::new(210, 2));
        assert_eq!(payment.delivery, Decimal::ZERO);
        assert_eq!(payment.currency, "EUR");
        assert_eq!(payment.billing, billing);
        assert_eq!(payment.customer_ip_address.as_deref(), Some(SYSTEM_IP_ADDRESS));
        assert!(payment.autorenewed_payment);
    }

    #[test]
    fn for_order_keeps_request_ip() {
        let payment = Payment::for_order(
            "default",
            &order(),
            BillingDetails::default(),
            Some("10.0.0.7".to_string()),
            false,
        );
        assert_eq!(payment.customer_ip_address.as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn change_status_reports_previous_and_keeps_message_when_absent() {
        let mut payment = Payment::new("default", None);
        payment.message = "pending".to_string();

        let previous = payment.change_status(PaymentStatus::Confirmed, None);

        assert_eq!(previous, PaymentStatus::Waiting);
        assert_eq!(payment.status, PaymentStatus::Confirmed);
        assert_eq!(payment.message, "pending");
    }

    #[test]
    fn refresh_fee_overwrites_on_every_save() {
        let mut payment = Payment::for_order("payu", &order(), BillingDetails::default(), None, false);
        payment.refresh_transaction_fee(&FeePolicy::default());
        let first = payment.transaction_fee;
        payment.refresh_transaction_fee(&FeePolicy::default());
        assert_eq!(payment.transaction_fee, first);
        // 12.10 * 0.029 + 0.05 = 0.4009
        assert_eq!(first, Decimal::new(40, 2));
    }

    #[test]
    fn refresh_fee_keeps_existing_fee_when_payload_is_ambiguous() {
        let mut payment = Payment::new("paypal", None);
        payment.transaction_fee = Decimal::new(120, 2);
        payment.extra_data = json!({
            "response": { "transactions": [ { "related_resources": [ {}, {} ] } ] }
        })
        .to_string();

        let assessment = payment.refresh_transaction_fee(&FeePolicy::default());

        assert!(matches!(assessment, FeeAssessment::Ambiguous { .. }));
        assert_eq!(payment.transaction_fee, Decimal::new(120, 2));
    }

    #[test]
    fn purchased_items_describe_the_order() {
        let order = order();
        let items = Payment::new("default", Some(order.id)).purchased_items(&order);
        assert_eq!(
            items,
            vec![PurchasedItem {
                name: "Premium monthly".to_string(),
                sku: "BSKV".to_string(),
                quantity: 1,
                price: Decimal::new(1000, 2),
                currency: "EUR".to_string(),
            }]
        );
    }

    #[test]
    fn last_confirmed_payment_of_completed_order_cannot_be_unconfirmed() {
        let order = completed_order();
        let mut payment = payment_with_status(&order, PaymentStatus::Confirmed);
        let siblings = vec![payment.clone(), payment_with_status(&order, PaymentStatus::Rejected)];

        payment.status = PaymentStatus::Refunded;
        let err = payment
            .ensure_order_keeps_confirmed_payment(&order, &siblings)
            .unwrap_err();

        assert_eq!(
            err,
            PaymentsError::validation(
                "status",
                "Can't leave confirmed order without any confirmed payment."
            )
        );
    }

    #[test]
    fn another_confirmed_payment_keeps_order_valid() {
        let order = completed_order();
        let mut payment = payment_with_status(&order, PaymentStatus::Confirmed);
        let siblings = vec![payment.clone(), payment_with_status(&order, PaymentStatus::Confirmed)];

        payment.status = PaymentStatus::Refunded;
        assert!(payment
            .ensure_order_keeps_confirmed_payment(&order, &siblings)
            .is_ok());
    }

    #[test]
    fn orders_that_are_not_completed_are_not_checked() {
        let order = order();
        assert_eq!(order.status, OrderStatus::New);
        let payment = payment_with_status(&order, PaymentStatus::Rejected);
        assert!(payment.ensure_order_keeps_confirmed_payment(&order, &[]).is_ok());
    }
}
