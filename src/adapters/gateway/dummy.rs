//! Development gateway.
//!
//! Renders a form that lets the user pick the resulting payment status and
//! answers unattended charges with a configurable outcome. Once a payment is
//! decided, the form step sends the customer to the configured return page.
//! Supports:
//! - Status form with every payment status
//! - Redirect injection for forms and charges
//! - Error injection
//! - Call tracking, including the line items handed over

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::billing::{FraudStatus, Payment, PaymentStatus, PurchasedItem};
use crate::ports::{
    ChargeOutcome, FormChoice, FormField, FormOutcome, GatewayError, PaymentForm, PaymentGateway,
    ReturnUrls,
};

/// Dummy gateway for the `default` variant.
///
/// # Example
///
/// ```ignore
/// let gateway = DummyGateway::new();
/// gateway.set_charge_outcome(ChargeOutcome::RedirectNeeded { url: "https://3ds.test".into() });
/// let gateways = PaymentGateways::new().with_variant("default", Arc::new(gateway));
/// ```
#[derive(Clone, Default)]
pub struct DummyGateway {
    inner: Arc<Mutex<DummyState>>,
    return_urls: Option<ReturnUrls>,
}

#[derive(Default)]
struct DummyState {
    /// Redirect returned instead of the form.
    form_redirect: Option<String>,

    /// Outcome of `auto_charge`; confirms when unset.
    charge_outcome: Option<ChargeOutcome>,

    /// Error returned by `auto_charge`.
    charge_error: Option<GatewayError>,

    call_log: Vec<GatewayCall>,
}

/// Recorded gateway call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCall {
    pub method: String,
    pub payment_id: String,
    pub token: Option<String>,
    pub items: Vec<PurchasedItem>,
}

impl DummyGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send decided payments back to `urls` instead of showing the form again.
    pub fn with_return_urls(mut self, urls: ReturnUrls) -> Self {
        self.return_urls = Some(urls);
        self
    }

    fn state(&self) -> MutexGuard<'_, DummyState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `get_form` ask for a redirect to `url`.
    pub fn set_form_redirect(&self, url: impl Into<String>) {
        self.state().form_redirect = Some(url.into());
    }

    pub fn set_charge_outcome(&self, outcome: ChargeOutcome) {
        let mut state = self.state();
        state.charge_outcome = Some(outcome);
        state.charge_error = None;
    }

    pub fn set_charge_error(&self, error: GatewayError) {
        self.state().charge_error = Some(error);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    fn record(
        &self,
        method: &str,
        payment: &Payment,
        items: &[PurchasedItem],
        token: Option<&str>,
    ) {
        self.state().call_log.push(GatewayCall {
            method: method.to_string(),
            payment_id: payment.id.to_string(),
            token: token.map(str::to_string),
            items: items.to_vec(),
        });
    }

    fn status_form(payment: &Payment) -> PaymentForm {
        let status_choices = PaymentStatus::ALL
            .iter()
            .map(|status| FormChoice {
                value: status.as_str().to_string(),
                label: status.label().to_string(),
            })
            .collect();
        let fraud_choices = [
            FraudStatus::Unknown,
            FraudStatus::Accept,
            FraudStatus::Reject,
            FraudStatus::Review,
        ]
        .iter()
        .map(|status| FormChoice {
            value: status.as_str().to_string(),
            label: status.as_str().to_string(),
        })
        .collect();

        PaymentForm {
            action: String::new(),
            method: "post".to_string(),
            fields: vec![
                FormField {
                    name: "status".to_string(),
                    label: "Payment status".to_string(),
                    value: Some(payment.status.as_str().to_string()),
                    choices: status_choices,
                },
                FormField {
                    name: "fraud_status".to_string(),
                    label: "Fraud status".to_string(),
                    value: Some(payment.fraud_status.as_str().to_string()),
                    choices: fraud_choices,
                },
            ],
        }
    }
}

#[async_trait]
impl PaymentGateway for DummyGateway {
    async fn get_form(
        &self,
        payment: &Payment,
        items: &[PurchasedItem],
    ) -> Result<FormOutcome, GatewayError> {
        self.record("get_form", payment, items, None);
        if let Some(url) = self.state().form_redirect.clone() {
            return Ok(FormOutcome::RedirectNeeded { url });
        }
        let return_url = self
            .return_urls
            .as_ref()
            .and_then(|urls| urls.for_status(payment.status));
        if let Some(url) = return_url {
            return Ok(FormOutcome::RedirectNeeded {
                url: url.to_string(),
            });
        }
        Ok(FormOutcome::Form(Self::status_form(payment)))
    }

    async fn auto_charge(
        &self,
        payment: &Payment,
        items: &[PurchasedItem],
        token: &str,
    ) -> Result<ChargeOutcome, GatewayError> {
        self.record("auto_charge", payment, items, Some(token));
        let state = self.state();
        if let Some(error) = state.charge_error.clone() {
            return Err(error);
        }
        Ok(state.charge_outcome.clone().unwrap_or(ChargeOutcome::Charged {
            status: PaymentStatus::Confirmed,
            message: None,
        }))
    }
}
