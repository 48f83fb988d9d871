//! Payment gateway port.
//!
//! A gateway turns a payment into something the customer can act on (a form,
//! or a redirect to the provider) and, for providers that support wallets,
//! charges a stored token without the customer being present.
//!
//! Gateways are registered by variant name in [`PaymentGateways`]; the
//! variant stored on each payment selects its gateway.
//!
//! # Design
//!
//! - **Redirects are outcomes**: a gateway asking for a redirect is not an
//!   error, it is a variant of [`FormOutcome`] / [`ChargeOutcome`]
//! - **Status through the caller**: gateways report statuses, the application
//!   layer persists them and runs the status reaction

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::billing::{Payment, PaymentStatus, PaymentsError, PurchasedItem};

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Build the payment form shown to the customer for `items`.
    async fn get_form(
        &self,
        payment: &Payment,
        items: &[PurchasedItem],
    ) -> Result<FormOutcome, GatewayError>;

    /// Charge the stored `token` for `payment` without customer interaction.
    async fn auto_charge(
        &self,
        payment: &Payment,
        items: &[PurchasedItem],
        token: &str,
    ) -> Result<ChargeOutcome, GatewayError>;
}

/// Pages the provider sends the customer back to once a payment is decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnUrls {
    pub success: String,
    pub failure: String,
}

impl ReturnUrls {
    /// Return page for a payment in `status`; `None` while it is undecided.
    pub fn for_status(&self, status: PaymentStatus) -> Option<&str> {
        match status {
            PaymentStatus::Confirmed | PaymentStatus::Preauth => Some(&self.success),
            PaymentStatus::Rejected | PaymentStatus::Error | PaymentStatus::Refunded => {
                Some(&self.failure)
            }
            PaymentStatus::Waiting | PaymentStatus::Input => None,
        }
    }
}

/// Result of asking a gateway for its payment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormOutcome {
    Form(PaymentForm),
    /// The customer must continue at the provider.
    RedirectNeeded { url: String },
}

/// Result of an unattended charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChargeOutcome {
    /// The gateway processed the charge and reports the resulting status.
    Charged {
        status: PaymentStatus,
        #[serde(default)]
        message: Option<String>,
    },
    /// The card issuer requires the customer to verify the charge.
    RedirectNeeded { url: String },
}

/// Form description rendered by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    /// Where the form posts to.
    pub action: String,
    pub method: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: Option<String>,
    /// Allowed values for select fields, empty for free input.
    pub choices: Vec<FormChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormChoice {
    pub value: String,
    pub label: String,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn card_declined(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::CardDeclined, message)
    }

    /// The gateway cannot charge stored tokens.
    pub fn not_supported(operation: &str) -> Self {
        Self::new(
            GatewayErrorCode::NotSupported,
            format!("{} is not supported by this gateway", operation),
        )
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for PaymentsError {
    fn from(err: GatewayError) -> Self {
        PaymentsError::Gateway(err.to_string())
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Provider unreachable.
    NetworkError,

    /// Card was declined.
    CardDeclined,

    /// Operation not offered by this gateway.
    NotSupported,
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::CardDeclined => "card_declined",
            GatewayErrorCode::NotSupported => "not_supported",
        };
        write!(f, "{}", s)
    }
}

/// Gateways by variant name.
#[derive(Clone, Default)]
pub struct PaymentGateways {
    gateways: BTreeMap<String, Arc<dyn PaymentGateway>>,
}

impl PaymentGateways {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `gateway` under `variant`, replacing any previous one.
    pub fn with_variant(mut self, variant: impl Into<String>, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateways.insert(variant.into(), gateway);
        self
    }

    /// Gateway for `variant`.
    ///
    /// # Errors
    ///
    /// `UnknownVariant` when nothing is registered under that name.
    pub fn get(&self, variant: &str) -> Result<Arc<dyn PaymentGateway>, PaymentsError> {
        self.gateways
            .get(variant)
            .cloned()
            .ok_or_else(|| PaymentsError::UnknownVariant(variant.to_string()))
    }

    pub fn contains(&self, variant: &str) -> bool {
        self.gateways.contains_key(variant)
    }

    /// Registered variant names, sorted.
    pub fn variants(&self) -> Vec<&str> {
        self.gateways.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for PaymentGateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGateways")
            .field("variants", &self.variants())
            .finish()
    }
}
