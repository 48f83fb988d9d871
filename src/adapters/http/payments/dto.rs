//! Response DTOs for the payment endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::billing::{FraudStatus, Payment, PaymentStatus};
use crate::domain::foundation::Timestamp;
use crate::ports::PaymentForm;

/// Payment as shown to its owner.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub order_id: Option<String>,
    pub variant: String,
    pub status: PaymentStatus,
    pub fraud_status: FraudStatus,
    pub description: String,
    pub currency: String,
    pub total: Decimal,
    pub tax: Decimal,
    pub created_at: Timestamp,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            order_id: payment.order_id.map(|id| id.to_string()),
            variant: payment.variant.clone(),
            status: payment.status,
            fraud_status: payment.fraud_status,
            description: payment.description.clone(),
            currency: payment.currency.clone(),
            total: payment.total,
            tax: payment.tax,
            created_at: payment.created_at,
        }
    }
}

/// Body of `GET /payment_details/:payment_id/`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentDetailsResponse {
    pub payment: PaymentResponse,
    pub form: PaymentForm,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::OrderId;

    #[test]
    fn payment_response_exposes_order_and_status() {
        let order_id = OrderId::new();
        let payment = Payment::new("default", Some(order_id));

        let json = serde_json::to_value(PaymentResponse::from(&payment)).unwrap();

        assert_eq!(json["order_id"], order_id.to_string());
        assert_eq!(json["status"], "waiting");
        assert_eq!(json["variant"], "default");
    }

    #[test]
    fn error_response_omits_missing_details() {
        let json = serde_json::to_value(ErrorResponse::new("PAYMENT_NOT_FOUND", "gone")).unwrap();
        assert!(json.get("details").is_none());

        let details = serde_json::json!({"field": "status"});
        let response = ErrorResponse::with_details("VALIDATION_FAILED", "bad", details.clone());
        assert_eq!(response.details, Some(details));
    }
}
