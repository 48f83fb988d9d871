//! Billing-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | PaymentNotFound | 404 |
//! | OrderNotFound | 404 |
//! | UnknownVariant | 404 |
//! | ValidationFailed | 400 |
//! | InvalidRenewalTrigger | 400 |
//! | InvalidRefundReturn | 409 |
//! | InvalidState | 409 |
//! | Gateway | 502 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, PaymentId};

use super::OrderStatus;

/// Errors raised by payment/order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentsError {
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Unknown payment variant: {0}")]
    UnknownVariant(String),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// Refund-return was requested for an order that was never settled.
    #[error("Cannot return order {order_id} in {status} state, only completed or not valid orders can be returned")]
    InvalidRefundReturn { order_id: OrderId, status: OrderStatus },

    #[error("Unknown renewal trigger '{0}', expected one of: user, task, other")]
    InvalidRenewalTrigger(String),

    #[error("Cannot {attempted} order in {current} state")]
    InvalidState { current: String, attempted: String },

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl PaymentsError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentsError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        PaymentsError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PaymentsError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentsError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            PaymentsError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            PaymentsError::UnknownVariant(_) => ErrorCode::UnknownVariant,
            PaymentsError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PaymentsError::InvalidRefundReturn { .. } => ErrorCode::InvalidRefundReturn,
            PaymentsError::InvalidRenewalTrigger(_) => ErrorCode::InvalidRenewalTrigger,
            PaymentsError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            PaymentsError::Gateway(_) => ErrorCode::GatewayError,
            PaymentsError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for PaymentsError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => PaymentsError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::GatewayError => PaymentsError::Gateway(err.message),
            _ => PaymentsError::Infrastructure(err.to_string()),
        }
    }
}

impl From<PaymentsError> for DomainError {
    fn from(err: PaymentsError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
