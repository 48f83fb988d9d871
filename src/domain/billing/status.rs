//! Payment and order status enums.
//!
//! `PaymentStatus` is driven by the payment gateways and has no transition
//! rules of its own. `OrderStatus` is a state machine: the status reaction
//! table only ever asks it for moves listed in `can_transition_to`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Status of a single payment attempt as reported by its gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Waiting for the customer or the gateway to confirm.
    #[default]
    Waiting,
    /// Funds reserved but not yet captured.
    Preauth,
    /// Payment settled.
    Confirmed,
    /// Declined by the gateway or the customer.
    Rejected,
    /// Money returned to the customer.
    Refunded,
    /// Gateway reported a processing error.
    Error,
    /// Awaiting customer input (card form, redirect, ...).
    Input,
}

impl PaymentStatus {
    /// All statuses in the order gateways present them in status forms.
    pub const ALL: [PaymentStatus; 7] = [
        PaymentStatus::Waiting,
        PaymentStatus::Preauth,
        PaymentStatus::Confirmed,
        PaymentStatus::Rejected,
        PaymentStatus::Refunded,
        PaymentStatus::Error,
        PaymentStatus::Input,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Waiting => "waiting",
            PaymentStatus::Preauth => "preauth",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Error => "error",
            PaymentStatus::Input => "input",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Waiting => "Waiting for confirmation",
            PaymentStatus::Preauth => "Pre-authorized",
            PaymentStatus::Confirmed => "Confirmed",
            PaymentStatus::Rejected => "Rejected",
            PaymentStatus::Refunded => "Refunded",
            PaymentStatus::Error => "Error",
            PaymentStatus::Input => "Input",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("status", format!("unknown payment status '{}'", s)))
    }
}

/// Fraud screening verdict attached to a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FraudStatus {
    #[default]
    Unknown,
    Accept,
    Reject,
    Review,
}

impl FraudStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudStatus::Unknown => "unknown",
            FraudStatus::Accept => "accept",
            FraudStatus::Reject => "reject",
            FraudStatus::Review => "review",
        }
    }
}

impl FromStr for FraudStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(FraudStatus::Unknown),
            "accept" => Ok(FraudStatus::Accept),
            "reject" => Ok(FraudStatus::Reject),
            "review" => Ok(FraudStatus::Review),
            other => Err(ValidationError::invalid_format(
                "fraud_status",
                format!("unknown fraud status '{}'", other),
            )),
        }
    }
}

/// Lifecycle status of a plan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, not paid yet.
    #[default]
    New,
    /// Paid and applied to the user's plan.
    Completed,
    /// Paid but could not be applied (plan change no longer possible, ...).
    NotValid,
    /// Payment failed or was abandoned.
    Canceled,
    /// Money handed back after completion.
    Returned,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Completed => "completed",
            OrderStatus::NotValid => "not_valid",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Returned => "returned",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(OrderStatus::New),
            "completed" => Ok(OrderStatus::Completed),
            "not_valid" => Ok(OrderStatus::NotValid),
            "canceled" => Ok(OrderStatus::Canceled),
            "returned" => Ok(OrderStatus::Returned),
            other => Err(ValidationError::invalid_format(
                "order_status",
                format!("unknown order status '{}'", other),
            )),
        }
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            // From NEW
            (New, Completed)
                | (New, Canceled)
                | (New, NotValid)
            // From NOT_VALID
                | (NotValid, Completed)
                | (NotValid, Canceled)
                | (NotValid, Returned)
            // From CANCELED: a later payment can still succeed
                | (Canceled, Completed)
                | (Canceled, NotValid)
            // From COMPLETED
                | (Completed, Returned)
            // From RETURNED
                | (Returned, Canceled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            New => vec![Completed, Canceled, NotValid],
            NotValid => vec![Completed, Canceled, Returned],
            Canceled => vec![Completed, NotValid],
            Completed => vec![Returned],
            Returned => vec![Canceled],
        }
    }
}
