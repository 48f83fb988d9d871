//! Transaction fee calculation.
//!
//! Runs before every save of a payment. Two sources exist:
//!
//! - flat-fee providers (variant name contains the configured marker) pay
//!   `total * rate + fixed`
//! - other gateways may report the fee in their response payload at
//!   `response.transactions[0].related_resources[0].sale.transaction_fee.value`
//!
//! Both paths overwrite the stored fee, so saving the same payment any number
//! of times yields the same fee.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Parameters of the flat-fee formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeePolicy {
    /// Substring of the variant name identifying flat-fee providers.
    pub flat_fee_marker: String,
    /// Percentage part, as a fraction (0.029 = 2.9 %).
    pub rate: Decimal,
    /// Fixed part per transaction.
    pub fixed: Decimal,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            flat_fee_marker: "payu".to_string(),
            rate: Decimal::new(29, 3),
            fixed: Decimal::new(5, 2),
        }
    }
}

impl FeePolicy {
    pub fn is_flat_fee_variant(&self, variant: &str) -> bool {
        !self.flat_fee_marker.is_empty() && variant.contains(&self.flat_fee_marker)
    }

    /// Flat fee for the given total, rounded to two places.
    pub fn flat_fee(&self, total: Decimal) -> Decimal {
        (total * self.rate + self.fixed).round_dp(2)
    }
}

/// Outcome of inspecting a payment for its fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeAssessment {
    /// Flat-fee provider; the fee is the formula result.
    Flat(Decimal),
    /// Fee reported by the gateway payload.
    Reported(Decimal),
    /// No payload stored yet.
    NoPayload,
    /// Payload does not carry the fee keys.
    NotReported,
    /// Not exactly one related resource, so no single fee applies.
    Ambiguous { related_resources: usize },
    /// Payload or fee value could not be parsed.
    Unreadable(String),
}

impl FeeAssessment {
    /// Fee to store, if this assessment determines one.
    pub fn fee(&self) -> Option<Decimal> {
        match self {
            FeeAssessment::Flat(fee) | FeeAssessment::Reported(fee) => Some(*fee),
            _ => None,
        }
    }
}

/// Determine the transaction fee of a payment.
pub fn assess(policy: &FeePolicy, variant: &str, total: Decimal, extra_data: &str) -> FeeAssessment {
    if policy.is_flat_fee_variant(variant) {
        return FeeAssessment::Flat(policy.flat_fee(total));
    }
    if extra_data.trim().is_empty() {
        return FeeAssessment::NoPayload;
    }
    match serde_json::from_str::<Value>(extra_data) {
        Ok(payload) => reported_fee(&payload),
        Err(e) => FeeAssessment::Unreadable(format!("payload is not JSON: {}", e)),
    }
}

fn reported_fee(payload: &Value) -> FeeAssessment {
    let resources = payload
        .get("response")
        .and_then(|response| response.get("transactions"))
        .and_then(Value::as_array)
        .and_then(|transactions| transactions.first())
        .and_then(|transaction| transaction.get("related_resources"))
        .and_then(Value::as_array);

    let Some(resources) = resources else {
        return FeeAssessment::NotReported;
    };
    if resources.len() != 1 {
        return FeeAssessment::Ambiguous {
            related_resources: resources.len(),
        };
    }

    let value = resources[0]
        .get("sale")
        .and_then(|sale| sale.get("transaction_fee"))
        .and_then(|fee| fee.get("value"));

    match value {
        None => FeeAssessment::NotReported,
        Some(Value::String(raw)) => parse_fee(raw),
        Some(Value::Number(number)) => parse_fee(&number.to_string()),
        Some(other) => FeeAssessment::Unreadable(format!("fee value {} is not a number", other)),
    }
}

fn parse_fee(raw: &str) -> FeeAssessment {
    match Decimal::from_str(raw.trim()) {
        Ok(fee) => FeeAssessment::Reported(fee.round_dp(2)),
        Err(e) => FeeAssessment::Unreadable(format!("fee value '{}': {}", raw, e)),
    }
}
