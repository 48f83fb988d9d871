//! Payment configuration

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::billing::FeePolicy;
use crate::ports::ReturnUrls;

use super::error::ValidationError;

/// Gateway variants and bridge behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Registered variants, comma-separated (`default,payu`).
    #[serde(default = "default_variants")]
    pub variants: String,

    /// Return completed orders whose payment gets refunded.
    #[serde(default)]
    pub return_order_on_refund: bool,

    /// Variants whose name contains this marker are charged the flat fee.
    #[serde(default = "default_flat_fee_marker")]
    pub flat_fee_marker: String,

    #[serde(default = "default_fee_rate")]
    pub fee_rate: Decimal,

    #[serde(default = "default_fee_fixed")]
    pub fee_fixed: Decimal,

    /// Where gateways send the customer after a successful payment.
    #[serde(default = "default_success_url")]
    pub success_url: String,

    #[serde(default = "default_failure_url")]
    pub failure_url: String,
}

impl PaymentConfig {
    /// Variant names, trimmed, empty entries dropped, in configured order.
    pub fn variant_list(&self) -> Vec<String> {
        self.variants
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn fee_policy(&self) -> FeePolicy {
        FeePolicy {
            flat_fee_marker: self.flat_fee_marker.clone(),
            rate: self.fee_rate,
            fixed: self.fee_fixed,
        }
    }

    /// Return pages handed to gateways.
    pub fn return_urls(&self) -> ReturnUrls {
        ReturnUrls {
            success: self.success_url.clone(),
            failure: self.failure_url.clone(),
        }
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.variant_list().is_empty() {
            return Err(ValidationError::NoPaymentVariants);
        }
        if self.fee_rate < Decimal::ZERO || self.fee_rate > Decimal::ONE {
            return Err(ValidationError::InvalidFeeRate);
        }
        if self.fee_fixed < Decimal::ZERO {
            return Err(ValidationError::InvalidFixedFee);
        }
        if self.success_url.is_empty() {
            return Err(ValidationError::InvalidUrl("success_url"));
        }
        if self.failure_url.is_empty() {
            return Err(ValidationError::InvalidUrl("failure_url"));
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            variants: default_variants(),
            return_order_on_refund: false,
            flat_fee_marker: default_flat_fee_marker(),
            fee_rate: default_fee_rate(),
            fee_fixed: default_fee_fixed(),
            success_url: default_success_url(),
            failure_url: default_failure_url(),
        }
    }
}

fn default_variants() -> String {
    "default".to_string()
}

fn default_flat_fee_marker() -> String {
    FeePolicy::default().flat_fee_marker
}

fn default_fee_rate() -> Decimal {
    FeePolicy::default().rate
}

fn default_fee_fixed() -> Decimal {
    FeePolicy::default().fixed
}

fn default_success_url() -> String {
    "/plan/order/success/".to_string()
}

fn default_failure_url() -> String {
    "/plan/order/failure/".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_defaults_match_fee_policy_defaults() {
        let config = PaymentConfig::default();
        assert_eq!(config.fee_policy(), FeePolicy::default());
        assert!(!config.return_order_on_refund);
        assert_eq!(config.variant_list(), vec!["default"]);
    }

    #[test]
    fn test_variant_list_parsing() {
        let config = PaymentConfig {
            variants: " default, payu ,,paypal".to_string(),
            ..Default::default()
        };
        assert_eq!(config.variant_list(), vec!["default", "payu", "paypal"]);
    }

    #[test]
    fn test_validation_requires_a_variant() {
        let config = PaymentConfig {
            variants: " , ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::NoPaymentVariants));
    }

    #[test]
    fn test_validation_fee_bounds() {
        let config = PaymentConfig {
            fee_rate: dec("1.5"),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidFeeRate));

        let config = PaymentConfig {
            fee_fixed: dec("-0.01"),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidFixedFee));
    }

    #[test]
    fn test_return_urls_come_from_config() {
        let config = PaymentConfig {
            success_url: "https://shop.test/thanks/".to_string(),
            ..Default::default()
        };
        let urls = config.return_urls();
        assert_eq!(urls.success, "https://shop.test/thanks/");
        assert_eq!(urls.failure, "/plan/order/failure/");
    }

    #[test]
    fn test_validation_requires_return_urls() {
        let config = PaymentConfig {
            failure_url: String::new(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl("failure_url"))
        );
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(PaymentConfig::default().validate().is_ok());
    }
}
