//! Billing profile reader port (read-only).
//!
//! Billing profiles belong to the plans system; payments copy them at
//! creation time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::billing::BillingDetails;
use crate::domain::foundation::{DomainError, UserId};

/// User's name, email and billing address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BillingProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub zipcode: String,
    pub country: String,
}

impl From<BillingProfile> for BillingDetails {
    fn from(profile: BillingProfile) -> Self {
        BillingDetails {
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            address_1: profile.street,
            city: profile.city,
            postcode: profile.zipcode,
            country_code: profile.country,
        }
    }
}

#[async_trait]
pub trait BillingProfileReader: Send + Sync {
    /// The user's billing profile, `None` when they never filled one in.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<BillingProfile>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_profile_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn BillingProfileReader) {}
    }

    #[test]
    fn profile_maps_to_payment_billing_fields() {
        let details: BillingDetails = BillingProfile {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            street: "Main 1".to_string(),
            city: "Prague".to_string(),
            zipcode: "11000".to_string(),
            country: "CZ".to_string(),
        }
        .into();

        assert_eq!(details.address_1, "Main 1");
        assert_eq!(details.postcode, "11000");
        assert_eq!(details.country_code, "CZ");
    }
}
