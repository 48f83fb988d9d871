//! Recurring-renewal record of a user plan.
//!
//! Stores the gateway token that allows charging the user without their
//! presence, together with card metadata and who is expected to trigger
//! renewals. A token is only handed out once a confirmed payment proved it
//! works (`token_verified`).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanId, PricingId, RecurringPlanId, Timestamp, UserId};

use super::{Order, PaymentsError};

/// Name given to orders created by automatic renewal.
pub const RENEWAL_ORDER_NAME: &str = "Plan renewal";

/// Who initiates renewals of a recurring plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenewalTriggeredBy {
    /// Renewed unattended by the periodic renewal task.
    Task,
    /// Renewed by the user paying again.
    #[default]
    User,
    /// Renewed by some other mechanism (gateway-side subscriptions, ...).
    Other,
}

impl RenewalTriggeredBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenewalTriggeredBy::Task => "task",
            RenewalTriggeredBy::User => "user",
            RenewalTriggeredBy::Other => "other",
        }
    }

    /// Resolve the trigger from the legacy flag and the explicit classification.
    ///
    /// The classification wins when present. The legacy `automatic_renewal`
    /// flag maps `true` to `Task` and `false` to `User`. Every path other than
    /// an explicit classification alone carries a deprecation notice for the
    /// caller to log.
    ///
    /// # Errors
    ///
    /// `InvalidRenewalTrigger` for an unknown classification string.
    pub fn resolve(
        automatic_renewal: Option<bool>,
        classification: Option<&str>,
    ) -> Result<ResolvedTrigger, PaymentsError> {
        match (automatic_renewal, classification) {
            (None, Some(raw)) => Ok(ResolvedTrigger {
                trigger: raw.parse()?,
                deprecation: None,
            }),
            (Some(_), Some(raw)) => Ok(ResolvedTrigger {
                trigger: raw.parse()?,
                deprecation: Some(
                    "automatic_renewal is ignored because renewal_triggered_by is given".to_string(),
                ),
            }),
            (Some(automatic), None) => Ok(ResolvedTrigger {
                trigger: if automatic {
                    RenewalTriggeredBy::Task
                } else {
                    RenewalTriggeredBy::User
                },
                deprecation: Some(
                    "automatic_renewal is deprecated, pass renewal_triggered_by instead".to_string(),
                ),
            }),
            (None, None) => Ok(ResolvedTrigger {
                trigger: RenewalTriggeredBy::User,
                deprecation: Some(
                    "renewal_triggered_by not given, defaulting to user; pass it explicitly"
                        .to_string(),
                ),
            }),
        }
    }
}

impl fmt::Display for RenewalTriggeredBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenewalTriggeredBy {
    type Err = PaymentsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(RenewalTriggeredBy::Task),
            "user" => Ok(RenewalTriggeredBy::User),
            "other" => Ok(RenewalTriggeredBy::Other),
            other => Err(PaymentsError::InvalidRenewalTrigger(other.to_string())),
        }
    }
}

/// Result of [`RenewalTriggeredBy::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrigger {
    pub trigger: RenewalTriggeredBy,
    /// Warning to log when a deprecated input path was used.
    pub deprecation: Option<String>,
}

/// Card metadata reported by the gateway alongside a token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardDetails {
    pub expire_year: Option<i32>,
    pub expire_month: Option<u32>,
    pub masked_number: Option<String>,
}

/// Recurring-renewal record, one per user plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringUserPlan {
    pub id: RecurringPlanId,
    pub user_id: UserId,
    pub token: String,
    /// Variant name of the gateway that issued the token.
    pub payment_provider: String,
    pub plan_id: PlanId,
    pub pricing_id: Option<PricingId>,
    pub amount: Decimal,
    pub tax: Option<Decimal>,
    pub currency: String,
    pub card: CardDetails,
    pub renewal_triggered_by: RenewalTriggeredBy,
    pub token_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RecurringUserPlan {
    /// Record a fresh, unverified token for the plan bought by `order`.
    pub fn from_order(
        order: &Order,
        payment_provider: impl Into<String>,
        token: impl Into<String>,
        card: CardDetails,
        renewal_triggered_by: RenewalTriggeredBy,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: RecurringPlanId::new(),
            user_id: order.user_id.clone(),
            token: token.into(),
            payment_provider: payment_provider.into(),
            plan_id: order.plan_id,
            pricing_id: order.pricing_id,
            amount: order.amount,
            tax: order.tax,
            currency: order.currency.clone(),
            card,
            renewal_triggered_by,
            token_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace token, provider, card and billing parameters.
    ///
    /// A token different from the stored one starts out unverified.
    pub fn renew_with(
        &mut self,
        order: &Order,
        payment_provider: impl Into<String>,
        token: impl Into<String>,
        card: CardDetails,
        renewal_triggered_by: RenewalTriggeredBy,
    ) {
        let token = token.into();
        let payment_provider = payment_provider.into();
        if token != self.token || payment_provider != self.payment_provider {
            self.token_verified = false;
        }
        self.token = token;
        self.payment_provider = payment_provider;
        self.plan_id = order.plan_id;
        self.pricing_id = order.pricing_id;
        self.amount = order.amount;
        self.tax = order.tax;
        self.currency = order.currency.clone();
        self.card = card;
        self.renewal_triggered_by = renewal_triggered_by;
        self.updated_at = Timestamp::now();
    }

    /// The token, if it was verified and issued by `variant`.
    pub fn token_for(&self, variant: &str) -> Option<&str> {
        if self.token_verified && self.payment_provider == variant && !self.token.is_empty() {
            Some(&self.token)
        } else {
            None
        }
    }

    pub fn verify_token(&mut self) {
        self.token_verified = true;
        self.updated_at = Timestamp::now();
    }

    pub fn invalidate_token(&mut self) {
        self.token_verified = false;
        self.updated_at = Timestamp::now();
    }

    /// True when renewals run unattended.
    pub fn is_automatic(&self) -> bool {
        self.renewal_triggered_by == RenewalTriggeredBy::Task
    }

    /// New order for the next billing cycle, priced from the stored parameters.
    pub fn renewal_order(&self) -> Order {
        Order::new(
            self.user_id.clone(),
            self.plan_id,
            self.pricing_id,
            RENEWAL_ORDER_NAME,
            self.amount,
            self.tax,
            self.currency.clone(),
        )
    }
}
