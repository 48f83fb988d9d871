//! Order entity.
//!
//! An order is one billing-cycle purchase of a plan. It is owned by the plans
//! system; this crate only moves it between statuses in reaction to payments.
//!
//! # Invariants
//!
//! - `completed_at` is set exactly once, by the first successful `complete`
//! - status changes follow `OrderStatus` state machine rules

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, PlanId, PricingId, StateMachine, Timestamp, UserId};

use super::{OrderStatus, PaymentsError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,

    /// User who placed the order.
    pub user_id: UserId,

    pub plan_id: PlanId,

    /// Pricing period bought; absent for plan-change orders.
    pub pricing_id: Option<PricingId>,

    /// Display name, used for payment descriptions and line items.
    pub name: String,

    /// Net amount.
    pub amount: Decimal,

    /// Tax rate in percent; `None` when tax does not apply.
    pub tax: Option<Decimal>,

    /// ISO 4217 currency code.
    pub currency: String,

    pub status: OrderStatus,

    pub created_at: Timestamp,

    pub completed_at: Option<Timestamp>,
}

impl Order {
    /// Create a new, unpaid order.
    pub fn new(
        user_id: UserId,
        plan_id: PlanId,
        pricing_id: Option<PricingId>,
        name: impl Into<String>,
        amount: Decimal,
        tax: Option<Decimal>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            plan_id,
            pricing_id,
            name: name.into(),
            amount,
            tax,
            currency: currency.into(),
            status: OrderStatus::New,
            created_at: Timestamp::now(),
            completed_at: None,
        }
    }

    /// Tax part of the order total, rounded to two places.
    pub fn tax_total(&self) -> Decimal {
        match self.tax {
            Some(rate) => (self.amount * rate / Decimal::ONE_HUNDRED).round_dp(2),
            None => Decimal::ZERO,
        }
    }

    /// Gross amount to charge.
    pub fn total(&self) -> Decimal {
        self.amount + self.tax_total()
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Complete the order.
    ///
    /// Returns `Ok(true)` only for the call that actually completed it; an
    /// order that was completed before is left untouched and `Ok(false)` is
    /// returned, so completion side effects can be tied to the `true` case.
    /// Orders come from the plans system and may carry a completed or
    /// returned status without `completed_at`; those count as completed.
    pub fn complete(&mut self, now: Timestamp) -> Result<bool, PaymentsError> {
        if self.completed_at.is_some()
            || matches!(self.status, OrderStatus::Completed | OrderStatus::Returned)
        {
            return Ok(false);
        }
        self.status = self
            .status
            .transition_to(OrderStatus::Completed)
            .map_err(|_| PaymentsError::invalid_state(self.status.as_str(), "complete"))?;
        self.completed_at = Some(now);
        Ok(true)
    }

    /// Return the order after its payment was refunded.
    ///
    /// # Errors
    ///
    /// `InvalidRefundReturn` unless the order is completed or not valid; the
    /// status is left unchanged in that case.
    pub fn mark_returned(&mut self) -> Result<(), PaymentsError> {
        self.status = self
            .status
            .transition_to(OrderStatus::Returned)
            .map_err(|_| PaymentsError::InvalidRefundReturn {
                order_id: self.id,
                status: self.status,
            })?;
        Ok(())
    }

    /// Cancel the order. Canceling a canceled order is a no-op returning `Ok(false)`.
    pub fn cancel(&mut self) -> Result<bool, PaymentsError> {
        if self.status == OrderStatus::Canceled {
            return Ok(false);
        }
        self.status = self
            .status
            .transition_to(OrderStatus::Canceled)
            .map_err(|_| PaymentsError::invalid_state(self.status.as_str(), "cancel"))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn order_with_status(status: OrderStatus) -> Order {
        let mut order = Order::new(
            UserId::new("user-1").unwrap(),
            PlanId::new(),
            Some(PricingId::new()),
            "Premium monthly",
            Decimal::new(1000, 2),
            None,
            "EUR",
        );
        order.status = status;
        if status == OrderStatus::Completed {
            order.completed_at = Some(Timestamp::now());
        }
        order
    }

    fn at(day: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2018, 1, day, 0, 0, 0).unwrap())
    }

    #[test]
    fn total_without_tax_is_amount() {
        let order = order_with_status(OrderStatus::New);
        assert_eq!(order.tax_total(), Decimal::ZERO);
        assert_eq!(order.total(), Decimal::new(1000, 2));
    }

    #[test]
    fn total_adds_tax_percentage() {
        let mut order = order_with_status(OrderStatus::New);
        order.tax = Some(Decimal::new(21, 0));
        assert_eq!(order.tax_total(), Decimal::new(210, 2));
        assert_eq!(order.total(), Decimal::new(1210, 2));
    }

    #[test]
    fn complete_sets_status_and_timestamp_once() {
        let mut order = order_with_status(OrderStatus::New);

        assert_eq!(order.complete(at(1)), Ok(true));
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.completed_at, Some(at(1)));

        assert_eq!(order.complete(at(2)), Ok(false));
        assert_eq!(order.completed_at, Some(at(1)));
    }

    #[test]
    fn completed_order_without_timestamp_is_not_completed_again() {
        let mut order = order_with_status(OrderStatus::New);
        order.status = OrderStatus::Completed;

        assert_eq!(order.complete(at(1)), Ok(false));
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.completed_at, None);
    }

    #[test]
    fn returned_order_stays_returned_on_completion() {
        let mut order = order_with_status(OrderStatus::Returned);

        assert_eq!(order.complete(at(1)), Ok(false));
        assert_eq!(order.status, OrderStatus::Returned);
    }

    #[test]
    fn canceled_order_can_still_be_completed() {
        let mut order = order_with_status(OrderStatus::Canceled);
        assert_eq!(order.complete(at(1)), Ok(true));
        assert!(order.is_completed());
    }

    #[test]
    fn return_from_completed_and_not_valid() {
        let mut completed = order_with_status(OrderStatus::Completed);
        completed.mark_returned().unwrap();
        assert_eq!(completed.status, OrderStatus::Returned);

        let mut not_valid = order_with_status(OrderStatus::NotValid);
        not_valid.mark_returned().unwrap();
        assert_eq!(not_valid.status, OrderStatus::Returned);
    }

    #[test]
    fn return_from_canceled_fails_without_change() {
        let mut order = order_with_status(OrderStatus::Canceled);
        let err = order.mark_returned().unwrap_err();
        assert!(matches!(
            err,
            PaymentsError::InvalidRefundReturn {
                status: OrderStatus::Canceled,
                ..
            }
        ));
        assert_eq!(order.status, OrderStatus::Canceled);
    }

    #[test]
    fn return_from_new_fails() {
        let mut order = order_with_status(OrderStatus::New);
        assert!(order.mark_returned().is_err());
        assert_eq!(order.status, OrderStatus::New);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut order = order_with_status(OrderStatus::New);
        assert_eq!(order.cancel(), Ok(true));
        assert_eq!(order.cancel(), Ok(false));
        assert_eq!(order.status, OrderStatus::Canceled);
    }

    #[test]
    fn cancel_refuses_completed_order() {
        let mut order = order_with_status(OrderStatus::Completed);
        assert!(order.cancel().is_err());
        assert_eq!(order.status, OrderStatus::Completed);
    }
}
