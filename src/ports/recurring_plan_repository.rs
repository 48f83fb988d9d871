//! Recurring-renewal record repository port.
//!
//! Each user plan has at most one recurring record, so records are looked up
//! and replaced by user.

use async_trait::async_trait;

use crate::domain::billing::RecurringUserPlan;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait RecurringPlanRepository: Send + Sync {
    /// The user's recurring record, if one exists.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<RecurringUserPlan>, DomainError>;

    /// Insert the record or replace the user's existing one.
    async fn upsert(&self, plan: &RecurringUserPlan) -> Result<(), DomainError>;

    /// Delete the user's record. Deleting a missing record is not an error.
    async fn delete_for_user(&self, user_id: &UserId) -> Result<(), DomainError>;
}
