//! In-memory recurring-renewal records, keyed by user.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::billing::RecurringUserPlan;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::RecurringPlanRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryRecurringPlanRepository {
    plans: Arc<RwLock<HashMap<UserId, RecurringUserPlan>>>,
}

impl InMemoryRecurringPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecurringPlanRepository for InMemoryRecurringPlanRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<RecurringUserPlan>, DomainError> {
        Ok(self.plans.read().await.get(user_id).cloned())
    }

    async fn upsert(&self, plan: &RecurringUserPlan) -> Result<(), DomainError> {
        self.plans
            .write()
            .await
            .insert(plan.user_id.clone(), plan.clone());
        Ok(())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<(), DomainError> {
        self.plans.write().await.remove(user_id);
        Ok(())
    }
}
