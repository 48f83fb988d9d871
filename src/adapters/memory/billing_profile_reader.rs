//! In-memory billing profiles.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{BillingProfile, BillingProfileReader};

#[derive(Debug, Clone, Default)]
pub struct InMemoryBillingProfileReader {
    profiles: Arc<RwLock<HashMap<UserId, BillingProfile>>>,
}

impl InMemoryBillingProfileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user_id: UserId, profile: BillingProfile) {
        self.profiles.write().await.insert(user_id, profile);
    }
}

#[async_trait]
impl BillingProfileReader for InMemoryBillingProfileReader {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<BillingProfile>, DomainError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }
}
