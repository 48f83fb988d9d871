//! PostgreSQL implementation of RecurringPlanRepository.
//!
//! `recurring_user_plans.user_id` is unique; `upsert` replaces the user's
//! record in place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{CardDetails, RecurringUserPlan};
use crate::domain::foundation::{
    DomainError, ErrorCode, PlanId, PricingId, RecurringPlanId, Timestamp, UserId,
};
use crate::ports::RecurringPlanRepository;

use super::{corrupt, db_error};

pub struct PostgresRecurringPlanRepository {
    pool: PgPool,
}

impl PostgresRecurringPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RecurringPlanRow {
    id: Uuid,
    user_id: String,
    token: String,
    payment_provider: String,
    plan_id: Uuid,
    pricing_id: Option<Uuid>,
    amount: Decimal,
    tax: Option<Decimal>,
    currency: String,
    card_expire_year: Option<i32>,
    card_expire_month: Option<i32>,
    card_masked_number: Option<String>,
    renewal_triggered_by: String,
    token_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// `card_expire_month` as stored in its INTEGER column.
fn expire_month_column(card: &CardDetails) -> Result<Option<i32>, DomainError> {
    card.expire_month
        .map(i32::try_from)
        .transpose()
        .map_err(|e| {
            DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Invalid card expiry month: {}", e),
            )
            .with_detail("field", "card_expire_month")
        })
}

impl TryFrom<RecurringPlanRow> for RecurringUserPlan {
    type Error = DomainError;

    fn try_from(row: RecurringPlanRow) -> Result<Self, Self::Error> {
        let expire_month = row
            .card_expire_month
            .map(u32::try_from)
            .transpose()
            .map_err(|e| corrupt("card_expire_month", e))?;

        Ok(RecurringUserPlan {
            id: RecurringPlanId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| corrupt("user_id", e))?,
            token: row.token,
            payment_provider: row.payment_provider,
            plan_id: PlanId::from_uuid(row.plan_id),
            pricing_id: row.pricing_id.map(PricingId::from_uuid),
            amount: row.amount,
            tax: row.tax,
            currency: row.currency,
            card: CardDetails {
                expire_year: row.card_expire_year,
                expire_month,
                masked_number: row.card_masked_number,
            },
            renewal_triggered_by: row
                .renewal_triggered_by
                .parse()
                .map_err(|e| corrupt("renewal_triggered_by", e))?,
            token_verified: row.token_verified,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl RecurringPlanRepository for PostgresRecurringPlanRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<RecurringUserPlan>, DomainError> {
        let row: Option<RecurringPlanRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, token, payment_provider, plan_id, pricing_id, amount, tax,
                   currency, card_expire_year, card_expire_month, card_masked_number,
                   renewal_triggered_by, token_verified, created_at, updated_at
            FROM recurring_user_plans
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch recurring plan", e))?;

        row.map(RecurringUserPlan::try_from).transpose()
    }

    async fn upsert(&self, plan: &RecurringUserPlan) -> Result<(), DomainError> {
        let expire_month = expire_month_column(&plan.card)?;

        sqlx::query(
            r#"
            INSERT INTO recurring_user_plans (
                id, user_id, token, payment_provider, plan_id, pricing_id, amount, tax,
                currency, card_expire_year, card_expire_month, card_masked_number,
                renewal_triggered_by, token_verified, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (user_id) DO UPDATE SET
                token = EXCLUDED.token,
                payment_provider = EXCLUDED.payment_provider,
                plan_id = EXCLUDED.plan_id,
                pricing_id = EXCLUDED.pricing_id,
                amount = EXCLUDED.amount,
                tax = EXCLUDED.tax,
                currency = EXCLUDED.currency,
                card_expire_year = EXCLUDED.card_expire_year,
                card_expire_month = EXCLUDED.card_expire_month,
                card_masked_number = EXCLUDED.card_masked_number,
                renewal_triggered_by = EXCLUDED.renewal_triggered_by,
                token_verified = EXCLUDED.token_verified,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(plan.id.as_uuid())
        .bind(plan.user_id.as_str())
        .bind(&plan.token)
        .bind(&plan.payment_provider)
        .bind(plan.plan_id.as_uuid())
        .bind(plan.pricing_id.map(|id| *id.as_uuid()))
        .bind(plan.amount)
        .bind(plan.tax)
        .bind(&plan.currency)
        .bind(plan.card.expire_year)
        .bind(expire_month)
        .bind(&plan.card.masked_number)
        .bind(plan.renewal_triggered_by.as_str())
        .bind(plan.token_verified)
        .bind(plan.created_at.as_datetime())
        .bind(plan.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("upsert recurring plan", e))?;

        Ok(())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM recurring_user_plans WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete recurring plan", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expire_month_fits_integer_column() {
        let card = CardDetails {
            expire_month: Some(12),
            ..CardDetails::default()
        };
        assert_eq!(expire_month_column(&card).unwrap(), Some(12));
        assert_eq!(expire_month_column(&CardDetails::default()).unwrap(), None);
    }

    #[test]
    fn out_of_range_expire_month_is_rejected() {
        let card = CardDetails {
            expire_month: Some(u32::MAX),
            ..CardDetails::default()
        };
        let err = expire_month_column(&card).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
