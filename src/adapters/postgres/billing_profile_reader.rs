//! PostgreSQL implementation of BillingProfileReader.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{BillingProfile, BillingProfileReader};

use super::db_error;

pub struct PostgresBillingProfileReader {
    pool: PgPool,
}

impl PostgresBillingProfileReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BillingProfileRow {
    first_name: String,
    last_name: String,
    email: String,
    street: String,
    city: String,
    zipcode: String,
    country: String,
}

impl From<BillingProfileRow> for BillingProfile {
    fn from(row: BillingProfileRow) -> Self {
        BillingProfile {
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            street: row.street,
            city: row.city,
            zipcode: row.zipcode,
            country: row.country,
        }
    }
}

#[async_trait]
impl BillingProfileReader for PostgresBillingProfileReader {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<BillingProfile>, DomainError> {
        let row: Option<BillingProfileRow> = sqlx::query_as(
            r#"
            SELECT first_name, last_name, email, street, city, zipcode, country
            FROM billing_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch billing profile", e))?;

        Ok(row.map(BillingProfile::from))
    }
}
