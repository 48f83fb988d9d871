//! PostgreSQL implementation of OrderRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::Order;
use crate::domain::foundation::{
    DomainError, ErrorCode, OrderId, PlanId, PricingId, Timestamp, UserId,
};
use crate::ports::OrderRepository;

use super::{corrupt, db_error};

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: String,
    plan_id: Uuid,
    pricing_id: Option<Uuid>,
    name: String,
    amount: Decimal,
    tax: Option<Decimal>,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: OrderId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| corrupt("user_id", e))?,
            plan_id: PlanId::from_uuid(row.plan_id),
            pricing_id: row.pricing_id.map(PricingId::from_uuid),
            name: row.name,
            amount: row.amount,
            tax: row.tax,
            currency: row.currency,
            status: row.status.parse().map_err(|e| corrupt("status", e))?,
            created_at: Timestamp::from_datetime(row.created_at),
            completed_at: row.completed_at.map(Timestamp::from_datetime),
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, plan_id, pricing_id, name, amount, tax, currency,
                status, created_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_str())
        .bind(order.plan_id.as_uuid())
        .bind(order.pricing_id.map(|id| *id.as_uuid()))
        .bind(&order.name)
        .bind(order.amount)
        .bind(order.tax)
        .bind(&order.currency)
        .bind(order.status.as_str())
        .bind(order.created_at.as_datetime())
        .bind(order.completed_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save order", e))?;

        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = $2,
                completed_at = $3
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.completed_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update order", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("Order not found: {}", order.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, plan_id, pricing_id, name, amount, tax, currency,
                   status, created_at, completed_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch order", e))?;

        row.map(Order::try_from).transpose()
    }

    async fn delete(&self, id: &OrderId) -> Result<(), DomainError> {
        // payments.order_id is ON DELETE SET NULL
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete order", e))?;

        Ok(())
    }
}
