//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{BillingDetails, Payment};
use crate::domain::foundation::{DomainError, ErrorCode, OrderId, PaymentId, Timestamp};
use crate::ports::PaymentRepository;

use super::{corrupt, db_error};

const SELECT_PAYMENT: &str = r#"
    SELECT id, order_id, variant, status, fraud_status, description, currency,
           total, delivery, tax, transaction_fee, autorenewed_payment,
           billing_first_name, billing_last_name, billing_email, billing_address_1,
           billing_city, billing_postcode, billing_country_code,
           customer_ip_address, extra_data, message, transaction_id,
           created_at, modified_at
    FROM payments
"#;

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: Option<Uuid>,
    variant: String,
    status: String,
    fraud_status: String,
    description: String,
    currency: String,
    total: Decimal,
    delivery: Decimal,
    tax: Decimal,
    transaction_fee: Decimal,
    autorenewed_payment: bool,
    billing_first_name: String,
    billing_last_name: String,
    billing_email: String,
    billing_address_1: String,
    billing_city: String,
    billing_postcode: String,
    billing_country_code: String,
    customer_ip_address: Option<String>,
    extra_data: String,
    message: String,
    transaction_id: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            order_id: row.order_id.map(OrderId::from_uuid),
            variant: row.variant,
            status: row.status.parse().map_err(|e| corrupt("status", e))?,
            fraud_status: row.fraud_status.parse().map_err(|e| corrupt("fraud_status", e))?,
            description: row.description,
            currency: row.currency,
            total: row.total,
            delivery: row.delivery,
            tax: row.tax,
            transaction_fee: row.transaction_fee,
            autorenewed_payment: row.autorenewed_payment,
            billing: BillingDetails {
                first_name: row.billing_first_name,
                last_name: row.billing_last_name,
                email: row.billing_email,
                address_1: row.billing_address_1,
                city: row.billing_city,
                postcode: row.billing_postcode,
                country_code: row.billing_country_code,
            },
            customer_ip_address: row.customer_ip_address,
            extra_data: row.extra_data,
            message: row.message,
            transaction_id: row.transaction_id,
            created_at: Timestamp::from_datetime(row.created_at),
            modified_at: Timestamp::from_datetime(row.modified_at),
        })
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, variant, status, fraud_status, description, currency,
                total, delivery, tax, transaction_fee, autorenewed_payment,
                billing_first_name, billing_last_name, billing_email, billing_address_1,
                billing_city, billing_postcode, billing_country_code,
                customer_ip_address, extra_data, message, transaction_id,
                created_at, modified_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
            )
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.order_id.map(|id| *id.as_uuid()))
        .bind(&payment.variant)
        .bind(payment.status.as_str())
        .bind(payment.fraud_status.as_str())
        .bind(&payment.description)
        .bind(&payment.currency)
        .bind(payment.total)
        .bind(payment.delivery)
        .bind(payment.tax)
        .bind(payment.transaction_fee)
        .bind(payment.autorenewed_payment)
        .bind(&payment.billing.first_name)
        .bind(&payment.billing.last_name)
        .bind(&payment.billing.email)
        .bind(&payment.billing.address_1)
        .bind(&payment.billing.city)
        .bind(&payment.billing.postcode)
        .bind(&payment.billing.country_code)
        .bind(&payment.customer_ip_address)
        .bind(&payment.extra_data)
        .bind(&payment.message)
        .bind(&payment.transaction_id)
        .bind(payment.created_at.as_datetime())
        .bind(payment.modified_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save payment", e))?;

        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                order_id = $2,
                status = $3,
                fraud_status = $4,
                description = $5,
                total = $6,
                delivery = $7,
                tax = $8,
                transaction_fee = $9,
                billing_first_name = $10,
                billing_last_name = $11,
                billing_email = $12,
                billing_address_1 = $13,
                billing_city = $14,
                billing_postcode = $15,
                billing_country_code = $16,
                extra_data = $17,
                message = $18,
                transaction_id = $19,
                modified_at = $20
            WHERE id = $1
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.order_id.map(|id| *id.as_uuid()))
        .bind(payment.status.as_str())
        .bind(payment.fraud_status.as_str())
        .bind(&payment.description)
        .bind(payment.total)
        .bind(payment.delivery)
        .bind(payment.tax)
        .bind(payment.transaction_fee)
        .bind(&payment.billing.first_name)
        .bind(&payment.billing.last_name)
        .bind(&payment.billing.email)
        .bind(&payment.billing.address_1)
        .bind(&payment.billing.city)
        .bind(&payment.billing.postcode)
        .bind(&payment.billing.country_code)
        .bind(&payment.extra_data)
        .bind(&payment.message)
        .bind(&payment.transaction_id)
        .bind(payment.modified_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update payment", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment not found: {}", payment.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_PAYMENT))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "{} WHERE order_id = $1 ORDER BY created_at ASC",
            SELECT_PAYMENT
        ))
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch order payments", e))?;

        rows.into_iter().map(Payment::try_from).collect()
    }
}
