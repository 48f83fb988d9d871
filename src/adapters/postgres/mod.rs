//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresPaymentRepository` - Payments
//! - `PostgresOrderRepository` - Plan orders
//! - `PostgresRecurringPlanRepository` - Recurring-renewal records
//! - `PostgresBillingProfileReader` - Billing profiles (read-only)
//!
//! Schema lives in `migrations/`.

mod billing_profile_reader;
mod order_repository;
mod payment_repository;
mod recurring_plan_repository;

pub use billing_profile_reader::PostgresBillingProfileReader;
pub use order_repository::PostgresOrderRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use recurring_plan_repository::PostgresRecurringPlanRepository;

use std::fmt::Display;

use crate::domain::foundation::{DomainError, ErrorCode};

fn db_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, err))
}

/// A stored value that no longer parses.
fn corrupt(column: &str, err: impl Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, err),
    )
    .with_detail("column", column)
}
