//! Axum router configuration for payment endpoints.

use axum::{routing::get, Router};

use super::handlers::{create_payment, health, payment_details, PaymentsAppState};

/// Create the payments router.
///
/// # Routes
///
/// ## User Endpoints (login required)
/// - `GET /payment_details/:payment_id/` - Payment form or provider redirect
/// - `GET /create_payment/:payment_variant/:order_id/` - Create a payment and
///   redirect to its details page
///
/// ## Operational
/// - `GET /health` - Liveness probe
pub fn payments_router() -> Router<PaymentsAppState> {
    Router::new()
        .route("/payment_details/:payment_id/", get(payment_details))
        .route(
            "/create_payment/:payment_variant/:order_id/",
            get(create_payment),
        )
        .route("/health", get(health))
}
