//! HTTP adapter for payment endpoints.
//!
//! - `GET /payment_details/:payment_id/` - Payment form for the order owner
//! - `GET /create_payment/:payment_variant/:order_id/` - Create a payment for an order
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{AuthenticatedUser, LoginRequired, PaymentsApiError, PaymentsAppState};
pub use routes::payments_router;
