//! HTTP adapters - REST API implementations.

pub mod payments;

use std::time::Duration;

use axum::http::HeaderName;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use payments::payments_router;
pub use payments::PaymentsAppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Service router with request ids, request tracing and a per-request timeout.
pub fn app_router(state: PaymentsAppState, request_timeout: Duration) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    payments_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
