//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to the payment command/query handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts, Json, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::application::handlers::payments::{
    ChangePaymentStatusHandler, CreatePaymentCommand, CreatePaymentHandler,
    GetPaymentDetailsHandler, GetPaymentDetailsQuery, GetPaymentDetailsResult,
    GetRenewTokenHandler, HandleStatusChangeHandler, RenewAccountDeps, RenewAccountHandler,
    SavePaymentHandler, SetRenewTokenHandler,
};
use crate::domain::billing::{FeePolicy, PaymentsError};
use crate::domain::foundation::{DomainError, OrderId, PaymentId, UserId};
use crate::ports::{
    BillingProfileReader, EmailSender, OrderCompletionListener, OrderRepository,
    PaymentGateways, PaymentRepository, RecurringPlanRepository,
};

use super::dto::{ErrorResponse, HealthResponse, PaymentDetailsResponse, PaymentResponse};

/// Where anonymous users are sent.
pub const LOGIN_URL: &str = "/login/";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the payment endpoints and the renewal task.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub payments: Arc<dyn PaymentRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub recurring: Arc<dyn RecurringPlanRepository>,
    pub billing_profiles: Arc<dyn BillingProfileReader>,
    pub completion: Arc<dyn OrderCompletionListener>,
    pub email: Arc<dyn EmailSender>,
    pub gateways: PaymentGateways,
    pub fee_policy: FeePolicy,
    pub return_order_on_refund: bool,
}

impl PaymentsAppState {
    pub fn save_payment_handler(&self) -> Arc<SavePaymentHandler> {
        Arc::new(SavePaymentHandler::new(
            self.payments.clone(),
            self.orders.clone(),
            self.fee_policy.clone(),
        ))
    }

    pub fn payment_details_handler(&self) -> GetPaymentDetailsHandler {
        GetPaymentDetailsHandler::new(
            self.payments.clone(),
            self.orders.clone(),
            self.gateways.clone(),
            self.save_payment_handler(),
        )
    }

    pub fn create_payment_handler(&self) -> CreatePaymentHandler {
        CreatePaymentHandler::new(
            self.orders.clone(),
            self.recurring.clone(),
            self.billing_profiles.clone(),
            self.gateways.clone(),
            self.save_payment_handler(),
        )
    }

    pub fn change_status_handler(&self) -> ChangePaymentStatusHandler {
        let status_change = HandleStatusChangeHandler::new(
            self.orders.clone(),
            self.recurring.clone(),
            self.completion.clone(),
            self.return_order_on_refund,
        );
        ChangePaymentStatusHandler::new(
            self.payments.clone(),
            self.save_payment_handler(),
            Arc::new(status_change),
        )
    }

    pub fn get_renew_token_handler(&self) -> GetRenewTokenHandler {
        GetRenewTokenHandler::new(
            self.payments.clone(),
            self.orders.clone(),
            self.recurring.clone(),
        )
    }

    pub fn set_renew_token_handler(&self) -> SetRenewTokenHandler {
        SetRenewTokenHandler::new(
            self.payments.clone(),
            self.orders.clone(),
            self.recurring.clone(),
        )
    }

    /// Renewal handler charging through every registered variant.
    pub fn renew_account_handler(&self) -> RenewAccountHandler {
        let deps = RenewAccountDeps {
            recurring: self.recurring.clone(),
            orders: self.orders.clone(),
            gateways: self.gateways.clone(),
            email: self.email.clone(),
            create_payment: Arc::new(self.create_payment_handler()),
            change_status: Arc::new(self.change_status_handler()),
        };
        let variants = self.gateways.variants().into_iter().map(str::to_string).collect();
        RenewAccountHandler::new(deps, variants)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user taken from the `X-User-Id` header set by the session
/// layer in front of this service.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection for anonymous requests: redirect to the login page and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequired {
    pub next: String,
}

impl LoginRequired {
    pub fn location(&self) -> String {
        format!("{}?next={}", LOGIN_URL, self.next)
    }
}

impl IntoResponse for LoginRequired {
    fn into_response(self) -> Response {
        Redirect::to(&self.location()).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = LoginRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| UserId::new(s).ok())
            .map(|user_id| AuthenticatedUser { user_id })
            .ok_or_else(|| LoginRequired {
                next: parts.uri.path().to_string(),
            })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /payment_details/:payment_id/ - Gateway form, or a redirect to the provider
pub async fn payment_details(
    State(state): State<PaymentsAppState>,
    user: AuthenticatedUser,
    Path(payment_id): Path<String>,
) -> Result<Response, PaymentsApiError> {
    let payment_id: PaymentId = payment_id
        .parse()
        .map_err(|_| PaymentsError::validation("payment_id", "Malformed payment id"))?;

    let handler = state.payment_details_handler();
    let query = GetPaymentDetailsQuery {
        payment_id,
        user_id: user.user_id,
    };

    let response = match handler.handle(query).await? {
        GetPaymentDetailsResult::Form { payment, form } => Json(PaymentDetailsResponse {
            payment: PaymentResponse::from(&payment),
            form,
        })
        .into_response(),
        GetPaymentDetailsResult::Redirect { url } => Redirect::to(&url).into_response(),
    };
    Ok(response)
}

/// GET /create_payment/:payment_variant/:order_id/ - Start paying an order
pub async fn create_payment(
    State(state): State<PaymentsAppState>,
    user: AuthenticatedUser,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Path((variant, order_id)): Path<(String, String)>,
) -> Result<Redirect, PaymentsApiError> {
    let order_id: OrderId = order_id
        .parse()
        .map_err(|_| PaymentsError::validation("order_id", "Malformed order id"))?;

    let handler = state.create_payment_handler();
    let cmd = CreatePaymentCommand {
        variant,
        order_id,
        requested_by: Some(user.user_id),
        customer_ip_address: connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()),
        autorenewed_payment: false,
    };

    let result = handler.handle(cmd).await?;

    Ok(Redirect::to(&format!(
        "/payment_details/{}/",
        result.payment.id
    )))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to HTTP responses.
#[derive(Debug)]
pub struct PaymentsApiError(PaymentsError);

impl From<PaymentsError> for PaymentsApiError {
    fn from(err: PaymentsError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for PaymentsApiError {
    fn from(err: DomainError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PaymentsApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PaymentsError::PaymentNotFound(_)
            | PaymentsError::OrderNotFound(_)
            | PaymentsError::UnknownVariant(_) => StatusCode::NOT_FOUND,
            PaymentsError::ValidationFailed { .. } | PaymentsError::InvalidRenewalTrigger(_) => {
                StatusCode::BAD_REQUEST
            }
            PaymentsError::InvalidRefundReturn { .. } | PaymentsError::InvalidState { .. } => {
                StatusCode::CONFLICT
            }
            PaymentsError::Gateway(_) => StatusCode::BAD_GATEWAY,
            PaymentsError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Payment request failed");
        }

        let body = match &self.0 {
            PaymentsError::ValidationFailed { field, message } => ErrorResponse::with_details(
                self.0.code().to_string(),
                message.clone(),
                serde_json::json!({ "field": field }),
            ),
            err => ErrorResponse::new(err.code().to_string(), err.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
