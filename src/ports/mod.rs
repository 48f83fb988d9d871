//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `PaymentRepository` - Payment records
//! - `OrderRepository` - Plan orders
//! - `RecurringPlanRepository` - Recurring-renewal records, one per user
//! - `BillingProfileReader` - Read-only billing profiles
//!
//! ## Outbound Ports
//!
//! - `PaymentGateway` - Forms and unattended charges, registered per variant
//! - `OrderCompletionListener` - Plan activation once an order completes
//! - `EmailSender` - Renewal verification emails

mod billing_profile_reader;
mod email_sender;
mod order_completion_listener;
mod order_repository;
mod payment_gateway;
mod payment_repository;
mod recurring_plan_repository;

pub use billing_profile_reader::{BillingProfile, BillingProfileReader};
pub use email_sender::{EmailMessage, EmailSender};
pub use order_completion_listener::OrderCompletionListener;
pub use order_repository::OrderRepository;
pub use payment_gateway::{
    ChargeOutcome, FormChoice, FormField, FormOutcome, GatewayError, GatewayErrorCode,
    PaymentForm, PaymentGateway, PaymentGateways, ReturnUrls,
};
pub use payment_repository::PaymentRepository;
pub use recurring_plan_repository::RecurringPlanRepository;
