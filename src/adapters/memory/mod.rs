//! In-memory adapters.
//!
//! Port implementations backed by `tokio::sync::RwLock` maps. Used by the
//! test suites and for running the service without a database.

mod billing_profile_reader;
mod completion_listener;
mod email_sender;
mod order_repository;
mod payment_repository;
mod recurring_plan_repository;

pub use billing_profile_reader::InMemoryBillingProfileReader;
pub use completion_listener::RecordingCompletionListener;
pub use email_sender::RecordingEmailSender;
pub use order_repository::InMemoryOrderRepository;
pub use payment_repository::InMemoryPaymentRepository;
pub use recurring_plan_repository::InMemoryRecurringPlanRepository;
