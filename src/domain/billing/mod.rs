//! Billing domain module.
//!
//! Payments for plan orders, the orders themselves, recurring-renewal records
//! and the rules tying them together.
//!
//! # Module Structure
//!
//! - `payment` - Payment entity and line items
//! - `order` - Order entity
//! - `recurring` - Recurring-renewal record and renewal trigger
//! - `status` - Payment, fraud and order status enums
//! - `fee` - Transaction fee calculation
//! - `reaction` - Order reaction to payment status changes

mod errors;
pub mod fee;
mod order;
mod payment;
mod reaction;
mod recurring;
mod status;

pub use errors::PaymentsError;
pub use fee::{FeeAssessment, FeePolicy};
pub use order::Order;
pub use payment::{BillingDetails, Payment, PurchasedItem, PLAN_SKU, SYSTEM_IP_ADDRESS};
pub use reaction::{react, OrderReaction, StatusReaction, TokenEffect};
pub use recurring::{
    CardDetails, RecurringUserPlan, RenewalTriggeredBy, ResolvedTrigger, RENEWAL_ORDER_NAME,
};
pub use status::{FraudStatus, OrderStatus, PaymentStatus};
