//! Payment handlers.
//!
//! Command and query handlers bridging plan orders and payments:
//!
//! ## Commands
//! - Saving payments (fee refresh, optional validation)
//! - Changing a payment's status and reacting on its order
//! - Creating payments for orders
//! - Renewing plans through stored tokens
//! - Storing renewal tokens
//!
//! ## Queries
//! - Payment details (gateway form) for the owner
//! - Renewal token lookup

mod change_payment_status;
mod create_payment;
mod get_payment_details;
mod handle_status_change;
mod renew_account;
mod renew_token;
mod save_payment;

// Commands
pub use change_payment_status::{
    ChangePaymentStatusCommand, ChangePaymentStatusHandler, ChangePaymentStatusResult,
};
pub use create_payment::{CreatePaymentCommand, CreatePaymentHandler, CreatePaymentResult};
pub use handle_status_change::{HandleStatusChangeHandler, HandleStatusChangeResult};
pub use renew_account::{
    RenewAccountCommand, RenewAccountDeps, RenewAccountHandler, RenewAccountResult, SkipReason,
};
pub use renew_token::{
    resolve_renewal_trigger, SetRenewTokenCommand, SetRenewTokenHandler, SetRenewTokenResult,
};
pub use save_payment::{SavePaymentCommand, SavePaymentHandler, SavePaymentResult};

// Queries
pub use get_payment_details::{
    GetPaymentDetailsHandler, GetPaymentDetailsQuery, GetPaymentDetailsResult,
};
pub use renew_token::{GetRenewTokenHandler, GetRenewTokenQuery};
