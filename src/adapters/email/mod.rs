//! Email adapters.

mod resend;

pub use resend::{ResendConfig, ResendEmailSender};
