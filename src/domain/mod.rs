//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors, state machines)
//! - `billing` - Payments, orders, recurring renewals, fees and status reactions

pub mod billing;
pub mod foundation;
