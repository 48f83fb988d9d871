//! Plans Payments - Bridges subscription plan orders and payment processing.
//!
//! Computes transaction fees as payments are stored, reacts to payment
//! status changes on the owning order, and renews plans by charging stored
//! recurring tokens.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
