//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory repositories, recording email sender and completion listener
//! - `postgres` - sqlx repositories
//! - `gateway` - Development payment gateway
//! - `email` - Resend email sender
//! - `plans` - Plan-system completion listener
//! - `http` - axum routes

pub mod email;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod plans;
pub mod postgres;
