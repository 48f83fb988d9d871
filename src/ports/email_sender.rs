//! Outbound email port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;

/// Plain-text email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one email.
    ///
    /// # Errors
    ///
    /// - `EmailError` when the provider refuses or cannot be reached
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError>;
}
