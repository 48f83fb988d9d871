//! Email sender that records messages instead of delivering them.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EmailMessage, EmailSender};

#[derive(Debug, Clone, Default)]
pub struct RecordingEmailSender {
    sent: Arc<RwLock<Vec<EmailMessage>>>,
    fail: bool,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender that refuses every message.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::new(ErrorCode::EmailError, "email delivery disabled"));
        }
        self.sent.write().await.push(message.clone());
        Ok(())
    }
}
