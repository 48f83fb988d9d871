//! Resend email sender.
//!
//! # Configuration
//!
//! ```ignore
//! let config = ResendConfig::new(api_key, "Plans <billing@example.com>")
//!     .with_base_url("https://api.resend.com");
//!
//! let sender = ResendEmailSender::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EmailMessage, EmailSender};

/// Configuration for the Resend API.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    api_key: Secret<String>,
    /// `From` header, e.g. `Plans <billing@example.com>`.
    pub from: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ResendConfig {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            from: from.into(),
            base_url: "https://api.resend.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Sends email through `POST /emails`.
pub struct ResendEmailSender {
    config: ResendConfig,
    client: Client,
}

impl ResendEmailSender {
    pub fn new(config: ResendConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DomainError::new(ErrorCode::EmailError, format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.config.base_url.trim_end_matches('/'))
    }

    fn to_request<'a>(&'a self, message: &'a EmailMessage) -> SendEmailRequest<'a> {
        SendEmailRequest {
            from: &self.config.from,
            to: [&message.to],
            subject: &message.subject,
            text: &message.body_text,
        }
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        let response = self
            .client
            .post(self.emails_url())
            .bearer_auth(self.config.api_key())
            .json(&self.to_request(message))
            .send()
            .await
            .map_err(|e| DomainError::new(ErrorCode::EmailError, format!("Resend unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::new(
                ErrorCode::EmailError,
                format!("Resend rejected email ({}): {}", status, body),
            )
            .with_detail("status", status.as_u16().to_string()));
        }

        tracing::debug!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}
