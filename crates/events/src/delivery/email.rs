//! Summary delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send the
//! plain-text run summary through an unauthenticated relay, the way
//! on-premises backup tooling is usually wired to a site mail server.

use async_trait::async_trait;

use super::SummaryNotifier;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (connection, relay refusal, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP relay port.
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Configuration for the SMTP summary delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    /// SMTP relay hostname.
    pub smtp_host: String,
    /// SMTP relay port (defaults to 25).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Recipient address.
    pub to_address: String,
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends the run summary by email.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmailConfig {
        &self.config
    }

    /// Assemble the plain-text message without sending it.
    pub fn build_message(&self, subject: &str, body: &str) -> Result<lettre::Message, EmailError> {
        use lettre::message::header::ContentType;

        lettre::Message::builder()
            .from(self.config.from_address.parse()?)
            .to(self.config.to_address.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))
    }
}

#[async_trait]
impl SummaryNotifier for EmailDelivery {
    async fn send_summary(&self, subject: &str, body: &str) -> Result<(), EmailError> {
        use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

        let email = self.build_message(subject, body)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
            .port(self.config.smtp_port)
            .build();
        mailer.send(email).await?;

        tracing::info!(
            to = %self.config.to_address,
            smtp_host = %self.config.smtp_host,
            "Summary email sent",
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
