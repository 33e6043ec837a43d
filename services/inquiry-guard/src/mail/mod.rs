// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification delivery for accepted submissions.

pub mod templates;

use crate::config::{MailConfig, MailTransport};
use crate::error::GuardError;
use async_trait::async_trait;
use lettre::message::header::{ContentType, Header, HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub use templates::{render, Locale, RenderedEmail};

/// Delivery priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
}

/// A notification ready to send.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub priority: Priority,
}

/// What the transport reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: String,
}

/// A mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one email.
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, GuardError>;

    /// Check the transport is reachable.
    async fn verify(&self) -> Result<bool, GuardError> {
        Ok(true)
    }
}

/// Development mailer that logs emails instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, GuardError> {
        let message_id = format!("<{}@console>", Uuid::new_v4());
        info!(
            to = %email.to,
            reply_to = ?email.reply_to,
            subject = %email.subject,
            priority = ?email.priority,
            message_id = %message_id,
            "--- EMAIL (console) ---\n{}\n--- END EMAIL ---",
            email.text
        );
        Ok(DeliveryReceipt { message_id })
    }
}

/// SMTP relay mailer.
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, GuardError> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| GuardError::Mail(format!("invalid from address: {}", e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| GuardError::Mail(format!("failed to create SMTP transport: {}", e)))?
            .port(config.smtp_port);
        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }
}

type HeaderParseError = Box<dyn std::error::Error + Send + Sync>;

/// `X-Priority`, read by most clients to flag urgent mail.
#[derive(Debug, Clone, PartialEq, Eq)]
struct XPriority(String);

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> Result<Self, HeaderParseError> {
        Ok(Self(s.trim().to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// `Importance`, the Outlook counterpart of `X-Priority`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Importance(String);

impl Header for Importance {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Importance")
    }

    fn parse(s: &str) -> Result<Self, HeaderParseError> {
        Ok(Self(s.trim().to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

fn build_message(
    from: &Mailbox,
    email: &OutgoingEmail,
    message_id: &str,
) -> Result<Message, GuardError> {
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| GuardError::Mail(format!("invalid recipient address: {}", e)))?;

    let mut builder = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.as_str())
        .message_id(Some(message_id.to_string()));

    if email.priority == Priority::High {
        builder = builder
            .header(XPriority("1 (Highest)".to_string()))
            .header(Importance("High".to_string()));
    }

    if let Some(reply_to) = &email.reply_to {
        // A bad reply-to only loses the convenience header.
        if let Ok(mailbox) = reply_to.parse::<Mailbox>() {
            builder = builder.reply_to(mailbox);
        }
    }

    let body = if email.html.is_empty() {
        builder.header(ContentType::TEXT_PLAIN).body(email.text.clone())
    } else {
        builder.multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))
    };
    body.map_err(|e| GuardError::Mail(format!("failed to build email: {}", e)))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, GuardError> {
        let message_id = format!("<{}@inquiry-guard>", Uuid::new_v4());
        let message = build_message(&self.from, email, &message_id)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| GuardError::Mail(format!("SMTP send failed: {}", e)))?;

        Ok(DeliveryReceipt { message_id })
    }

    async fn verify(&self) -> Result<bool, GuardError> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| GuardError::Mail(format!("SMTP connection check failed: {}", e)))
    }
}

/// Build the configured transport.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, GuardError> {
    match config.transport {
        MailTransport::Console => Ok(Arc::new(ConsoleMailer::new())),
        MailTransport::Smtp => Ok(Arc::new(SmtpMailer::new(config)?)),
    }
}
