use anyhow::Context;
use askama::Template;
use async_trait::async_trait;
use folio_shared::Submission;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

mod resend;
mod service;
mod smtp;

pub use resend::ResendMailer;
pub use service::Dispatcher;
pub use smtp::SmtpMailer;

pub const NOTIFICATION_SUBJECT_PREFIX: &str = "[NEW TRANSMISSION] from";
pub const ACKNOWLEDGMENT_SUBJECT: &str = "[SYSTEM] Receipt Acknowledged // Protocol Initiated";

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The provider answered and refused the message. Carries its payload.
    #[error("provider rejected message: {0}")]
    Rejected(serde_json::Value),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Outbound delivery of one rendered HTML message.
///
/// Returns the provider-assigned message identifier.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
    ) -> Result<String, DeliveryError>;
}

/// Internal notification sent to the site owner
#[derive(Template)]
#[template(path = "emails/notification.html")]
pub struct NotificationTemplate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
    pub timestamp: String,
}

/// Acknowledgment sent back to the submitter
#[derive(Template)]
#[template(path = "emails/acknowledgment.html")]
pub struct AcknowledgmentTemplate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
    pub signature_name: &'a str,
    pub portfolio_url: &'a str,
}

pub fn notification_subject(submission: &Submission) -> String {
    format!(
        "{} {}",
        NOTIFICATION_SUBJECT_PREFIX,
        submission.display_name()
    )
}

pub fn render_notification(submission: &Submission) -> anyhow::Result<String> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("Failed to format timestamp")?;

    NotificationTemplate {
        name: submission.display_name(),
        email: submission.reply_address().unwrap_or("not provided"),
        message: &submission.message,
        timestamp,
    }
    .render()
    .context("Failed to render notification email template")
}

pub fn render_acknowledgment(
    submission: &Submission,
    signature_name: &str,
    portfolio_url: &str,
) -> anyhow::Result<String> {
    AcknowledgmentTemplate {
        name: submission.display_name(),
        email: submission.reply_address().unwrap_or_default(),
        message: &submission.message,
        signature_name,
        portfolio_url,
    }
    .render()
    .context("Failed to render acknowledgment email template")
}
