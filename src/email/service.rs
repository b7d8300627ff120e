//! Turns a submission into outbound email through the configured provider

use std::sync::Arc;

use folio_shared::{Receipt, Submission};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::{
    ACKNOWLEDGMENT_SUBJECT, Mailer, ResendMailer, SmtpMailer, notification_subject,
    render_acknowledgment, render_notification,
};
use crate::config::{MailConfig, Provider};
use crate::error::DispatchError;

/// Process-wide dispatch service.
///
/// The mailer is built on first use, and only after the credential check has
/// passed. The check itself runs on every dispatch.
pub struct Dispatcher {
    config: MailConfig,
    mailer: OnceCell<Arc<dyn Mailer>>,
}

impl Dispatcher {
    pub fn new(config: MailConfig) -> Self {
        Self {
            config,
            mailer: OnceCell::new(),
        }
    }

    /// Use the given mailer instead of building one from the provider setting.
    pub fn with_mailer(config: MailConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config,
            mailer: OnceCell::new_with(Some(mailer)),
        }
    }

    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    pub fn ensure_configured(&self) -> Result<(), DispatchError> {
        let missing = self.config.missing_credentials();
        if !missing.is_empty() {
            return Err(DispatchError::Configuration(missing));
        }

        Ok(())
    }

    async fn mailer(&self) -> Result<&Arc<dyn Mailer>, DispatchError> {
        self.mailer
            .get_or_try_init(|| async {
                let mailer: Arc<dyn Mailer> = match self.config.provider {
                    Provider::Smtp => Arc::new(SmtpMailer::new(&self.config)?),
                    Provider::Resend => Arc::new(ResendMailer::new(&self.config)?),
                };

                Ok::<_, DispatchError>(mailer)
            })
            .await
    }

    /// Send the owner notification, then the acknowledgment if enabled and
    /// the submitter left an address. No retry on failure.
    #[tracing::instrument(skip_all, fields(provider = %self.config.provider))]
    pub async fn dispatch(&self, submission: &Submission) -> Result<Receipt, DispatchError> {
        self.ensure_configured()?;
        let mailer = self.mailer().await?;

        let html = render_notification(submission)?;
        let admin = mailer
            .send(
                &self.config.owner_address,
                &notification_subject(submission),
                &html,
            )
            .await?;

        info!(message_id = %admin, "Owner notification sent");

        let user = match (self.config.acknowledge, submission.reply_address()) {
            (true, Some(recipient)) => {
                let html = render_acknowledgment(
                    submission,
                    &self.config.signature_name,
                    &self.config.portfolio_url,
                )?;

                match mailer.send(recipient, ACKNOWLEDGMENT_SUBJECT, &html).await {
                    Ok(id) => {
                        info!(message_id = %id, "Acknowledgment sent");
                        Some(id)
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            admin_message_id = %admin,
                            "Acknowledgment failed after owner notification was sent"
                        );
                        return Err(e.into());
                    }
                }
            }
            _ => None,
        };

        Ok(Receipt { admin, user })
    }
}
