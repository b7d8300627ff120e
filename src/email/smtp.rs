//! Relay-account delivery using lettre

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    Address, Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use super::{DeliveryError, Mailer};
use crate::config::MailConfig;

const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let address: Address = config
            .smtp_username
            .parse()
            .context("mail.smtp_username must be the relay account address")?;

        let credentials =
            Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        // Port 465 speaks TLS from the first byte, everything else upgrades with STARTTLS
        let builder = if config.smtp_port == IMPLICIT_TLS_PORT {
            SmtpTransport::relay(&config.smtp_host)
        } else {
            SmtpTransport::starttls_relay(&config.smtp_host)
        }
        .context("Failed to create SMTP transport")?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        info!(
            smtp_host = %config.smtp_host,
            smtp_port = config.smtp_port,
            "SMTP relay mailer initialized"
        );

        Ok(Self {
            transport,
            from: Mailbox::new(Some(config.from_name.clone()), address),
        })
    }

    fn message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
    ) -> Result<String, DeliveryError> {
        let to: Mailbox = recipient
            .parse()
            .with_context(|| format!("Failed to parse recipient {recipient}"))?;

        let message_id = self.message_id();
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(html.to_owned())
            .context("Failed to build email message")?;

        // SmtpTransport is blocking
        let transport = self.transport.clone();
        let result = tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .context("SMTP send task failed")?;

        match result {
            Ok(_) => {
                debug!(recipient = %recipient, message_id = %message_id, "Relay accepted message");
                Ok(message_id)
            }
            Err(e) if e.is_permanent() => Err(DeliveryError::Rejected(json!({
                "name": "smtp_rejected",
                "code": e.status().map(|code| code.to_string()),
                "message": e.to_string(),
            }))),
            Err(e) => Err(DeliveryError::Unexpected(
                anyhow::Error::new(e).context("SMTP delivery failed"),
            )),
        }
    }
}
