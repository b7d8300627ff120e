//! Transactional provider delivery over its HTTP API

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::{DeliveryError, Mailer};
use crate::config::MailConfig;

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmailCreated {
    id: String,
}

#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        info!(api_url = %config.api_url, "Transactional mailer initialized");

        Ok(Self {
            client,
            endpoint: format!("{}/emails", config.api_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            from: format!("{} <{}>", config.from_name, config.api_from),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
    ) -> Result<String, DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmailRequest {
                from: &self.from,
                to: [recipient],
                subject,
                html,
            })
            .send()
            .await
            .context("Failed to reach email provider")?;

        let status = response.status();
        debug!(recipient = %recipient, status = status.as_u16(), "Provider answered");
        if !status.is_success() {
            let payload = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or_else(|_| json!({ "statusCode": status.as_u16() }));

            return Err(DeliveryError::Rejected(payload));
        }

        let created: EmailCreated = response
            .json()
            .await
            .context("Malformed response from email provider")?;

        Ok(created.id)
    }
}
