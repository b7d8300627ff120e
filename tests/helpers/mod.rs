use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use folio::{
    AppState, Config,
    config::MailConfig,
    email::{DeliveryError, Dispatcher, Mailer},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

#[derive(Clone, Debug, PartialEq)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html: String,
}

#[allow(dead_code)]
pub enum Behaviour {
    Deliver,
    Reject(Value),
    Fail(&'static str),
    /// Deliver the first `n` sends, reject the rest
    DeliverThenReject(usize, Value),
}

/// Mailer double recording every send call.
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    behaviour: Behaviour,
}

#[allow(dead_code)]
impl RecordingMailer {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(vec![]),
            behaviour,
        })
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
    ) -> Result<String, DeliveryError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentEmail {
            recipient: recipient.to_owned(),
            subject: subject.to_owned(),
            html: html.to_owned(),
        });
        let count = sent.len();

        match &self.behaviour {
            Behaviour::Deliver => Ok(format!("<{count}@folio.test>")),
            Behaviour::Reject(payload) => Err(DeliveryError::Rejected(payload.clone())),
            Behaviour::Fail(reason) => Err(DeliveryError::Unexpected(anyhow::anyhow!(*reason))),
            Behaviour::DeliverThenReject(n, payload) if count > *n => {
                Err(DeliveryError::Rejected(payload.clone()))
            }
            Behaviour::DeliverThenReject(..) => Ok(format!("<{count}@folio.test>")),
        }
    }
}

pub fn smtp_config() -> MailConfig {
    MailConfig {
        owner_address: "owner@folio.test".to_string(),
        smtp_username: "relay@folio.test".to_string(),
        smtp_password: "app-password".to_string(),
        ..Default::default()
    }
}

pub fn create_test_app(mail: MailConfig, mailer: Arc<RecordingMailer>) -> Router {
    let config = Config {
        mail: mail.clone(),
        ..Default::default()
    };
    let state = AppState {
        config,
        dispatcher: Arc::new(Dispatcher::with_mailer(mail, mailer)),
    };

    folio::router(state)
}

#[allow(dead_code)]
pub async fn post_json(app: &Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/send")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap();

    (status, json)
}
