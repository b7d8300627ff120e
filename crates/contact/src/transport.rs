use async_trait::async_trait;
use folio_shared::{SendReply, Submission};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("endpoint answered with status {0}")]
    Status(u16),

    #[error("endpoint reported failure")]
    Rejected,
}

/// Hands a completed submission to the dispatch endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn transmit(&self, submission: &Submission) -> Result<(), TransportError>;
}

/// Posts submissions as JSON to the send endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn transmit(&self, submission: &Submission) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let reply: SendReply = response.json().await?;
        if !reply.success {
            return Err(TransportError::Rejected);
        }

        Ok(())
    }
}
