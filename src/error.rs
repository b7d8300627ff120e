use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_shared::SendReply;
use thiserror::Error;

use crate::email::DeliveryError;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Missing mail configuration: {}", .0.join(", "))]
    Configuration(Vec<&'static str>),

    #[error("Invalid payload: {0}")]
    Payload(#[from] folio_shared::Error),

    #[error("Provider rejected message: {0}")]
    Provider(serde_json::Value),

    #[error("Internal server error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl From<DeliveryError> for DispatchError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::Rejected(payload) => DispatchError::Provider(payload),
            DeliveryError::Unexpected(e) => DispatchError::Internal(e),
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let (status_code, reply) = match self {
            DispatchError::Configuration(missing) => {
                tracing::error!(missing = ?missing, "Missing mail configuration");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SendReply::failed("Missing API configuration"),
                )
            }
            DispatchError::Payload(e) => (
                StatusCode::BAD_REQUEST,
                SendReply::failed("Invalid payload").with_details(e.to_string()),
            ),
            DispatchError::Provider(payload) => {
                tracing::warn!(error = %payload, "Email provider rejected message");
                (StatusCode::BAD_REQUEST, SendReply::failed(payload))
            }
            DispatchError::Internal(e) => {
                tracing::error!("Dispatch error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SendReply::failed("Internal Server Error").with_details(format!("{e:#}")),
                )
            }
        };

        (status_code, Json(reply)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                DispatchError::Configuration(vec!["mail.api_key"]),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DispatchError::Provider(json!({ "name": "validation_error" })),
                StatusCode::BAD_REQUEST,
            ),
            (
                DispatchError::Internal(anyhow::anyhow!("connection reset")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_delivery_error_mapping() {
        let rejected: DispatchError = DeliveryError::Rejected(json!("nope")).into();
        assert!(matches!(rejected, DispatchError::Provider(_)));

        let unexpected: DispatchError =
            DeliveryError::Unexpected(anyhow::anyhow!("timeout")).into();
        assert!(matches!(unexpected, DispatchError::Internal(_)));
    }
}
