use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::routes::AppState;

/// GET /health - Liveness probe
/// Returns 200 OK if the process is alive
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// GET /ready - Readiness probe
/// Returns 200 OK once the selected mail provider has its credentials
pub async fn ready(State(app_state): State<AppState>) -> impl IntoResponse {
    let mail = app_state.dispatcher.config();
    if mail.has_credentials() {
        return (StatusCode::OK, Json(json!({"status": "ready"})));
    }

    tracing::warn!(
        provider = %mail.provider,
        missing = ?mail.missing_credentials(),
        "Readiness check failed: mail credentials missing"
    );
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "status": "not_ready",
            "reason": "mail_credentials_missing"
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MailConfig};

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_without_credentials() {
        let state = AppState::new(Config::default());

        let response = ready(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_ready_with_credentials() {
        let state = AppState::new(Config {
            mail: MailConfig {
                smtp_username: "relay@example.com".to_string(),
                smtp_password: "app-password".to_string(),
                ..Default::default()
            },
            ..Default::default()
        });

        let response = ready(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), br#"{"status":"ready"}"#);
    }
}
