use axum::{Json, body::Bytes, extract::State};
use folio_shared::{SendReply, Submission};

use crate::{error::DispatchError, routes::AppState};

/// POST /api/send
///
/// Credentials are checked before the body is even decoded.
#[tracing::instrument(skip_all)]
pub async fn action(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<Json<SendReply>, DispatchError> {
    app_state.dispatcher.ensure_configured()?;

    let submission = Submission::from_slice(&body)?;
    let receipt = app_state.dispatcher.dispatch(&submission).await?;

    Ok(Json(SendReply::delivered(receipt)))
}
