use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::services::store;

/// One line sent by a posting client.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LogUpload {
    /// Source key, e.g. the sensor name
    pub name: String,
    /// Payload text, e.g. `"T 20.5F, H 55%"`
    pub data: String,
}

/// Append a log line (also accepted as PUT)
#[utoipa::path(
    post,
    path = "/api/log",
    request_body = LogUpload,
    responses(
        (status = 200, description = "Line stored"),
        (status = 400, description = "Empty payload"),
    ),
    tag = "log"
)]
pub async fn post_log(
    State(state): State<AppState>,
    Json(upload): Json<LogUpload>,
) -> AppResult<StatusCode> {
    if upload.data.trim().is_empty() {
        return Err(AppError::BadRequest("data must not be empty".to_string()));
    }

    store::append(&state.db, &upload.name, &upload.data).await?;
    Ok(StatusCode::OK)
}
