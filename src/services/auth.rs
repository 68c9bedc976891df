//! Optional bearer-token check on the upload routes.
//!
//! With `LOG_TOKEN` set, posting clients must send
//! `Authorization: Bearer <jwt>` signed with that secret (HS256). Without it
//! the upload routes stay open, matching loggers that run on a trusted LAN.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use crate::common::AppState;
use crate::error::{AppError, AppResult};

/// Check an upload's token against `secret`.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` with "Token missing", "Token expired" or
/// "Token invalid".
pub fn verify_bearer(headers: &HeaderMap, secret: &str) -> AppResult<()> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer"))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Token missing".to_string()))?;

    // Only HS256; `exp` is checked when present but not required
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.leeway = 0;

    decode::<serde_json::Value>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|_| ())
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired".to_string()),
            _ => AppError::Unauthorized("Token invalid".to_string()),
        })
}

/// Middleware guarding `POST`/`PUT /api/log`.
pub async fn require_log_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    if let Some(secret) = state.config.log_token.as_deref()
        && let Err(e) = verify_bearer(request.headers(), secret)
    {
        tracing::warn!(error = %e, "upload_rejected");
        return Err(e);
    }
    Ok(next.run(request).await)
}
