//! Per-session key-value stores kept server-side, one per `X-Session-Id`.
//!
//! A handler loads a copy of the session, hands it to the synchronous
//! analysis code, and stores it back afterwards.

use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use uuid::Uuid;

use crate::analysis::MemorySession;
use crate::common::AppState;

pub const SESSION_HEADER: &str = "x-session-id";

/// Longest session id accepted from a client.
const MAX_SESSION_ID_LEN: usize = 128;

/// Session id from the request, or a fresh one if the client sent none or
/// an unusable value.
#[must_use]
pub fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_SESSION_ID_LEN)
        .filter(|id| id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string)
}

pub async fn load(state: &AppState, id: &str) -> MemorySession {
    state.sessions.get(id).await.unwrap_or_default()
}

pub async fn store(state: &AppState, id: &str, session: MemorySession) {
    state.sessions.insert(id.to_string(), session).await;
    tracing::debug!(session = %id, "session_stored");
}

/// Drop everything stored for a session.
pub async fn reset(state: &AppState, id: &str) {
    state.sessions.invalidate(id).await;
    tracing::warn!(session = %id, "session_reset");
}

/// Echo the session id so the client can send it back.
pub fn attach(mut response: Response, id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}
