//! Fixed-response handlers for error paths.

use axum::{extract::Path, http::StatusCode};

/// GET /status/{code}
///
/// Responds with `code` and an empty body.
pub async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// GET /empty
pub async fn empty() -> StatusCode {
    StatusCode::OK
}

/// GET /malformed
pub async fn malformed() -> ([(&'static str, &'static str); 1], &'static str) {
    ([("content-type", "application/json")], "{\"items\": [1, 2")
}
