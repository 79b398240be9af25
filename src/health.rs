use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::state::AppState;

const NO_CACHE: [(header::HeaderName, &str); 3] = [
    (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "0"),
];

/// GET /healthz: status-only probe. Query parameters are rejected so the
/// endpoint stays cacheproof and argument-free; the body reports nothing, the
/// status code is the answer.
pub async fn healthz(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    if query.map_or(false, |q| !q.is_empty()) {
        return (StatusCode::BAD_REQUEST, NO_CACHE).into_response();
    }

    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (StatusCode::OK, NO_CACHE).into_response(),
        Err(e) => {
            error!(error = %e, "health check database ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, NO_CACHE).into_response()
        }
    }
}
