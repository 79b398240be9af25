pub mod handlers;
pub mod repo;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/course/:course_id/trace",
            post(handlers::upload_trace).get(handlers::list_traces),
        )
        .route(
            "/course/:course_id/trace/:trace_id",
            get(handlers::get_trace).delete(handlers::delete_trace),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}
