mod dto;
pub mod handlers;
pub mod repo;

use axum::{routing::post, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/instructor",
        post(handlers::create_instructor)
            .get(handlers::get_instructor)
            .patch(handlers::patch_instructor)
            .delete(handlers::delete_instructor),
    )
}
