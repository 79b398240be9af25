mod dto;
pub mod handlers;
pub mod repo;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/course", post(handlers::create_course))
        .route(
            "/course/:course_id",
            get(handlers::get_course)
                .patch(handlers::patch_course)
                .delete(handlers::delete_course),
        )
}
