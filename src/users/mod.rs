pub(crate) mod dto;
pub mod handlers;
pub mod repo;

use axum::{
    routing::post,
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/user",
        post(handlers::create_user)
            .get(handlers::get_user)
            .put(handlers::update_user),
    )
}
