use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info, instrument};

use crate::auth::extractors::AuthUser;
use crate::auth::password::hash_password;
use crate::error::{ApiError, RepoError};
use crate::state::AppState;

use super::dto::{CreateUserRequest, UpdateUserRequest};
use super::repo::{self, NewUser, User, UserPatch};

/// POST /v1/user: self-registration, no credentials required.
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let role = req.validate()?;

    let password_hash = hash_password(&req.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::internal("Failed to create user")
    })?;

    let user = repo::create(
        &state.db,
        NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            username: req.username,
            password_hash,
            role,
            email: req.email,
        },
    )
    .await
    .map_err(|e| map_user_repo_error(e, "Failed to create user"))?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /v1/user: returns the authenticated caller's own record; there is no
/// lookup by arbitrary id.
#[instrument(skip_all)]
pub async fn get_user(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

/// PUT /v1/user: the caller patches themself; only supplied fields change.
#[instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    req.validate()?;

    // An empty password field leaves the stored hash untouched.
    let password_hash = match req.password.as_deref() {
        Some(p) if !p.is_empty() => Some(hash_password(p).map_err(|e| {
            error!(error = %e, "hash_password failed");
            ApiError::internal("Failed to update user")
        })?),
        _ => None,
    };

    let updated = repo::update(
        &state.db,
        user.id,
        UserPatch {
            first_name: req.first_name,
            last_name: req.last_name,
            username: req.username,
            password_hash,
        },
    )
    .await
    .map_err(|e| map_user_repo_error(e, "Failed to update user"))?;

    info!(user_id = %updated.id, "user updated");
    Ok(Json(updated))
}

fn map_user_repo_error(e: RepoError, fallback: &str) -> ApiError {
    match &e {
        RepoError::Unique(_) => {
            if e.constraint().map_or(false, |c| c.contains("username")) {
                ApiError::conflict("Username already exists")
            } else {
                ApiError::conflict("Email already exists")
            }
        }
        _ => {
            error!(error = %e, "user store error");
            ApiError::internal(fallback)
        }
    }
}
