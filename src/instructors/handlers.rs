use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AdminUser;
use crate::error::{ApiError, RepoError};
use crate::state::AppState;

use super::dto::{CreateInstructorRequest, UpdateInstructorRequest};
use super::repo::{self, Instructor, InstructorPatch};

/// The instructor endpoints address rows by `?id=` query parameter.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: Option<String>,
}

fn require_instructor_id(query: &IdQuery) -> Result<Uuid, ApiError> {
    let raw = query
        .id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("Instructor ID is required"))?;
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid instructor ID format"))
}

/// POST /v1/instructor: elevated role required; the caller is recorded as
/// the owning user.
#[instrument(skip_all)]
pub async fn create_instructor(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<CreateInstructorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Instructor>), ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    req.validate()?;

    let instructor = repo::create(&state.db, admin.id, req.name, req.email)
        .await
        .map_err(|e| map_instructor_repo_error(e, "Failed to create instructor"))?;

    info!(instructor_id = %instructor.id, owning_user_id = %admin.id, "instructor created");
    Ok((StatusCode::CREATED, Json(instructor)))
}

/// GET /v1/instructor?id=: open to unauthenticated callers.
#[instrument(skip_all)]
pub async fn get_instructor(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Instructor>, ApiError> {
    let id = require_instructor_id(&query)?;
    let instructor = repo::find_by_id(&state.db, id).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::not_found("Instructor not found"),
        other => {
            error!(error = %other, %id, "get instructor failed");
            ApiError::internal("Failed to retrieve instructor")
        }
    })?;
    Ok(Json(instructor))
}

/// PATCH /v1/instructor?id=: elevated role; only supplied fields change.
#[instrument(skip_all)]
pub async fn patch_instructor(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<IdQuery>,
    payload: Result<Json<UpdateInstructorRequest>, JsonRejection>,
) -> Result<Json<Instructor>, ApiError> {
    let id = require_instructor_id(&query)?;
    let Json(req) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    req.validate()?;

    let instructor = repo::update(
        &state.db,
        id,
        InstructorPatch {
            name: req.name,
            email: req.email,
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::NotFound => ApiError::not_found("Instructor not found"),
        other => map_instructor_repo_error(other, "Failed to update instructor"),
    })?;

    info!(instructor_id = %instructor.id, "instructor updated");
    Ok(Json(instructor))
}

/// DELETE /v1/instructor?id=: elevated role.
#[instrument(skip_all)]
pub async fn delete_instructor(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = require_instructor_id(&query)?;
    repo::delete(&state.db, id).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::not_found("Instructor not found"),
        other => {
            error!(error = %other, %id, "delete instructor failed");
            ApiError::internal("Failed to delete instructor")
        }
    })?;

    info!(instructor_id = %id, "instructor deleted");
    Ok(Json(json!({ "message": "Instructor deleted successfully" })))
}

fn map_instructor_repo_error(e: RepoError, fallback: &str) -> ApiError {
    match e {
        RepoError::Unique(_) => ApiError::conflict("Email already exists"),
        RepoError::ForeignKey(_) => ApiError::bad_request("Invalid owning user id"),
        other => {
            error!(error = %other, "instructor store error");
            ApiError::internal(fallback)
        }
    }
}
