use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AdminUser;
use crate::error::{ApiError, RepoError};
use crate::state::AppState;

use super::dto::{CreateCourseRequest, UpdateCourseRequest};
use super::repo::{self, Course, CoursePatch, NewCourse};

pub(crate) fn parse_course_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid course ID format"))
}

/// POST /v1/course: elevated role; the caller becomes the first editor.
#[instrument(skip_all)]
pub async fn create_course(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<CreateCourseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let term = req.validate()?;

    let course = repo::create(
        &state.db,
        NewCourse {
            name: req.name,
            semester_term: term,
            credit_hours: req.credit_hours,
            subject_code: req.subject_code,
            course_number: req.course_number,
            semester_year: req.semester_year,
            last_editor_user_id: admin.id,
            instructor_id: req.instructor_id,
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::ForeignKey(_) => ApiError::bad_request("Invalid instructor_id"),
        other => {
            error!(error = %other, "create course failed");
            ApiError::internal("Failed to create course")
        }
    })?;

    info!(course_id = %course.id, editor = %admin.id, "course created");
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /v1/course/{id}: open to unauthenticated callers.
#[instrument(skip_all)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Course>, ApiError> {
    let id = parse_course_id(&course_id)?;
    let course = repo::find_by_id(&state.db, id).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::not_found("Course not found"),
        other => {
            error!(error = %other, %id, "get course failed");
            ApiError::internal("Failed to retrieve course")
        }
    })?;
    Ok(Json(course))
}

/// PATCH /v1/course/{id}: elevated role; the caller is recorded as the last
/// editor even when the patch body is empty.
#[instrument(skip_all)]
pub async fn patch_course(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(course_id): Path<String>,
    payload: Result<Json<UpdateCourseRequest>, JsonRejection>,
) -> Result<Json<Course>, ApiError> {
    let id = parse_course_id(&course_id)?;
    let Json(req) = payload.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let term = req.validate()?;

    let course = repo::update(
        &state.db,
        id,
        admin.id,
        CoursePatch {
            name: req.name,
            semester_term: term,
            credit_hours: req.credit_hours,
            subject_code: req.subject_code,
            course_number: req.course_number,
            semester_year: req.semester_year,
            instructor_id: req.instructor_id,
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::NotFound => ApiError::not_found("Course not found"),
        RepoError::ForeignKey(_) => ApiError::bad_request("Invalid instructor_id"),
        other => {
            error!(error = %other, %id, "update course failed");
            ApiError::internal("Failed to update course")
        }
    })?;

    info!(course_id = %course.id, editor = %admin.id, "course updated");
    Ok(Json(course))
}

/// DELETE /v1/course/{id}: elevated role.
#[instrument(skip_all)]
pub async fn delete_course(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(course_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_course_id(&course_id)?;
    repo::delete(&state.db, id).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::not_found("Course not found"),
        other => {
            error!(error = %other, %id, "delete course failed");
            ApiError::internal("Failed to delete course")
        }
    })?;

    info!(course_id = %id, "course deleted");
    Ok(Json(json!({ "message": "Course deleted successfully" })))
}
