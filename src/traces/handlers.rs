use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::extractors::{AdminUser, AuthUser};
use crate::courses::handlers::parse_course_id;
use crate::error::{ApiError, RepoError};
use crate::state::AppState;

use super::repo::{self, Trace};
use super::services::{self, TraceUpload};

fn parse_trace_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid trace ID format"))
}

/// Pulls the upload form apart: a `file` part plus `file_name` and
/// `instructor_id` fields are required, `vector_id` is optional. Any gap is a
/// 400 before anything touches storage.
async fn parse_upload_form(mut multipart: Multipart) -> Result<TraceUpload, ApiError> {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut file_name: Option<String> = None;
    let mut instructor_id: Option<String> = None;
    let mut vector_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Failed to parse multipart form"))?
    {
        match field.name() {
            Some("file") => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Failed to read file part"))?;
                file = Some((original_name, content_type, data));
            }
            Some("file_name") => {
                file_name = field.text().await.ok().filter(|s| !s.is_empty());
            }
            Some("instructor_id") => {
                instructor_id = field.text().await.ok().filter(|s| !s.is_empty());
            }
            Some("vector_id") => {
                vector_id = field.text().await.ok().filter(|s| !s.is_empty());
            }
            _ => {}
        }
    }

    let (original_name, content_type, body) =
        file.ok_or_else(|| ApiError::bad_request("File is required"))?;
    let file_name = file_name.ok_or_else(|| ApiError::bad_request("file_name is required"))?;
    let instructor_id = instructor_id
        .ok_or_else(|| ApiError::bad_request("instructor_id is required"))?
        .parse::<Uuid>()
        .map_err(|_| ApiError::bad_request("Invalid instructor_id format"))?;

    Ok(TraceUpload {
        instructor_id,
        file_name,
        vector_id,
        original_name,
        content_type,
        body,
    })
}

/// POST /v1/course/{id}/trace: elevated role; multipart body up to 10 MiB.
#[instrument(skip_all)]
pub async fn upload_trace(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(course_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let course_id = parse_course_id(&course_id)?;
    let upload = parse_upload_form(multipart).await?;

    let trace = services::upload_trace(&state, &admin, course_id, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "File uploaded successfully",
            "bucket_url": trace.bucket_url,
        })),
    ))
}

/// GET /v1/course/{id}/trace: any authenticated caller.
#[instrument(skip_all)]
pub async fn list_traces(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(course_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let course_id = parse_course_id(&course_id)?;
    let traces: Vec<Trace> = repo::list_by_course(&state.db, course_id)
        .await
        .map_err(|e| {
            error!(error = %e, %course_id, "list traces failed");
            ApiError::internal("Failed to retrieve traces")
        })?;
    Ok(Json(json!({ "data": traces })))
}

/// GET /v1/course/{id}/trace/{tid}: elevated role, since retrieving one
/// trace's storage pointer needs more trust than listing.
#[instrument(skip_all)]
pub async fn get_trace(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path((course_id, trace_id)): Path<(String, String)>,
) -> Result<Json<Trace>, ApiError> {
    let course_id = parse_course_id(&course_id)?;
    let trace_id = parse_trace_id(&trace_id)?;
    let trace = repo::find(&state.db, course_id, trace_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => ApiError::not_found("Trace not found"),
            other => {
                error!(error = %other, %trace_id, "get trace failed");
                ApiError::internal("Failed to retrieve trace")
            }
        })?;
    Ok(Json(trace))
}

/// DELETE /v1/course/{id}/trace/{tid}: any authenticated caller.
#[instrument(skip_all)]
pub async fn delete_trace(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((course_id, trace_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let course_id = parse_course_id(&course_id)?;
    let trace_id = parse_trace_id(&trace_id)?;
    repo::delete(&state.db, course_id, trace_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => ApiError::not_found("Trace not found"),
            other => {
                error!(error = %other, %trace_id, "delete trace failed");
                ApiError::internal("Failed to delete trace")
            }
        })?;

    info!(%trace_id, deleted_by = %user.id, "trace deleted");
    Ok(Json(json!({ "message": "Trace deleted successfully" })))
}
