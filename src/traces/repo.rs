use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::RepoError;

/// Outcome recorded for an upload attempt. `processed` is set by downstream
/// tooling once a trace has been ingested; this service never writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "trace_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TraceStatus {
    Uploaded,
    Failed,
    Processed,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Trace {
    pub id: Uuid,
    pub uploader_user_id: Uuid,
    pub instructor_id: Uuid,
    pub course_id: Uuid,
    pub status: TraceStatus,
    pub vector_id: Option<String>,
    pub file_name: String,
    /// "" when the object-store write failed; the column disallows NULL.
    pub bucket_url: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewTrace {
    pub uploader_user_id: Uuid,
    pub instructor_id: Uuid,
    pub course_id: Uuid,
    pub status: TraceStatus,
    pub vector_id: Option<String>,
    pub file_name: String,
    pub bucket_url: String,
}

pub async fn insert(db: &PgPool, new: NewTrace) -> Result<Trace, RepoError> {
    let trace = sqlx::query_as::<_, Trace>(
        r#"
        INSERT INTO traces (uploader_user_id, instructor_id, course_id, status,
                            vector_id, file_name, bucket_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, uploader_user_id, instructor_id, course_id, status,
                  vector_id, file_name, bucket_url, created_at, updated_at
        "#,
    )
    .bind(new.uploader_user_id)
    .bind(new.instructor_id)
    .bind(new.course_id)
    .bind(new.status)
    .bind(new.vector_id)
    .bind(new.file_name)
    .bind(new.bucket_url)
    .fetch_one(db)
    .await?;
    Ok(trace)
}

pub async fn list_by_course(db: &PgPool, course_id: Uuid) -> Result<Vec<Trace>, RepoError> {
    let traces = sqlx::query_as::<_, Trace>(
        r#"
        SELECT id, uploader_user_id, instructor_id, course_id, status,
               vector_id, file_name, bucket_url, created_at, updated_at
        FROM traces
        WHERE course_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(course_id)
    .fetch_all(db)
    .await?;
    Ok(traces)
}

pub async fn find(db: &PgPool, course_id: Uuid, trace_id: Uuid) -> Result<Trace, RepoError> {
    let trace = sqlx::query_as::<_, Trace>(
        r#"
        SELECT id, uploader_user_id, instructor_id, course_id, status,
               vector_id, file_name, bucket_url, created_at, updated_at
        FROM traces
        WHERE course_id = $1 AND id = $2
        "#,
    )
    .bind(course_id)
    .bind(trace_id)
    .fetch_one(db)
    .await?;
    Ok(trace)
}

pub async fn delete(db: &PgPool, course_id: Uuid, trace_id: Uuid) -> Result<(), RepoError> {
    let result = sqlx::query("DELETE FROM traces WHERE course_id = $1 AND id = $2")
        .bind(course_id)
        .bind(trace_id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound);
    }
    Ok(())
}
