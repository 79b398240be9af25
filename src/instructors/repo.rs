use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::RepoError;
use crate::patch::UpdateBuilder;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Instructor {
    pub id: Uuid,
    /// The user who created this record. Provenance only; never consulted for
    /// authorization.
    pub owning_user_id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const INSTRUCTOR_COLUMNS: &str = "id, owning_user_id, name, email, created_at, updated_at";

#[derive(Debug, Default)]
pub struct InstructorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn create(
    db: &PgPool,
    owning_user_id: Uuid,
    name: String,
    email: String,
) -> Result<Instructor, RepoError> {
    let instructor = sqlx::query_as::<_, Instructor>(
        r#"
        INSERT INTO instructors (owning_user_id, name, email)
        VALUES ($1, $2, $3)
        RETURNING id, owning_user_id, name, email, created_at, updated_at
        "#,
    )
    .bind(owning_user_id)
    .bind(name)
    .bind(email)
    .fetch_one(db)
    .await?;
    Ok(instructor)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Instructor, RepoError> {
    let instructor = sqlx::query_as::<_, Instructor>(
        r#"
        SELECT id, owning_user_id, name, email, created_at, updated_at
        FROM instructors
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(db)
    .await?;
    Ok(instructor)
}

pub async fn update(db: &PgPool, id: Uuid, patch: InstructorPatch) -> Result<Instructor, RepoError> {
    let mut tx = db.begin().await?;

    let mut builder = UpdateBuilder::new("instructors");
    builder.set("name", patch.name).set("email", patch.email);

    let mut qb = builder.finish(id, INSTRUCTOR_COLUMNS);
    let instructor = qb.build_query_as::<Instructor>().fetch_one(&mut *tx).await?;

    tx.commit().await?;
    Ok(instructor)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), RepoError> {
    let result = sqlx::query("DELETE FROM instructors WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound);
    }
    Ok(())
}
