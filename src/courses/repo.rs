use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::RepoError;
use crate::patch::UpdateBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "semester_term")]
pub enum SemesterTerm {
    Fall,
    Spring,
    Summer,
}

impl std::str::FromStr for SemesterTerm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fall" => Ok(SemesterTerm::Fall),
            "Spring" => Ok(SemesterTerm::Spring),
            "Summer" => Ok(SemesterTerm::Summer),
            _ => Err("semester_term must be 'Fall', 'Spring', or 'Summer'".into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub semester_term: SemesterTerm,
    pub credit_hours: i32,
    pub subject_code: String,
    pub course_number: i32,
    pub semester_year: i32,
    /// Overwritten on every update with the id of whoever issued it.
    pub last_editor_user_id: Uuid,
    pub instructor_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COURSE_COLUMNS: &str = "id, name, semester_term, credit_hours, subject_code, \
     course_number, semester_year, last_editor_user_id, instructor_id, created_at, updated_at";

#[derive(Debug)]
pub struct NewCourse {
    pub name: String,
    pub semester_term: SemesterTerm,
    pub credit_hours: i32,
    pub subject_code: String,
    pub course_number: i32,
    pub semester_year: i32,
    pub last_editor_user_id: Uuid,
    pub instructor_id: Uuid,
}

#[derive(Debug, Default)]
pub struct CoursePatch {
    pub name: Option<String>,
    pub semester_term: Option<SemesterTerm>,
    pub credit_hours: Option<i32>,
    pub subject_code: Option<String>,
    pub course_number: Option<i32>,
    pub semester_year: Option<i32>,
    pub instructor_id: Option<Uuid>,
}

pub async fn create(db: &PgPool, new: NewCourse) -> Result<Course, RepoError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (name, semester_term, credit_hours, subject_code,
                             course_number, semester_year, last_editor_user_id, instructor_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, name, semester_term, credit_hours, subject_code,
                  course_number, semester_year, last_editor_user_id, instructor_id,
                  created_at, updated_at
        "#,
    )
    .bind(new.name)
    .bind(new.semester_term)
    .bind(new.credit_hours)
    .bind(new.subject_code)
    .bind(new.course_number)
    .bind(new.semester_year)
    .bind(new.last_editor_user_id)
    .bind(new.instructor_id)
    .fetch_one(db)
    .await?;
    Ok(course)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Course, RepoError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, name, semester_term, credit_hours, subject_code,
               course_number, semester_year, last_editor_user_id, instructor_id,
               created_at, updated_at
        FROM courses
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(db)
    .await?;
    Ok(course)
}

/// Applies a patch inside a transaction, always stamping the editor.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    editor_user_id: Uuid,
    patch: CoursePatch,
) -> Result<Course, RepoError> {
    let mut tx = db.begin().await?;

    let mut builder = UpdateBuilder::new("courses");
    builder
        .set_always("last_editor_user_id", editor_user_id)
        .set("name", patch.name)
        .set("semester_term", patch.semester_term)
        .set("credit_hours", patch.credit_hours)
        .set("subject_code", patch.subject_code)
        .set("course_number", patch.course_number)
        .set("semester_year", patch.semester_year)
        .set("instructor_id", patch.instructor_id);

    let mut qb = builder.finish(id, COURSE_COLUMNS);
    let course = qb.build_query_as::<Course>().fetch_one(&mut *tx).await?;

    tx.commit().await?;
    Ok(course)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), RepoError> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound);
    }
    Ok(())
}
