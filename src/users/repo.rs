use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::RepoError;
use crate::patch::UpdateBuilder;

/// The single role distinction the API supports: `admin` is elevated,
/// everything else is standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
    Instructor,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            "instructor" => Ok(Role::Instructor),
            _ => Err("role must be student, admin, or instructor".into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub email: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, username, password_hash, role, email, created_at, updated_at";

#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub email: String,
}

/// Field diffs for a user patch. `password_hash` is already hashed by the
/// caller; an absent field leaves the column untouched.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

pub async fn create(db: &PgPool, new: NewUser) -> Result<User, RepoError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (first_name, last_name, username, password_hash, role, email)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, first_name, last_name, username, password_hash, role, email,
                  created_at, updated_at
        "#,
    )
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.username)
    .bind(new.password_hash)
    .bind(new.role)
    .bind(new.email)
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, RepoError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, first_name, last_name, username, password_hash, role, email,
               created_at, updated_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Applies a patch inside a transaction. The builder always refreshes
/// `updated_at`, so an empty diff still advances the timestamp.
pub async fn update(db: &PgPool, id: Uuid, patch: UserPatch) -> Result<User, RepoError> {
    let mut tx = db.begin().await?;

    let mut builder = UpdateBuilder::new("users");
    builder
        .set("first_name", patch.first_name)
        .set("last_name", patch.last_name)
        .set("username", patch.username)
        .set("password_hash", patch.password_hash);

    let mut qb = builder.finish(id, USER_COLUMNS);
    let user = qb.build_query_as::<User>().fetch_one(&mut *tx).await?;

    tx.commit().await?;
    Ok(user)
}
