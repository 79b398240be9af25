use sqlx::PgPool;

use crate::auth::password::verify_password;
use crate::users::repo::{self, User};

/// Why a credential check failed. The HTTP layer collapses `UnknownUser` and
/// `BadPassword` into one generic response; only the logs tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum AuthFailure {
    #[error("unknown username")]
    UnknownUser,
    #[error("password mismatch")]
    BadPassword,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Verifies a username/password pair against the stored hash. Runs on every
/// authenticated request; nothing is cached between requests.
pub async fn authenticate(
    db: &PgPool,
    username: &str,
    password: &str,
) -> Result<User, AuthFailure> {
    let user = repo::find_by_username(db, username)
        .await
        .map_err(|e| AuthFailure::Store(anyhow::Error::new(e)))?
        .ok_or(AuthFailure::UnknownUser)?;

    let ok = verify_password(password, &user.password_hash)?;
    if !ok {
        return Err(AuthFailure::BadPassword);
    }
    Ok(user)
}
