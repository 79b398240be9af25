use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::error::ErrorKind;

/// Storage-layer outcome of a query, classified from the driver error instead
/// of matching on message text. Constraint names come straight from Postgres,
/// so handlers can tell a duplicate username from a duplicate email.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("row not found")]
    NotFound,
    #[error("unique constraint violated ({})", .0.as_deref().unwrap_or("unknown"))]
    Unique(Option<String>),
    #[error("foreign key constraint violated ({})", .0.as_deref().unwrap_or("unknown"))]
    ForeignKey(Option<String>),
    #[error(transparent)]
    Other(sqlx::Error),
}

impl RepoError {
    /// Name of the violated constraint, when the store reported one.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            RepoError::Unique(c) | RepoError::ForeignKey(c) => c.as_deref(),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation => {
                    RepoError::Unique(db.constraint().map(str::to_owned))
                }
                ErrorKind::ForeignKeyViolation => {
                    RepoError::ForeignKey(db.constraint().map(str::to_owned))
                }
                _ => RepoError::Other(e),
            },
            _ => RepoError::Other(e),
        }
    }
}

/// Handler-boundary error. Renders as `{"error": <message>}` with the matching
/// status code; the credential variants carry a basic-auth challenge.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Authentication required")]
    MissingCredentials,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingCredentials | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        match self {
            ApiError::MissingCredentials | ApiError::InvalidCredentials => (
                status,
                [(header::WWW_AUTHENTICATE, r#"Basic realm="restricted""#)],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_renders_status_and_error_body() {
        let response = ApiError::bad_request("name is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "name is required");
    }

    #[tokio::test]
    async fn credential_errors_carry_basic_challenge() {
        for err in [ApiError::MissingCredentials, ApiError::InvalidCredentials] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let challenge = response
                .headers()
                .get(header::WWW_AUTHENTICATE)
                .expect("challenge header")
                .to_str()
                .unwrap();
            assert!(challenge.starts_with("Basic "));
        }
    }

    #[tokio::test]
    async fn invalid_credentials_message_is_generic() {
        // A wrong password and an unknown username must be indistinguishable.
        let body = body_json(ApiError::InvalidCredentials.into_response()).await;
        assert_eq!(body["error"], "Invalid username or password");
    }

    #[tokio::test]
    async fn remaining_variants_map_to_their_status_codes() {
        let cases = [
            (ApiError::Forbidden, StatusCode::FORBIDDEN),
            (
                ApiError::not_found("Course not found"),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::conflict("Username already exists"),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::internal("Failed to create course"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn repo_error_exposes_constraint_name() {
        let err = RepoError::Unique(Some("users_username_key".into()));
        assert_eq!(err.constraint(), Some("users_username_key"));
        assert!(RepoError::NotFound.constraint().is_none());
    }

    #[test]
    fn row_not_found_classifies_as_not_found() {
        let err = RepoError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepoError::NotFound));
    }
}
