use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{error, warn};

use crate::auth::store::{self, AuthFailure};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::{Role, User};

/// Any authenticated caller. Extracting this re-verifies the basic-auth
/// credentials against the store, per request.
pub struct AuthUser(pub User);

/// An authenticated caller holding the elevated role.
pub struct AdminUser(pub User);

/// Splits an `Authorization: Basic <base64>` header into its credential pair.
pub(crate) fn parse_basic(header: &str) -> Option<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::MissingCredentials)?;

        let (username, password) =
            parse_basic(header).ok_or(ApiError::MissingCredentials)?;

        let user = store::authenticate(&state.db, &username, &password)
            .await
            .map_err(|failure| match failure {
                AuthFailure::Store(e) => {
                    error!(error = %e, "credential lookup failed");
                    ApiError::internal("Failed to authenticate user")
                }
                reason => {
                    warn!(%username, %reason, "authentication rejected");
                    ApiError::InvalidCredentials
                }
            })?;

        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            warn!(user_id = %user.id, role = ?user.role, "elevated role required");
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_standard_basic_header() {
        // "alice:open sesame"
        let creds = parse_basic("Basic YWxpY2U6b3BlbiBzZXNhbWU=").unwrap();
        assert_eq!(creds, ("alice".into(), "open sesame".into()));
    }

    #[test]
    fn accepts_lowercase_scheme() {
        // "bob:pw"
        assert!(parse_basic("basic Ym9iOnB3").is_some());
    }

    #[test]
    fn password_may_contain_colons() {
        // "carol:a:b:c"; only the first colon separates the pair
        let (user, password) = parse_basic("Basic Y2Fyb2w6YTpiOmM=").unwrap();
        assert_eq!(user, "carol");
        assert_eq!(password, "a:b:c");
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(parse_basic("Bearer abcdef").is_none());
        assert!(parse_basic("Basic !!not-base64!!").is_none());
        // valid base64, but no colon inside
        assert!(parse_basic("Basic YWxpY2U=").is_none());
    }
}
