use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::ApiError;
use crate::users::repo::Role;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Registration body. Role arrives as a string so a bad value gets a
/// field-specific message instead of a generic deserialization error.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub email: String,
}

impl CreateUserRequest {
    /// Checks the documented registration rules; returns the parsed role.
    pub fn validate(&self) -> Result<Role, ApiError> {
        if self.first_name.trim().is_empty() {
            return Err(ApiError::bad_request("first_name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ApiError::bad_request("last_name is required"));
        }
        if self.username.trim().is_empty() {
            return Err(ApiError::bad_request("username is required"));
        }
        if self.password.is_empty() {
            return Err(ApiError::bad_request("password is required"));
        }
        let role = self.role.parse::<Role>().map_err(ApiError::bad_request)?;
        if !is_valid_email(&self.email) {
            return Err(ApiError::bad_request("invalid email format"));
        }
        Ok(role)
    }
}

/// Self-service update. Role and email are fixed at registration; a supplied
/// but empty password is treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let fields = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("username", &self.username),
        ];
        for (name, value) in fields {
            if matches!(value.as_deref(), Some(v) if v.trim().is_empty()) {
                return Err(ApiError::bad_request(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateUserRequest {
        CreateUserRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada".into(),
            password: "difference-engine".into(),
            role: "student".into(),
            email: "ada@example.edu".into(),
        }
    }

    #[test]
    fn accepts_a_valid_registration() {
        assert_eq!(valid_request().validate().unwrap(), Role::Student);
    }

    #[test]
    fn rejects_unknown_roles() {
        let mut req = valid_request();
        req.role = "dean".into();
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("role must be"));
    }

    #[test]
    fn rejects_missing_required_fields() {
        for field in ["first_name", "last_name", "username", "password"] {
            let mut req = valid_request();
            match field {
                "first_name" => req.first_name.clear(),
                "last_name" => req.last_name.clear(),
                "username" => req.username.clear(),
                _ => req.password.clear(),
            }
            assert!(req.validate().is_err(), "{field} should be required");
        }
    }

    #[test]
    fn rejects_malformed_email() {
        let mut req = valid_request();
        req.email = "not-an-email".into();
        assert!(req.validate().is_err());
        req.email = "a b@example.edu".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_rejects_supplied_empty_fields() {
        let req = UpdateUserRequest {
            username: Some("  ".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_allows_an_empty_patch() {
        assert!(UpdateUserRequest::default().validate().is_ok());
    }
}
