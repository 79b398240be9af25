use serde::Deserialize;

use crate::error::ApiError;
use crate::users::dto::is_valid_email;

#[derive(Debug, Deserialize)]
pub struct CreateInstructorRequest {
    pub name: String,
    pub email: String,
}

impl CreateInstructorRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::bad_request("name is required"));
        }
        if !is_valid_email(&self.email) {
            return Err(ApiError::bad_request("invalid email format"));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateInstructorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateInstructorRequest {
    /// Supplied fields follow the same rules as creation.
    pub fn validate(&self) -> Result<(), ApiError> {
        if matches!(self.name.as_deref(), Some(n) if n.trim().is_empty()) {
            return Err(ApiError::bad_request("name must not be empty"));
        }
        if let Some(email) = self.email.as_deref() {
            if !is_valid_email(email) {
                return Err(ApiError::bad_request("invalid email format"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_name_and_wellformed_email() {
        let ok = CreateInstructorRequest {
            name: "Grace Hopper".into(),
            email: "grace@example.edu".into(),
        };
        assert!(ok.validate().is_ok());

        let blank_name = CreateInstructorRequest {
            name: " ".into(),
            email: "grace@example.edu".into(),
        };
        assert!(blank_name.validate().is_err());

        let bad_email = CreateInstructorRequest {
            name: "Grace Hopper".into(),
            email: "grace@".into(),
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn update_validates_only_supplied_fields() {
        assert!(UpdateInstructorRequest::default().validate().is_ok());

        let bad_email = UpdateInstructorRequest {
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(bad_email.validate().is_err());
    }
}
