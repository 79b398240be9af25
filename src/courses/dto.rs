use serde::Deserialize;
use uuid::Uuid;

use crate::courses::repo::SemesterTerm;
use crate::error::ApiError;

pub const COURSE_NUMBER_MAX: i32 = 99_999_999;
pub const SEMESTER_YEAR_MIN: i32 = 2000;

/// Creation body. The term arrives as a string so an out-of-range value gets
/// the documented message rather than a deserialization error.
#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
    pub semester_term: String,
    pub credit_hours: i32,
    pub subject_code: String,
    pub course_number: i32,
    pub semester_year: i32,
    pub instructor_id: Uuid,
}

impl CreateCourseRequest {
    /// Checks the documented course rules; returns the parsed term.
    pub fn validate(&self) -> Result<SemesterTerm, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::bad_request("name is required"));
        }
        let term = self
            .semester_term
            .parse::<SemesterTerm>()
            .map_err(ApiError::bad_request)?;
        if self.credit_hours <= 0 {
            return Err(ApiError::bad_request("credit_hours must be greater than 0"));
        }
        if self.subject_code.trim().is_empty() {
            return Err(ApiError::bad_request("subject_code is required"));
        }
        if self.course_number < 1 || self.course_number > COURSE_NUMBER_MAX {
            return Err(ApiError::bad_request(
                "course_number must be between 1 and 99999999",
            ));
        }
        if self.semester_year < SEMESTER_YEAR_MIN {
            return Err(ApiError::bad_request(
                "semester_year must be greater than or equal to 2000",
            ));
        }
        Ok(term)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub semester_term: Option<String>,
    pub credit_hours: Option<i32>,
    pub subject_code: Option<String>,
    pub course_number: Option<i32>,
    pub semester_year: Option<i32>,
    pub instructor_id: Option<Uuid>,
}

impl UpdateCourseRequest {
    /// Supplied fields follow the same rules as creation; returns the parsed
    /// term when one was supplied.
    pub fn validate(&self) -> Result<Option<SemesterTerm>, ApiError> {
        if matches!(self.name.as_deref(), Some(n) if n.trim().is_empty()) {
            return Err(ApiError::bad_request("name must not be empty"));
        }
        let term = self
            .semester_term
            .as_deref()
            .map(|t| t.parse::<SemesterTerm>().map_err(ApiError::bad_request))
            .transpose()?;
        if matches!(self.credit_hours, Some(h) if h <= 0) {
            return Err(ApiError::bad_request("credit_hours must be greater than 0"));
        }
        if matches!(self.subject_code.as_deref(), Some(c) if c.trim().is_empty()) {
            return Err(ApiError::bad_request("subject_code must not be empty"));
        }
        if matches!(self.course_number, Some(n) if !(1..=COURSE_NUMBER_MAX).contains(&n)) {
            return Err(ApiError::bad_request(
                "course_number must be between 1 and 99999999",
            ));
        }
        if matches!(self.semester_year, Some(y) if y < SEMESTER_YEAR_MIN) {
            return Err(ApiError::bad_request(
                "semester_year must be greater than or equal to 2000",
            ));
        }
        Ok(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateCourseRequest {
        CreateCourseRequest {
            name: "Distributed Systems".into(),
            semester_term: "Fall".into(),
            credit_hours: 3,
            subject_code: "CS".into(),
            course_number: 6650,
            semester_year: 2025,
            instructor_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn accepts_a_valid_course() {
        assert_eq!(valid_request().validate().unwrap(), SemesterTerm::Fall);
    }

    #[test]
    fn rejects_winter_term() {
        let mut req = valid_request();
        req.semester_term = "Winter".into();
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("semester_term"));
    }

    #[test]
    fn rejects_zero_credit_hours() {
        let mut req = valid_request();
        req.credit_hours = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_course_number_out_of_range() {
        let mut req = valid_request();
        req.course_number = 100_000_000;
        assert!(req.validate().is_err());
        req.course_number = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_pre_2000_semester_year() {
        let mut req = valid_request();
        req.semester_year = 1999;
        assert!(req.validate().is_err());
    }

    #[test]
    fn patch_validates_only_supplied_fields() {
        assert_eq!(UpdateCourseRequest::default().validate().unwrap(), None);

        let term = UpdateCourseRequest {
            semester_term: Some("Spring".into()),
            ..Default::default()
        };
        assert_eq!(term.validate().unwrap(), Some(SemesterTerm::Spring));

        let bad = UpdateCourseRequest {
            semester_term: Some("Winter".into()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad_year = UpdateCourseRequest {
            semester_year: Some(1980),
            ..Default::default()
        };
        assert!(bad_year.validate().is_err());
    }
}
