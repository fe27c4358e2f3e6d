//! Authentication request and response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::{User, UserRole};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "A valid email is required"))]
    #[schema(example = "jane.doe@drivershub.local")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Role for the new account. Only honoured for admin callers; defaults to staff.
    #[serde(default)]
    #[schema(value_type = Option<i16>, example = 2)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Lower-case and trim an email so lookups and uniqueness are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_rejects_short_password() {
        let dto: RegisterRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Ada",
            "last_name": "Obi",
            "email": "ada@drivershub.local",
            "password": "12345"
        }))
        .unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_register_request_parses_role_label() {
        let dto: RegisterRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Ada",
            "last_name": "Obi",
            "email": "ada@drivershub.local",
            "password": "123456",
            "role": "instructor"
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.role, Some(UserRole::Instructor));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada.Obi@DriversHub.Local "), "ada.obi@drivershub.local");
    }
}
