//! Instructors wrap a user account with teaching details.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "instructor_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstructorStatus {
    #[default]
    Active,
    Inactive,
}

impl InstructorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InstructorStatus::Active => "active",
            InstructorStatus::Inactive => "inactive",
        }
    }
}

/// Instructor joined with its user account and assigned cars.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct Instructor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub specialties: Vec<String>,
    pub assigned_car_ids: Vec<Uuid>,
    pub status: InstructorStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Instructor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateInstructorDto {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 50))]
    pub license_number: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub assigned_car_ids: Vec<Uuid>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateInstructorDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 50))]
    pub license_number: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub assigned_car_ids: Option<Vec<Uuid>>,
    pub status: Option<InstructorStatus>,
}

/// Fields an instructor may change on their own profile.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateInstructorProfileDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub specialties: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Clone, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InstructorFilterParams {
    pub status: Option<InstructorStatus>,
    /// Matches name or email
    pub search: Option<String>,
}

/// Trim, drop blanks and de-duplicate specialties while keeping their order.
pub fn normalize_specialties(specialties: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(specialties.len());
    for s in specialties {
        let s = s.trim().to_string();
        if !s.is_empty() && !out.iter().any(|existing| existing.eq_ignore_ascii_case(&s)) {
            out.push(s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_specialties() {
        let cleaned = normalize_specialties(vec![
            " Manual ".to_string(),
            "".to_string(),
            "manual".to_string(),
            "Highway".to_string(),
        ]);
        assert_eq!(cleaned, vec!["Manual", "Highway"]);
    }
}
