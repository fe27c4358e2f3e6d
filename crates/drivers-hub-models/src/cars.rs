use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "car_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    #[default]
    Active,
    Maintenance,
    Inactive,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct Car {
    pub id: Uuid,
    pub model: String,
    #[schema(example = "ABC-123")]
    pub license_plate: String,
    pub year: Option<i32>,
    pub transmission: Option<String>,
    pub status: CarStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateCarDto {
    #[validate(length(min = 1, max = 150, message = "Model is required"))]
    pub model: String,
    #[validate(length(min = 1, max = 30, message = "License plate is required"))]
    pub license_plate: String,
    #[validate(range(min = 1950, max = 2100))]
    pub year: Option<i32>,
    #[validate(length(max = 20))]
    pub transmission: Option<String>,
    pub status: Option<CarStatus>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateCarDto {
    #[validate(length(min = 1, max = 150))]
    pub model: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub license_plate: Option<String>,
    #[validate(range(min = 1950, max = 2100))]
    pub year: Option<i32>,
    #[validate(length(max = 20))]
    pub transmission: Option<String>,
    pub status: Option<CarStatus>,
}

#[derive(Deserialize, Debug, Clone, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CarFilterParams {
    pub status: Option<CarStatus>,
    /// Matches model or license plate
    pub search: Option<String>,
}

/// Plates are stored upper-case without surrounding whitespace.
pub fn normalize_license_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_license_plate() {
        assert_eq!(normalize_license_plate("  ab-123 cd "), "AB-123 CD");
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&CarStatus::Maintenance).unwrap(), r#""maintenance""#);
    }
}
