//! Lesson and progress reports written by instructors.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use drivers_hub_core::serde::deserialize_optional_uuid;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct Report {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub instructor_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub notes: String,
    /// 1 (needs work) to 5 (exam ready)
    pub rating: Option<i16>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[sqlx(default)]
    pub candidate_name: Option<String>,
    #[sqlx(default)]
    pub instructor_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateReportDto {
    pub candidate_id: Uuid,
    /// Required for admins; instructors always report as themselves.
    pub instructor_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Notes are required"))]
    pub notes: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateReportDto {
    #[validate(length(min = 1))]
    pub notes: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
}

#[derive(Deserialize, Debug, Clone, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub candidate_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub instructor_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let mut dto = CreateReportDto {
            candidate_id: Uuid::new_v4(),
            instructor_id: None,
            appointment_id: None,
            notes: "Good clutch control".to_string(),
            rating: Some(5),
        };
        assert!(dto.validate().is_ok());
        dto.rating = Some(6);
        assert!(dto.validate().is_err());
        dto.rating = Some(0);
        assert!(dto.validate().is_err());
    }
}
