//! Scheduled lessons linking a candidate, an instructor and optionally a car.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use drivers_hub_core::serde::{deserialize_nullable, deserialize_optional_uuid};
use drivers_hub_core::{AppError, FieldError};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "appointment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub instructor_id: Uuid,
    pub car_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub candidate_name: Option<String>,
    #[sqlx(default)]
    pub instructor_name: Option<String>,
    #[sqlx(default)]
    pub car_license_plate: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateAppointmentDto {
    pub candidate_id: Uuid,
    /// Required for admins; instructors always book for themselves.
    pub instructor_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateAppointmentDto {
    pub candidate_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    /// `null` removes the car from the lesson.
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub car_id: Option<Option<Uuid>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

#[derive(Deserialize, Debug, Clone, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentFilterParams {
    pub status: Option<AppointmentStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub instructor_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub candidate_id: Option<Uuid>,
    /// Only appointments starting at or after this instant
    pub from: Option<DateTime<Utc>>,
    /// Only appointments starting before this instant
    pub to: Option<DateTime<Utc>>,
}

/// An appointment must end strictly after it starts.
pub fn ensure_valid_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::validation(vec![FieldError::new(
            "end_time",
            "End time must be after start time",
        )]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_window_validation() {
        let start = Utc::now();
        assert!(ensure_valid_window(start, start + Duration::minutes(60)).is_ok());

        let err = ensure_valid_window(start, start).unwrap_err();
        assert_eq!(err.errors[0].field, "end_time");
        assert!(ensure_valid_window(start, start - Duration::minutes(1)).is_err());
    }
}
