//! Candidates: the students enrolled with the school.
//!
//! Each candidate gets a human-readable client number of the form
//! `CLI-NNNNNN`. The sequence comes from an atomically incremented counter;
//! [`fallback_client_number`] covers the case where the bounded collision
//! retry is exhausted.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use drivers_hub_core::serde::{deserialize_nullable, deserialize_optional_uuid};

pub const CLIENT_NUMBER_PREFIX: &str = "CLI-";

/// Row in `counters` holding the last issued client number sequence.
pub const CLIENT_NUMBER_COUNTER: &str = "candidate_client_number";

/// Attempts made to find an unused client number before falling back.
pub const MAX_CLIENT_NUMBER_ATTEMPTS: u32 = 10;

/// `CLI-` followed by the sequence zero-padded to six digits.
pub fn format_client_number(sequence: i64) -> String {
    format!("{}{:06}", CLIENT_NUMBER_PREFIX, sequence)
}

/// Client number derived from the last six digits of a millisecond timestamp.
pub fn fallback_client_number(timestamp_millis: i64) -> String {
    format_client_number(timestamp_millis.rem_euclid(1_000_000))
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "candidate_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    #[default]
    Active,
    Inactive,
}

impl CandidateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateStatus::Active => "active",
            CandidateStatus::Inactive => "inactive",
        }
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, ToSchema)]
pub struct Candidate {
    pub id: Uuid,
    #[schema(example = "CLI-000042")]
    pub unique_client_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub status: CandidateStatus,
    pub package_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[sqlx(default)]
    pub package_name: Option<String>,
    #[sqlx(default)]
    pub instructor_name: Option<String>,
    #[sqlx(default)]
    pub car_license_plate: Option<String>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateCandidateDto {
    /// Supplied only when importing existing records; generated otherwise.
    #[validate(length(min = 1, max = 20))]
    pub unique_client_number: Option<String>,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub status: Option<CandidateStatus>,
    pub package_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Partial update. The client number is immutable and not accepted here.
///
/// Nullable fields clear the stored value when sent as `null`.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateCandidateDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 50))]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<chrono::NaiveDate>)]
    pub date_of_birth: Option<Option<chrono::NaiveDate>>,
    pub status: Option<CandidateStatus>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub package_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub instructor_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub car_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

#[derive(Deserialize, Debug, Clone, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CandidateFilterParams {
    pub status: Option<CandidateStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub instructor_id: Option<Uuid>,
    /// Matches name, email or client number
    pub search: Option<String>,
}
