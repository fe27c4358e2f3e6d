use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use csv::{Terminator, WriterBuilder};
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::AppError;
use drivers_hub_models::{Candidate, ExportFormat, Instructor};

use crate::modules::candidates::service::CandidateService;
use crate::modules::instructors::service::InstructorService;

pub const CANDIDATE_COLUMNS: [&str; 14] = [
    "Client Number",
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Address",
    "Date of Birth",
    "Status",
    "Package",
    "Instructor",
    "Car",
    "Notes",
    "Created At",
    "ID",
];

pub const INSTRUCTOR_COLUMNS: [&str; 10] = [
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "License Number",
    "Specialties",
    "Assigned Cars",
    "Status",
    "Created At",
    "ID",
];

/// A rendered export, sent as an attachment.
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

impl IntoResponse for ExportFile {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.file_name);
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}

/// One CSV line per candidate, in [`CANDIDATE_COLUMNS`] order.
#[derive(Debug, Serialize)]
pub struct CandidateExportRow<'a> {
    client_number: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    address: Option<&'a str>,
    date_of_birth: Option<NaiveDate>,
    status: &'static str,
    package: Option<&'a str>,
    instructor: Option<&'a str>,
    car: Option<&'a str>,
    notes: Option<&'a str>,
    created_at: String,
    id: Uuid,
}

impl<'a> From<&'a Candidate> for CandidateExportRow<'a> {
    fn from(c: &'a Candidate) -> Self {
        Self {
            client_number: &c.unique_client_number,
            first_name: &c.first_name,
            last_name: &c.last_name,
            email: c.email.as_deref(),
            phone: c.phone.as_deref(),
            address: c.address.as_deref(),
            date_of_birth: c.date_of_birth,
            status: c.status.as_str(),
            package: c.package_name.as_deref(),
            instructor: c.instructor_name.as_deref(),
            car: c.car_license_plate.as_deref(),
            notes: c.notes.as_deref(),
            created_at: c.created_at.to_rfc3339(),
            id: c.id,
        }
    }
}

/// One CSV line per instructor, in [`INSTRUCTOR_COLUMNS`] order. Lists are `; `-joined.
#[derive(Debug, Serialize)]
pub struct InstructorExportRow<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: Option<&'a str>,
    license_number: Option<&'a str>,
    specialties: String,
    assigned_cars: String,
    status: &'static str,
    created_at: String,
    id: Uuid,
}

impl<'a> From<&'a Instructor> for InstructorExportRow<'a> {
    fn from(i: &'a Instructor) -> Self {
        Self {
            first_name: &i.first_name,
            last_name: &i.last_name,
            email: &i.email,
            phone: i.phone.as_deref(),
            license_number: i.license_number.as_deref(),
            specialties: i.specialties.join("; "),
            assigned_cars: i
                .assigned_car_ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            status: i.status.as_str(),
            created_at: i.created_at.to_rfc3339(),
            id: i.id,
        }
    }
}

/// CSV with CRLF line endings. The header is written even when there are no rows.
fn write_csv<'a, T, R>(header: &[&str], records: &'a [T]) -> Result<String, AppError>
where
    R: Serialize + From<&'a T>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(header).map_err(AppError::internal)?;
    for record in records {
        writer.serialize(R::from(record)).map_err(AppError::internal)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::internal(e.into_error()))?;
    String::from_utf8(bytes).map_err(AppError::internal)
}

fn render<'a, T, R>(
    stem: &str,
    format: ExportFormat,
    records: &'a [T],
    header: &[&str],
) -> Result<ExportFile, AppError>
where
    T: Serialize,
    R: Serialize + From<&'a T>,
{
    let date = Utc::now().format("%Y-%m-%d");
    match format {
        ExportFormat::Csv => Ok(ExportFile {
            file_name: format!("{}-{}.csv", stem, date),
            content_type: "text/csv; charset=utf-8",
            body: write_csv::<T, R>(header, records)?,
        }),
        ExportFormat::Json => Ok(ExportFile {
            file_name: format!("{}-{}.json", stem, date),
            content_type: "application/json",
            body: serde_json::to_string_pretty(records)?,
        }),
    }
}

pub struct ExportService;

impl ExportService {
    #[instrument(skip(db))]
    pub async fn export_candidates(
        db: &PgPool,
        format: ExportFormat,
    ) -> Result<ExportFile, AppError> {
        let candidates = CandidateService::get_all_candidates(db).await?;
        tracing::info!(count = candidates.len(), ?format, "Exporting candidates");
        render::<_, CandidateExportRow>("candidates", format, &candidates, &CANDIDATE_COLUMNS)
    }

    #[instrument(skip(db))]
    pub async fn export_instructors(
        db: &PgPool,
        format: ExportFormat,
    ) -> Result<ExportFile, AppError> {
        let instructors = InstructorService::get_all_instructors(db).await?;
        tracing::info!(count = instructors.len(), ?format, "Exporting instructors");
        render::<_, InstructorExportRow>("instructors", format, &instructors, &INSTRUCTOR_COLUMNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivers_hub_models::{CandidateStatus, InstructorStatus};

    fn candidate() -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            unique_client_number: "CLI-000042".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Obi, Jr.".to_string(),
            email: Some("ada@example.com".to_string()),
            phone: None,
            address: Some("1 \"Main\" Street".to_string()),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(2001, 4, 9),
            status: CandidateStatus::Active,
            package_id: None,
            instructor_id: None,
            car_id: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            package_name: Some("Starter".to_string()),
            instructor_name: None,
            car_license_plate: None,
        }
    }

    fn csv_lines(body: &str) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(body.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_candidate_csv_matches_header() {
        let body = write_csv::<_, CandidateExportRow>(&CANDIDATE_COLUMNS, &[candidate()]).unwrap();
        let lines = csv_lines(&body);

        assert_eq!(lines[0], CANDIDATE_COLUMNS);
        let row = &lines[1];
        assert_eq!(row.len(), CANDIDATE_COLUMNS.len());
        assert_eq!(row[0], "CLI-000042");
        assert_eq!(row[4], "");
        assert_eq!(row[6], "2001-04-09");
        assert_eq!(row[7], "active");
        assert_eq!(row[8], "Starter");
    }

    #[test]
    fn test_instructor_csv_joins_lists() {
        let car = Uuid::new_v4();
        let instructor = Instructor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: "Bola".to_string(),
            last_name: "Ade".to_string(),
            email: "bola@example.com".to_string(),
            phone: None,
            license_number: Some("LN-1".to_string()),
            specialties: vec!["manual".to_string(), "highway".to_string()],
            assigned_car_ids: vec![car],
            status: InstructorStatus::Inactive,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let body = write_csv::<_, InstructorExportRow>(&INSTRUCTOR_COLUMNS, &[instructor]).unwrap();
        let lines = csv_lines(&body);

        assert_eq!(lines[1].len(), INSTRUCTOR_COLUMNS.len());
        assert_eq!(lines[1][5], "manual; highway");
        assert_eq!(lines[1][6], car.to_string());
        assert_eq!(lines[1][7], "inactive");
    }

    #[test]
    fn test_empty_csv_still_has_header() {
        let body = write_csv::<Candidate, CandidateExportRow>(&CANDIDATE_COLUMNS, &[]).unwrap();
        assert!(body.starts_with("Client Number,First Name"));
        assert_eq!(body.matches("\r\n").count(), 1);
    }

    #[test]
    fn test_csv_export_quotes_fields() {
        let file = render::<_, CandidateExportRow>(
            "candidates",
            ExportFormat::Csv,
            &[candidate()],
            &CANDIDATE_COLUMNS,
        )
        .unwrap();

        assert!(file.file_name.starts_with("candidates-"));
        assert!(file.file_name.ends_with(".csv"));
        let mut lines = file.body.split("\r\n");
        assert!(lines.next().unwrap().starts_with("Client Number,First Name"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Obi, Jr.\""));
        assert!(row.contains("\"1 \"\"Main\"\" Street\""));
    }

    #[test]
    fn test_json_export_is_an_array() {
        let file = render::<_, CandidateExportRow>(
            "candidates",
            ExportFormat::Json,
            &[candidate()],
            &CANDIDATE_COLUMNS,
        )
        .unwrap();

        assert_eq!(file.content_type, "application/json");
        let value: serde_json::Value = serde_json::from_str(&file.body).unwrap();
        assert_eq!(value[0]["unique_client_number"], "CLI-000042");
    }
}
