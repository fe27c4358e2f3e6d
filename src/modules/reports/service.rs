use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, Paginated, PaginationParams};
use drivers_hub_models::{CreateReportDto, Report, ReportFilterParams, UpdateReportDto};

use crate::metrics::track_entity_created;
use crate::utils::auth_helpers::InstructorScope;
use crate::utils::db::reference_violation;

const REPORT_SELECT: &str = r#"SELECT
        r.id, r.candidate_id, r.instructor_id, r.appointment_id, r.notes, r.rating,
        r.created_at, r.updated_at,
        (c.first_name || ' ' || c.last_name) AS candidate_name,
        (iu.first_name || ' ' || iu.last_name) AS instructor_name
    FROM reports r
    JOIN candidates c ON c.id = r.candidate_id
    JOIN instructors i ON i.id = r.instructor_id
    JOIN users iu ON iu.id = i.user_id"#;

const REPORT_FILTER: &str = r#"WHERE ($1::uuid IS NULL OR r.candidate_id = $1)
      AND ($2::uuid IS NULL OR r.instructor_id = $2)"#;

pub struct ReportService;

impl ReportService {
    async fn fetch_scoped(
        conn: &mut PgConnection,
        scope: InstructorScope,
        id: Uuid,
    ) -> Result<Report, AppError> {
        let report = sqlx::query_as::<_, Report>(&format!("{} WHERE r.id = $1", REPORT_SELECT))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .filter(|r| scope.permits(r.instructor_id));

        report.ok_or_else(|| AppError::not_found(anyhow::anyhow!("Report not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_reports(
        db: &PgPool,
        scope: InstructorScope,
        filters: &ReportFilterParams,
        pagination: &PaginationParams,
    ) -> Result<Paginated<Report>, AppError> {
        let instructor_id = scope.filter(filters.instructor_id);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM reports r {}",
            REPORT_FILTER
        ))
        .bind(filters.candidate_id)
        .bind(instructor_id)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Report>(&format!(
            "{} {} ORDER BY r.created_at DESC, r.id LIMIT $3 OFFSET $4",
            REPORT_SELECT, REPORT_FILTER
        ))
        .bind(filters.candidate_id)
        .bind(instructor_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(Paginated {
            data,
            meta: pagination.meta(total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_report(
        db: &PgPool,
        scope: InstructorScope,
        id: Uuid,
    ) -> Result<Report, AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch_scoped(&mut conn, scope, id).await
    }

    #[instrument(skip(db, dto))]
    pub async fn create_report(
        db: &PgPool,
        scope: InstructorScope,
        dto: CreateReportDto,
    ) -> Result<Report, AppError> {
        let instructor_id = scope.assign(dto.instructor_id)?;
        let mut conn = db.acquire().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO reports (candidate_id, instructor_id, appointment_id, notes, rating)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id"#,
        )
        .bind(dto.candidate_id)
        .bind(instructor_id)
        .bind(dto.appointment_id)
        .bind(dto.notes.trim())
        .bind(dto.rating)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            reference_violation(e, "Referenced candidate, instructor or appointment does not exist")
        })?;

        track_entity_created("report");
        Self::fetch_scoped(&mut conn, InstructorScope::All, id).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update_report(
        db: &PgPool,
        scope: InstructorScope,
        id: Uuid,
        dto: UpdateReportDto,
    ) -> Result<Report, AppError> {
        let mut conn = db.acquire().await?;
        let existing = Self::fetch_scoped(&mut conn, scope, id).await?;

        sqlx::query(
            "UPDATE reports SET notes = $1, rating = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(dto.notes.map(|n| n.trim().to_string()).unwrap_or(existing.notes))
        .bind(dto.rating.or(existing.rating))
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Self::fetch_scoped(&mut conn, scope, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_report(
        db: &PgPool,
        scope: InstructorScope,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch_scoped(&mut conn, scope, id).await?;

        sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
