use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::serde::merge_nullable;
use drivers_hub_core::{AppError, Paginated, PaginationParams};
use drivers_hub_models::appointments::ensure_valid_window;
use drivers_hub_models::{
    Appointment, AppointmentFilterParams, CreateAppointmentDto, UpdateAppointmentDto,
};

use crate::metrics::track_entity_created;
use crate::modules::candidates::service::CandidateService;
use crate::modules::instructors::service::InstructorService;
use crate::modules::notifications::service::NotificationService;
use crate::utils::auth_helpers::InstructorScope;
use crate::utils::db::reference_violation;
use crate::utils::email::EmailService;

const APPOINTMENT_SELECT: &str = r#"SELECT
        a.id, a.candidate_id, a.instructor_id, a.car_id, a.start_time, a.end_time,
        a.status, a.notes, a.created_at, a.updated_at,
        (c.first_name || ' ' || c.last_name) AS candidate_name,
        (iu.first_name || ' ' || iu.last_name) AS instructor_name,
        car.license_plate AS car_license_plate
    FROM appointments a
    JOIN candidates c ON c.id = a.candidate_id
    JOIN instructors i ON i.id = a.instructor_id
    JOIN users iu ON iu.id = i.user_id
    LEFT JOIN cars car ON car.id = a.car_id"#;

const APPOINTMENT_FILTER: &str = r#"WHERE ($1::appointment_status IS NULL OR a.status = $1)
      AND ($2::uuid IS NULL OR a.instructor_id = $2)
      AND ($3::uuid IS NULL OR a.candidate_id = $3)
      AND ($4::timestamptz IS NULL OR a.start_time >= $4)
      AND ($5::timestamptz IS NULL OR a.start_time < $5)"#;

const UNKNOWN_REFERENCE: &str = "Referenced candidate, instructor or car does not exist";

pub struct AppointmentService;

impl AppointmentService {
    async fn fetch(conn: &mut PgConnection, id: Uuid) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(&format!("{} WHERE a.id = $1", APPOINTMENT_SELECT))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Appointment not found")))
    }

    /// Load an appointment the caller may see. Other instructors' appointments are reported as missing.
    async fn fetch_scoped(
        conn: &mut PgConnection,
        scope: InstructorScope,
        id: Uuid,
    ) -> Result<Appointment, AppError> {
        let appointment = Self::fetch(conn, id).await?;
        if !scope.permits(appointment.instructor_id) {
            return Err(AppError::not_found(anyhow::anyhow!("Appointment not found")));
        }
        Ok(appointment)
    }

    #[instrument(skip(db))]
    pub async fn get_appointments(
        db: &PgPool,
        scope: InstructorScope,
        filters: &AppointmentFilterParams,
        pagination: &PaginationParams,
    ) -> Result<Paginated<Appointment>, AppError> {
        let instructor_id = scope.filter(filters.instructor_id);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM appointments a {}",
            APPOINTMENT_FILTER
        ))
        .bind(filters.status)
        .bind(instructor_id)
        .bind(filters.candidate_id)
        .bind(filters.from)
        .bind(filters.to)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Appointment>(&format!(
            "{} {} ORDER BY a.start_time, a.id LIMIT $6 OFFSET $7",
            APPOINTMENT_SELECT, APPOINTMENT_FILTER
        ))
        .bind(filters.status)
        .bind(instructor_id)
        .bind(filters.candidate_id)
        .bind(filters.from)
        .bind(filters.to)
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
    pub async fn get_appointment(
        db: &PgPool,
        scope: InstructorScope,
        id: Uuid,
    ) -> Result<Appointment, AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch_scoped(&mut conn, scope, id).await
    }

    /// Book a lesson and notify admins and the instructor in one transaction.
    #[instrument(skip(db, dto))]
    pub async fn create_appointment(
        db: &PgPool,
        scope: InstructorScope,
        dto: CreateAppointmentDto,
    ) -> Result<Appointment, AppError> {
        ensure_valid_window(dto.start_time, dto.end_time)?;
        let instructor_id = scope.assign(dto.instructor_id)?;

        let mut tx = db.begin().await?;
        InstructorService::ensure_assignable(&mut tx, instructor_id).await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO appointments
                (candidate_id, instructor_id, car_id, start_time, end_time, status, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id"#,
        )
        .bind(dto.candidate_id)
        .bind(instructor_id)
        .bind(dto.car_id)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(dto.status.unwrap_or_default())
        .bind(&dto.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| reference_violation(e, UNKNOWN_REFERENCE))?;

        let appointment = Self::fetch(&mut tx, id).await?;
        let candidate_name = appointment.candidate_name.clone().unwrap_or_default();
        NotificationService::notify_appointment_created(&mut tx, &appointment, &candidate_name)
            .await?;

        tx.commit().await?;

        track_entity_created("appointment");
        tracing::info!(appointment_id = %appointment.id, %instructor_id, "Appointment booked");
        Ok(appointment)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_appointment(
        db: &PgPool,
        scope: InstructorScope,
        id: Uuid,
        dto: UpdateAppointmentDto,
    ) -> Result<Appointment, AppError> {
        let mut conn = db.acquire().await?;
        let existing = Self::fetch_scoped(&mut conn, scope, id).await?;

        let instructor_id = match dto.instructor_id {
            Some(requested) => scope.assign(Some(requested))?,
            None => existing.instructor_id,
        };
        if instructor_id != existing.instructor_id {
            InstructorService::ensure_assignable(&mut conn, instructor_id).await?;
        }
        let start_time = dto.start_time.unwrap_or(existing.start_time);
        let end_time = dto.end_time.unwrap_or(existing.end_time);
        ensure_valid_window(start_time, end_time)?;

        sqlx::query(
            r#"UPDATE appointments
               SET candidate_id = $1, instructor_id = $2, car_id = $3, start_time = $4,
                   end_time = $5, status = $6, notes = $7, updated_at = NOW()
               WHERE id = $8"#,
        )
        .bind(dto.candidate_id.unwrap_or(existing.candidate_id))
        .bind(instructor_id)
        .bind(merge_nullable(dto.car_id, existing.car_id))
        .bind(start_time)
        .bind(end_time)
        .bind(dto.status.unwrap_or(existing.status))
        .bind(merge_nullable(dto.notes, existing.notes))
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| reference_violation(e, UNKNOWN_REFERENCE))?;

        Self::fetch(&mut conn, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_appointment(
        db: &PgPool,
        scope: InstructorScope,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch_scoped(&mut conn, scope, id).await?;

        sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Email the candidate a reminder. Unlike creation emails, a failure here is the response.
    #[instrument(skip(db, email))]
    pub async fn send_reminder(
        db: &PgPool,
        email: &EmailService,
        scope: InstructorScope,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut conn = db.acquire().await?;
        let appointment = Self::fetch_scoped(&mut conn, scope, id).await?;
        let candidate = CandidateService::fetch(&mut conn, appointment.candidate_id).await?;
        drop(conn);

        email
            .send_appointment_reminder(&appointment, &candidate)
            .await
            .map_err(|e| e.into_app_error())?;
        Ok(())
    }
}
