use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, FieldError, Paginated, PaginationParams};
use drivers_hub_models::instructors::normalize_specialties;
use drivers_hub_models::{
    CreateInstructorDto, Instructor, InstructorFilterParams, InstructorStatus,
    UpdateInstructorDto, UpdateInstructorProfileDto, UserRole,
};

use crate::metrics::{track_entity_created, track_user_created};
use crate::modules::auth::service::AuthService;
use crate::modules::notifications::service::NotificationService;
use crate::utils::db::{like_pattern, reference_violation};
use crate::utils::email::EmailService;

/// Instructor row joined with its user account and assigned car ids.
const INSTRUCTOR_SELECT: &str = r#"SELECT
        i.id, i.user_id, u.first_name, u.last_name, u.email, u.phone,
        i.license_number, i.specialties,
        ARRAY(SELECT ic.car_id FROM instructor_cars ic WHERE ic.instructor_id = i.id ORDER BY ic.car_id) AS assigned_car_ids,
        i.status, i.created_at, i.updated_at
    FROM instructors i
    JOIN users u ON u.id = i.user_id"#;

const INSTRUCTOR_FILTER: &str = r#"WHERE ($1::instructor_status IS NULL OR i.status = $1)
      AND ($2::text IS NULL
           OR (u.first_name || ' ' || u.last_name) ILIKE $2
           OR u.email ILIKE $2)"#;

pub struct InstructorService;

impl InstructorService {
    pub(crate) async fn fetch(conn: &mut PgConnection, id: Uuid) -> Result<Instructor, AppError> {
        sqlx::query_as::<_, Instructor>(&format!("{} WHERE i.id = $1", INSTRUCTOR_SELECT))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Instructor not found")))
    }

    async fn replace_cars(
        conn: &mut PgConnection,
        instructor_id: Uuid,
        car_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM instructor_cars WHERE instructor_id = $1")
            .bind(instructor_id)
            .execute(&mut *conn)
            .await?;

        if car_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"INSERT INTO instructor_cars (instructor_id, car_id)
               SELECT $1, car_id FROM UNNEST($2::uuid[]) AS car_id
               ON CONFLICT DO NOTHING"#,
        )
        .bind(instructor_id)
        .bind(car_ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| reference_violation(e, "One or more assigned cars do not exist"))?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_instructor(db: &PgPool, id: Uuid) -> Result<Instructor, AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    /// The instructor record linked to a user account.
    #[instrument(skip(db))]
    pub async fn get_instructor_by_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Instructor, AppError> {
        sqlx::query_as::<_, Instructor>(&format!("{} WHERE i.user_id = $1", INSTRUCTOR_SELECT))
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Instructor profile not found")))
    }

    /// Instructor id for a user. 403 if the user has no instructor record or it was deactivated.
    pub async fn instructor_id_for_user(db: &PgPool, user_id: Uuid) -> Result<Uuid, AppError> {
        let (id, status) = sqlx::query_as::<_, (Uuid, InstructorStatus)>(
            "SELECT id, status FROM instructors WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::forbidden("No instructor profile is linked to this account"))?;

        if status == InstructorStatus::Inactive {
            return Err(AppError::forbidden("Instructor account is inactive"));
        }
        Ok(id)
    }

    /// Reject assigning work to a deactivated instructor.
    ///
    /// Unknown ids pass here and are reported by the foreign key on write.
    pub(crate) async fn ensure_assignable(
        conn: &mut PgConnection,
        instructor_id: Uuid,
    ) -> Result<(), AppError> {
        let status = sqlx::query_scalar::<_, InstructorStatus>(
            "SELECT status FROM instructors WHERE id = $1",
        )
        .bind(instructor_id)
        .fetch_optional(&mut *conn)
        .await?;

        if status == Some(InstructorStatus::Inactive) {
            return Err(AppError::validation(vec![FieldError::new(
                "instructor_id",
                "Instructor is inactive",
            )]));
        }
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_instructors(
        db: &PgPool,
        filters: &InstructorFilterParams,
        pagination: &PaginationParams,
    ) -> Result<Paginated<Instructor>, AppError> {
        let search = like_pattern(filters.search.as_deref());

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM instructors i JOIN users u ON u.id = i.user_id {}",
            INSTRUCTOR_FILTER
        ))
        .bind(filters.status)
        .bind(&search)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Instructor>(&format!(
            "{} {} ORDER BY u.last_name, u.first_name, i.id LIMIT $3 OFFSET $4",
            INSTRUCTOR_SELECT, INSTRUCTOR_FILTER
        ))
        .bind(filters.status)
        .bind(&search)
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
    pub async fn get_all_instructors(db: &PgPool) -> Result<Vec<Instructor>, AppError> {
        let instructors = sqlx::query_as::<_, Instructor>(&format!(
            "{} ORDER BY u.last_name, u.first_name, i.id",
            INSTRUCTOR_SELECT
        ))
        .fetch_all(db)
        .await?;
        Ok(instructors)
    }

    /// Create the user account and instructor record, notify admins, then send the welcome email.
    #[instrument(skip(db, email, dto), fields(email = %dto.email))]
    pub async fn create_instructor(
        db: &PgPool,
        email: &EmailService,
        dto: CreateInstructorDto,
    ) -> Result<Instructor, AppError> {
        let mut tx = db.begin().await?;

        let user = AuthService::insert_user(
            &mut tx,
            &dto.first_name,
            &dto.last_name,
            &dto.email,
            &dto.password,
            dto.phone.as_deref(),
            UserRole::Instructor,
        )
        .await?;

        let instructor_id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO instructors (user_id, license_number, specialties)
               VALUES ($1, $2, $3)
               RETURNING id"#,
        )
        .bind(user.id)
        .bind(&dto.license_number)
        .bind(normalize_specialties(dto.specialties))
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_cars(&mut tx, instructor_id, &dto.assigned_car_ids).await?;

        let instructor = Self::fetch(&mut tx, instructor_id).await?;
        NotificationService::notify_instructor_created(&mut tx, &instructor).await?;

        tx.commit().await?;

        track_user_created(UserRole::Instructor.as_str());
        track_entity_created("instructor");
        tracing::info!(instructor_id = %instructor.id, "Instructor created");

        if let Err(e) = email.send_instructor_welcome_email(&instructor).await {
            tracing::warn!(instructor_id = %instructor.id, error = %e, "Instructor welcome email not sent");
        }

        Ok(instructor)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_instructor(
        db: &PgPool,
        id: Uuid,
        dto: UpdateInstructorDto,
    ) -> Result<Instructor, AppError> {
        let mut tx = db.begin().await?;
        let existing = Self::fetch(&mut tx, id).await?;

        sqlx::query(
            "UPDATE users SET first_name = $1, last_name = $2, phone = $3, updated_at = NOW() WHERE id = $4",
        )
        .bind(dto.first_name.map(|s| s.trim().to_string()).unwrap_or(existing.first_name))
        .bind(dto.last_name.map(|s| s.trim().to_string()).unwrap_or(existing.last_name))
        .bind(dto.phone.or(existing.phone))
        .bind(existing.user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"UPDATE instructors
               SET license_number = $1, specialties = $2, status = $3, updated_at = NOW()
               WHERE id = $4"#,
        )
        .bind(dto.license_number.or(existing.license_number))
        .bind(
            dto.specialties
                .map(normalize_specialties)
                .unwrap_or(existing.specialties),
        )
        .bind(dto.status.unwrap_or(existing.status))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(car_ids) = dto.assigned_car_ids {
            Self::replace_cars(&mut tx, id, &car_ids).await?;
        }

        let instructor = Self::fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(instructor)
    }

    /// Instructors are never removed; deleting marks them inactive.
    #[instrument(skip(db))]
    pub async fn deactivate_instructor(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE instructors SET status = $1, updated_at = NOW() WHERE id = $2")
                .bind(InstructorStatus::Inactive)
                .bind(id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Instructor not found")));
        }
        tracing::info!(instructor_id = %id, "Instructor deactivated");
        Ok(())
    }

    /// Self-service profile update for the instructor linked to `user_id`.
    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        user_id: Uuid,
        dto: UpdateInstructorProfileDto,
    ) -> Result<Instructor, AppError> {
        let existing = Self::get_instructor_by_user(db, user_id).await?;
        let mut tx = db.begin().await?;

        sqlx::query(
            "UPDATE users SET first_name = $1, last_name = $2, phone = $3, updated_at = NOW() WHERE id = $4",
        )
        .bind(dto.first_name.map(|s| s.trim().to_string()).unwrap_or(existing.first_name))
        .bind(dto.last_name.map(|s| s.trim().to_string()).unwrap_or(existing.last_name))
        .bind(dto.phone.or(existing.phone))
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if let Some(specialties) = dto.specialties {
            sqlx::query("UPDATE instructors SET specialties = $1, updated_at = NOW() WHERE id = $2")
                .bind(normalize_specialties(specialties))
                .bind(existing.id)
                .execute(&mut *tx)
                .await?;
        }

        let instructor = Self::fetch(&mut tx, existing.id).await?;
        tx.commit().await?;
        Ok(instructor)
    }
}
