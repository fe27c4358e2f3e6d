use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::serde::merge_nullable;
use drivers_hub_core::{AppError, FileStorage, Paginated, PaginationParams};
use drivers_hub_models::candidates::{
    CLIENT_NUMBER_COUNTER, MAX_CLIENT_NUMBER_ATTEMPTS, fallback_client_number,
    format_client_number,
};
use drivers_hub_models::{
    Candidate, CandidateFilterParams, CreateCandidateDto, UpdateCandidateDto,
};

use crate::metrics::track_entity_created;
use crate::modules::instructors::service::InstructorService;
use crate::modules::notifications::service::NotificationService;
use crate::utils::db::like_pattern;
use crate::utils::email::EmailService;

/// Candidate columns plus package, instructor and car display fields.
pub(crate) const CANDIDATE_SELECT: &str = r#"SELECT
        c.id, c.unique_client_number, c.first_name, c.last_name, c.email, c.phone,
        c.address, c.date_of_birth, c.status, c.package_id, c.instructor_id, c.car_id,
        c.notes, c.created_at, c.updated_at,
        p.name AS package_name,
        (iu.first_name || ' ' || iu.last_name) AS instructor_name,
        car.license_plate AS car_license_plate
    FROM candidates c
    LEFT JOIN packages p ON p.id = c.package_id
    LEFT JOIN instructors i ON i.id = c.instructor_id
    LEFT JOIN users iu ON iu.id = i.user_id
    LEFT JOIN cars car ON car.id = c.car_id"#;

const CANDIDATE_FILTER: &str = r#"WHERE ($1::candidate_status IS NULL OR c.status = $1)
      AND ($2::uuid IS NULL OR c.instructor_id = $2)
      AND ($3::text IS NULL
           OR (c.first_name || ' ' || c.last_name) ILIKE $3
           OR c.email ILIKE $3
           OR c.unique_client_number ILIKE $3)"#;

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::bad_request(anyhow::anyhow!("Client number already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow::anyhow!(
                "Referenced package, instructor or car does not exist"
            ));
        }
    }
    AppError::database(e)
}

pub struct CandidateService;

impl CandidateService {
    /// Next free `CLI-NNNNNN` number.
    ///
    /// The counter row is incremented inside the caller's transaction, so it
    /// stays locked until commit and concurrent creations are serialised. The
    /// existence check covers numbers supplied by hand on import; after
    /// [`MAX_CLIENT_NUMBER_ATTEMPTS`] taken numbers the timestamp fallback is used,
    /// and a taken fallback is a 500.
    pub async fn next_client_number(conn: &mut PgConnection) -> Result<String, AppError> {
        Self::next_client_number_at(conn, Utc::now().timestamp_millis()).await
    }

    /// [`Self::next_client_number`] with the fallback timestamp supplied by the caller.
    pub async fn next_client_number_at(
        conn: &mut PgConnection,
        now_millis: i64,
    ) -> Result<String, AppError> {
        for attempt in 1..=MAX_CLIENT_NUMBER_ATTEMPTS {
            let sequence = sqlx::query_scalar::<_, i64>(
                r#"INSERT INTO counters (name, value) VALUES ($1, 1)
                   ON CONFLICT (name) DO UPDATE SET value = counters.value + 1
                   RETURNING value"#,
            )
            .bind(CLIENT_NUMBER_COUNTER)
            .fetch_one(&mut *conn)
            .await?;

            let client_number = format_client_number(sequence);
            let taken = Self::client_number_taken(conn, &client_number).await?;

            if !taken {
                return Ok(client_number);
            }
            tracing::warn!(attempt, %client_number, "Client number already taken, retrying");
        }

        let fallback = fallback_client_number(now_millis);
        let taken = Self::client_number_taken(conn, &fallback).await?;
        if taken {
            return Err(AppError::internal_error(format!(
                "Could not allocate a client number after {} attempts",
                MAX_CLIENT_NUMBER_ATTEMPTS
            )));
        }

        tracing::warn!(%fallback, "Client number attempts exhausted, using timestamp fallback");
        Ok(fallback)
    }

    async fn client_number_taken(
        conn: &mut PgConnection,
        client_number: &str,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM candidates WHERE unique_client_number = $1)",
        )
        .bind(client_number)
        .fetch_one(&mut *conn)
        .await?;
        Ok(taken)
    }

    pub(crate) async fn fetch(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Candidate, AppError> {
        sqlx::query_as::<_, Candidate>(&format!("{} WHERE c.id = $1", CANDIDATE_SELECT))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Candidate not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_candidate(db: &PgPool, id: Uuid) -> Result<Candidate, AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_candidates(
        db: &PgPool,
        filters: &CandidateFilterParams,
        pagination: &PaginationParams,
    ) -> Result<Paginated<Candidate>, AppError> {
        let search = like_pattern(filters.search.as_deref());

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM candidates c {}",
            CANDIDATE_FILTER
        ))
        .bind(filters.status)
        .bind(filters.instructor_id)
        .bind(&search)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Candidate>(&format!(
            "{} {} ORDER BY c.created_at DESC, c.id LIMIT $4 OFFSET $5",
            CANDIDATE_SELECT, CANDIDATE_FILTER
        ))
        .bind(filters.status)
        .bind(filters.instructor_id)
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

    /// Every candidate, for export.
    #[instrument(skip(db))]
    pub async fn get_all_candidates(db: &PgPool) -> Result<Vec<Candidate>, AppError> {
        let candidates = sqlx::query_as::<_, Candidate>(&format!(
            "{} ORDER BY c.unique_client_number",
            CANDIDATE_SELECT
        ))
        .fetch_all(db)
        .await?;
        Ok(candidates)
    }

    /// Create a candidate and notify admins (and the assigned instructor) atomically.
    ///
    /// Emails go out after commit; a failed send is logged and does not undo the candidate.
    #[instrument(skip(db, email, dto))]
    pub async fn create_candidate(
        db: &PgPool,
        email: &EmailService,
        dto: CreateCandidateDto,
    ) -> Result<Candidate, AppError> {
        let mut tx = db.begin().await?;

        let client_number = match dto
            .unique_client_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(supplied) => supplied.to_string(),
            None => Self::next_client_number(&mut tx).await?,
        };
        if let Some(instructor_id) = dto.instructor_id {
            InstructorService::ensure_assignable(&mut tx, instructor_id).await?;
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO candidates
                (unique_client_number, first_name, last_name, email, phone, address,
                 date_of_birth, status, package_id, instructor_id, car_id, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING id"#,
        )
        .bind(&client_number)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(dto.email.as_deref().map(|e| e.trim().to_lowercase()))
        .bind(&dto.phone)
        .bind(&dto.address)
        .bind(dto.date_of_birth)
        .bind(dto.status.unwrap_or_default())
        .bind(dto.package_id)
        .bind(dto.instructor_id)
        .bind(dto.car_id)
        .bind(&dto.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        let candidate = Self::fetch(&mut tx, id).await?;
        NotificationService::notify_candidate_created(&mut tx, &candidate).await?;

        tx.commit().await?;

        track_entity_created("candidate");
        tracing::info!(candidate_id = %candidate.id, client_number = %candidate.unique_client_number, "Candidate created");

        if candidate.email.is_some()
            && let Err(e) = email.send_welcome_email(&candidate).await
        {
            tracing::warn!(candidate_id = %candidate.id, error = %e, "Welcome email not sent");
        }
        if let Some(instructor_id) = candidate.instructor_id {
            Self::send_assignment_email(db, email, instructor_id, &candidate).await;
        }

        Ok(candidate)
    }

    async fn send_assignment_email(
        db: &PgPool,
        email: &EmailService,
        instructor_id: Uuid,
        candidate: &Candidate,
    ) {
        let result = match InstructorService::get_instructor(db, instructor_id).await {
            Ok(instructor) => email
                .send_candidate_assigned_email(&instructor, candidate)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.public_message()),
        };
        if let Err(error) = result {
            tracing::warn!(%instructor_id, candidate_id = %candidate.id, %error, "Assignment email not sent");
        }
    }

    /// Update a candidate. The client number never changes.
    #[instrument(skip(db, email, dto))]
    pub async fn update_candidate(
        db: &PgPool,
        email: &EmailService,
        id: Uuid,
        dto: UpdateCandidateDto,
    ) -> Result<Candidate, AppError> {
        let mut conn = db.acquire().await?;
        let existing = Self::fetch(&mut conn, id).await?;

        let instructor_id = merge_nullable(dto.instructor_id, existing.instructor_id);
        let instructor_changed =
            instructor_id.is_some() && instructor_id != existing.instructor_id;
        if instructor_changed && let Some(instructor_id) = instructor_id {
            InstructorService::ensure_assignable(&mut conn, instructor_id).await?;
        }

        sqlx::query(
            r#"UPDATE candidates
               SET first_name = $1, last_name = $2, email = $3, phone = $4, address = $5,
                   date_of_birth = $6, status = $7, package_id = $8, instructor_id = $9,
                   car_id = $10, notes = $11, updated_at = NOW()
               WHERE id = $12"#,
        )
        .bind(dto.first_name.map(|s| s.trim().to_string()).unwrap_or(existing.first_name))
        .bind(dto.last_name.map(|s| s.trim().to_string()).unwrap_or(existing.last_name))
        .bind(merge_nullable(
            dto.email.map(|e| e.map(|e| e.trim().to_lowercase())),
            existing.email,
        ))
        .bind(merge_nullable(dto.phone, existing.phone))
        .bind(merge_nullable(dto.address, existing.address))
        .bind(merge_nullable(dto.date_of_birth, existing.date_of_birth))
        .bind(dto.status.unwrap_or(existing.status))
        .bind(merge_nullable(dto.package_id, existing.package_id))
        .bind(instructor_id)
        .bind(merge_nullable(dto.car_id, existing.car_id))
        .bind(merge_nullable(dto.notes, existing.notes))
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_write_error)?;

        let candidate = Self::fetch(&mut conn, id).await?;
        drop(conn);

        if instructor_changed && let Some(instructor_id) = candidate.instructor_id {
            Self::send_assignment_email(db, email, instructor_id, &candidate).await;
        }

        Ok(candidate)
    }

    /// Delete a candidate with its documents, payments, appointments and reports.
    ///
    /// Stored files are removed after the rows; a file that cannot be removed is only logged.
    #[instrument(skip(db, storage))]
    pub async fn delete_candidate(
        db: &PgPool,
        storage: &dyn FileStorage,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        let keys = sqlx::query_scalar::<_, String>(
            "SELECT storage_key FROM candidate_documents WHERE candidate_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Candidate not found")));
        }

        tx.commit().await?;

        for key in keys {
            if let Err(e) = storage.delete(&key).await {
                tracing::warn!(candidate_id = %id, %key, error = %e, "Could not remove stored document");
            }
        }

        Ok(())
    }
}
