use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, Paginated, PaginationParams};
use drivers_hub_models::cars::normalize_license_plate;
use drivers_hub_models::{Car, CarFilterParams, CreateCarDto, UpdateCarDto};

use crate::metrics::track_entity_created;
use crate::modules::notifications::service::NotificationService;
use crate::utils::db::{like_pattern, unique_violation};

const CAR_COLUMNS: &str = "id, model, license_plate, year, transmission, status, created_at, updated_at";

const DUPLICATE_PLATE: &str = "A car with this license plate already exists";

pub struct CarService;

impl CarService {
    #[instrument(skip(db))]
    pub async fn get_cars(
        db: &PgPool,
        filters: &CarFilterParams,
        pagination: &PaginationParams,
    ) -> Result<Paginated<Car>, AppError> {
        let search = like_pattern(filters.search.as_deref());
        let filter = r#"WHERE ($1::car_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR model ILIKE $2 OR license_plate ILIKE $2)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM cars {}", filter))
            .bind(filters.status)
            .bind(&search)
            .fetch_one(db)
            .await?;

        let data = sqlx::query_as::<_, Car>(&format!(
            "SELECT {} FROM cars {} ORDER BY created_at DESC, id LIMIT $3 OFFSET $4",
            CAR_COLUMNS, filter
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
    pub async fn get_car(db: &PgPool, id: Uuid) -> Result<Car, AppError> {
        sqlx::query_as::<_, Car>(&format!("SELECT {} FROM cars WHERE id = $1", CAR_COLUMNS))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Car not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_car(db: &PgPool, dto: CreateCarDto) -> Result<Car, AppError> {
        let mut tx = db.begin().await?;

        let car = sqlx::query_as::<_, Car>(&format!(
            r#"INSERT INTO cars (model, license_plate, year, transmission, status)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {}"#,
            CAR_COLUMNS
        ))
        .bind(dto.model.trim())
        .bind(normalize_license_plate(&dto.license_plate))
        .bind(dto.year)
        .bind(&dto.transmission)
        .bind(dto.status.unwrap_or_default())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_PLATE))?;

        NotificationService::notify_car_created(&mut tx, &car).await?;
        tx.commit().await?;

        track_entity_created("car");
        Ok(car)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_car(db: &PgPool, id: Uuid, dto: UpdateCarDto) -> Result<Car, AppError> {
        let existing = Self::get_car(db, id).await?;

        let car = sqlx::query_as::<_, Car>(&format!(
            r#"UPDATE cars
               SET model = $1, license_plate = $2, year = $3, transmission = $4, status = $5,
                   updated_at = NOW()
               WHERE id = $6
               RETURNING {}"#,
            CAR_COLUMNS
        ))
        .bind(dto.model.map(|m| m.trim().to_string()).unwrap_or(existing.model))
        .bind(
            dto.license_plate
                .as_deref()
                .map(normalize_license_plate)
                .unwrap_or(existing.license_plate),
        )
        .bind(dto.year.or(existing.year))
        .bind(dto.transmission.or(existing.transmission))
        .bind(dto.status.unwrap_or(existing.status))
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_PLATE))?;

        Ok(car)
    }

    /// Remove a car; candidates and appointments referencing it lose the reference.
    #[instrument(skip(db))]
    pub async fn delete_car(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Car not found")));
        }
        Ok(())
    }
}
