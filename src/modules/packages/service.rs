use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, Paginated, PaginationParams};
use drivers_hub_models::{CreatePackageDto, Package, UpdatePackageDto};

use crate::metrics::track_entity_created;
use crate::modules::notifications::service::NotificationService;
use crate::utils::db::unique_violation;

const PACKAGE_COLUMNS: &str = "id, name, description, price, hours, created_at, updated_at";

const DUPLICATE_NAME: &str = "A package with this name already exists";

pub struct PackageService;

impl PackageService {
    #[instrument(skip(db))]
    pub async fn get_packages(
        db: &PgPool,
        pagination: &PaginationParams,
    ) -> Result<Paginated<Package>, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM packages")
            .fetch_one(db)
            .await?;

        let data = sqlx::query_as::<_, Package>(&format!(
            "SELECT {} FROM packages ORDER BY price, name LIMIT $1 OFFSET $2",
            PACKAGE_COLUMNS
        ))
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
    pub async fn get_package(db: &PgPool, id: Uuid) -> Result<Package, AppError> {
        sqlx::query_as::<_, Package>(&format!(
            "SELECT {} FROM packages WHERE id = $1",
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Package not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_package(db: &PgPool, dto: CreatePackageDto) -> Result<Package, AppError> {
        let mut tx = db.begin().await?;

        let package = sqlx::query_as::<_, Package>(&format!(
            r#"INSERT INTO packages (name, description, price, hours)
               VALUES ($1, $2, $3, $4)
               RETURNING {}"#,
            PACKAGE_COLUMNS
        ))
        .bind(dto.name.trim())
        .bind(&dto.description)
        .bind(dto.price)
        .bind(dto.hours)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_NAME))?;

        NotificationService::notify_package_created(&mut tx, &package).await?;
        tx.commit().await?;

        track_entity_created("package");
        Ok(package)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_package(
        db: &PgPool,
        id: Uuid,
        dto: UpdatePackageDto,
    ) -> Result<Package, AppError> {
        let existing = Self::get_package(db, id).await?;

        let package = sqlx::query_as::<_, Package>(&format!(
            r#"UPDATE packages
               SET name = $1, description = $2, price = $3, hours = $4, updated_at = NOW()
               WHERE id = $5
               RETURNING {}"#,
            PACKAGE_COLUMNS
        ))
        .bind(dto.name.map(|n| n.trim().to_string()).unwrap_or(existing.name))
        .bind(dto.description.or(existing.description))
        .bind(dto.price.unwrap_or(existing.price))
        .bind(dto.hours.unwrap_or(existing.hours))
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_NAME))?;

        Ok(package)
    }

    #[instrument(skip(db))]
    pub async fn delete_package(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM packages WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Package not found")));
        }
        Ok(())
    }
}
