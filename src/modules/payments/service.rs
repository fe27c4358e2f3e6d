use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, Paginated, PaginationParams};
use drivers_hub_models::payments::becomes_paid;
use drivers_hub_models::{
    CreatePaymentDto, Payment, PaymentFilterParams, PaymentStatus, UpdatePaymentDto,
};

use crate::metrics::track_entity_created;
use crate::modules::candidates::service::CandidateService;
use crate::modules::notifications::service::NotificationService;
use crate::utils::db::reference_violation;
use crate::utils::email::EmailService;

const PAYMENT_SELECT: &str = r#"SELECT
        pay.id, pay.candidate_id, pay.amount, pay.method, pay.status, pay.reference,
        pay.notes, pay.paid_at, pay.created_by, pay.created_at, pay.updated_at,
        (c.first_name || ' ' || c.last_name) AS candidate_name,
        c.unique_client_number AS candidate_client_number
    FROM payments pay
    JOIN candidates c ON c.id = pay.candidate_id"#;

const PAYMENT_FILTER: &str = r#"WHERE ($1::uuid IS NULL OR pay.candidate_id = $1)
      AND ($2::payment_status IS NULL OR pay.status = $2)"#;

pub struct PaymentService;

impl PaymentService {
    async fn fetch(conn: &mut PgConnection, id: Uuid) -> Result<Payment, AppError> {
        sqlx::query_as::<_, Payment>(&format!("{} WHERE pay.id = $1", PAYMENT_SELECT))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Payment not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_payments(
        db: &PgPool,
        filters: &PaymentFilterParams,
        pagination: &PaginationParams,
    ) -> Result<Paginated<Payment>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM payments pay {}",
            PAYMENT_FILTER
        ))
        .bind(filters.candidate_id)
        .bind(filters.status)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Payment>(&format!(
            "{} {} ORDER BY pay.created_at DESC, pay.id LIMIT $3 OFFSET $4",
            PAYMENT_SELECT, PAYMENT_FILTER
        ))
        .bind(filters.candidate_id)
        .bind(filters.status)
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
    pub async fn get_payment(db: &PgPool, id: Uuid) -> Result<Payment, AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    /// Record a payment and notify admins in one transaction.
    ///
    /// A payment recorded as paid gets `paid_at` stamped and a confirmation email after commit.
    #[instrument(skip(db, email, dto))]
    pub async fn create_payment(
        db: &PgPool,
        email: &EmailService,
        created_by: Uuid,
        dto: CreatePaymentDto,
    ) -> Result<Payment, AppError> {
        let status = dto.status.unwrap_or_default();
        let mut tx = db.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO payments
                (candidate_id, amount, method, status, reference, notes, paid_at, created_by)
               VALUES ($1, $2, $3, $4, $5, $6,
                       CASE WHEN $4 = 'paid'::payment_status THEN NOW() END, $7)
               RETURNING id"#,
        )
        .bind(dto.candidate_id)
        .bind(dto.amount)
        .bind(dto.method)
        .bind(status)
        .bind(&dto.reference)
        .bind(&dto.notes)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| reference_violation(e, "Candidate not found"))?;

        let payment = Self::fetch(&mut tx, id).await?;
        let candidate_name = payment.candidate_name.clone().unwrap_or_default();
        NotificationService::notify_payment_created(&mut tx, &payment, &candidate_name).await?;

        tx.commit().await?;

        track_entity_created("payment");
        tracing::info!(payment_id = %payment.id, candidate_id = %payment.candidate_id, amount = payment.amount, "Payment recorded");

        if becomes_paid(None, payment.status) {
            Self::send_confirmation(db, email, &payment).await;
        }

        Ok(payment)
    }

    #[instrument(skip(db, email, dto))]
    pub async fn update_payment(
        db: &PgPool,
        email: &EmailService,
        id: Uuid,
        dto: UpdatePaymentDto,
    ) -> Result<Payment, AppError> {
        let mut conn = db.acquire().await?;
        let existing = Self::fetch(&mut conn, id).await?;

        let status = dto.status.unwrap_or(existing.status);
        let paid_at = match status {
            PaymentStatus::Paid => existing.paid_at.or_else(|| Some(chrono::Utc::now())),
            PaymentStatus::Pending => None,
        };

        sqlx::query(
            r#"UPDATE payments
               SET amount = $1, method = $2, status = $3, reference = $4, notes = $5,
                   paid_at = $6, updated_at = NOW()
               WHERE id = $7"#,
        )
        .bind(dto.amount.unwrap_or(existing.amount))
        .bind(dto.method.unwrap_or(existing.method))
        .bind(status)
        .bind(dto.reference.or(existing.reference))
        .bind(dto.notes.or(existing.notes))
        .bind(paid_at)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        let payment = Self::fetch(&mut conn, id).await?;
        drop(conn);

        if becomes_paid(Some(existing.status), payment.status) {
            Self::send_confirmation(db, email, &payment).await;
        }

        Ok(payment)
    }

    #[instrument(skip(db))]
    pub async fn delete_payment(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Payment not found")));
        }
        Ok(())
    }

    async fn send_confirmation(db: &PgPool, email: &EmailService, payment: &Payment) {
        let candidate = match CandidateService::get_candidate(db, payment.candidate_id).await {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(payment_id = %payment.id, error = %e.public_message(), "Payment confirmation not sent");
                return;
            }
        };
        if candidate.email.is_none() {
            tracing::debug!(payment_id = %payment.id, "Candidate has no email; skipping payment confirmation");
            return;
        }
        if let Err(e) = email.send_payment_confirmation(payment, &candidate).await {
            tracing::warn!(payment_id = %payment.id, error = %e, "Payment confirmation not sent");
        }
    }
}
