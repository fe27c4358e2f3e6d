//! Notification storage and fan-out.
//!
//! Fan-out helpers take a connection rather than the pool: callers run them
//! inside the transaction that created the entity, so the entity and its
//! notifications commit or roll back together.

use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_core::{AppError, Paginated, PaginationParams};
use drivers_hub_models::{
    Appointment, Candidate, Car, Instructor, Notification, NotificationEvent,
    NotificationFilterParams, NotificationMessage, Package, Payment, UserRole,
};

use crate::metrics::track_notifications_fanned_out;

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, notification_type, read, related_entity, related_id, created_at";

pub struct NotificationService;

impl NotificationService {
    /// Store one notification for an existing user.
    #[instrument(skip(db))]
    pub async fn create_notification(
        db: &PgPool,
        user_id: Uuid,
        message: &NotificationMessage,
    ) -> Result<Notification, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(db)
                .await?;
        if !exists {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"INSERT INTO notifications (user_id, title, message, notification_type, related_entity, related_id)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {}"#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(&message.title)
        .bind(&message.message)
        .bind(message.notification_type)
        .bind(&message.related_entity)
        .bind(message.related_id)
        .fetch_one(db)
        .await?;

        Ok(notification)
    }

    /// Insert the same notification for every user in `user_ids` with one statement.
    pub async fn create_for_users(
        conn: &mut PgConnection,
        user_ids: &[Uuid],
        message: &NotificationMessage,
    ) -> Result<u64, AppError> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"INSERT INTO notifications (user_id, title, message, notification_type, related_entity, related_id)
               SELECT recipient, $2, $3, $4, $5, $6 FROM UNNEST($1::uuid[]) AS recipient"#,
        )
        .bind(user_ids)
        .bind(&message.title)
        .bind(&message.message)
        .bind(message.notification_type)
        .bind(&message.related_entity)
        .bind(message.related_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    async fn admin_user_ids(conn: &mut PgConnection) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE role = $1")
            .bind(UserRole::Admin)
            .fetch_all(&mut *conn)
            .await?;
        Ok(ids)
    }

    async fn instructor_user_id(
        conn: &mut PgConnection,
        instructor_id: Uuid,
    ) -> Result<Option<Uuid>, AppError> {
        let user_id =
            sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM instructors WHERE id = $1")
                .bind(instructor_id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(user_id)
    }

    /// Notify every admin and, where the event concerns one instructor, that instructor.
    ///
    /// Returns the number of notifications written.
    #[instrument(skip(conn), fields(event = event.kind()))]
    pub async fn fan_out(
        conn: &mut PgConnection,
        event: &NotificationEvent,
    ) -> Result<u64, AppError> {
        let admins = Self::admin_user_ids(conn).await?;
        let mut written = Self::create_for_users(conn, &admins, &event.admin_message()).await?;

        if let (Some(instructor_id), Some(message)) =
            (event.affected_instructor(), event.instructor_message())
        {
            match Self::instructor_user_id(conn, instructor_id).await? {
                Some(user_id) => {
                    written += Self::create_for_users(conn, &[user_id], &message).await?;
                }
                None => {
                    tracing::warn!(%instructor_id, "Affected instructor not found; skipping instructor notification");
                }
            }
        }

        tracing::debug!(admins = admins.len(), written, "Notifications fanned out");
        track_notifications_fanned_out(event.kind(), written as usize);
        Ok(written)
    }

    pub async fn notify_candidate_created(
        conn: &mut PgConnection,
        candidate: &Candidate,
    ) -> Result<u64, AppError> {
        let event = NotificationEvent::CandidateCreated {
            candidate_id: candidate.id,
            name: candidate.full_name(),
            client_number: candidate.unique_client_number.clone(),
            instructor_id: candidate.instructor_id,
        };
        Self::fan_out(conn, &event).await
    }

    pub async fn notify_instructor_created(
        conn: &mut PgConnection,
        instructor: &Instructor,
    ) -> Result<u64, AppError> {
        let event = NotificationEvent::InstructorCreated {
            instructor_id: instructor.id,
            name: instructor.full_name(),
        };
        Self::fan_out(conn, &event).await
    }

    pub async fn notify_car_created(conn: &mut PgConnection, car: &Car) -> Result<u64, AppError> {
        let event = NotificationEvent::CarCreated {
            car_id: car.id,
            model: car.model.clone(),
            license_plate: car.license_plate.clone(),
        };
        Self::fan_out(conn, &event).await
    }

    pub async fn notify_package_created(
        conn: &mut PgConnection,
        package: &Package,
    ) -> Result<u64, AppError> {
        let event = NotificationEvent::PackageCreated {
            package_id: package.id,
            name: package.name.clone(),
            price: package.price,
            hours: package.hours,
        };
        Self::fan_out(conn, &event).await
    }

    pub async fn notify_appointment_created(
        conn: &mut PgConnection,
        appointment: &Appointment,
        candidate_name: &str,
    ) -> Result<u64, AppError> {
        let event = NotificationEvent::AppointmentCreated {
            appointment_id: appointment.id,
            candidate_name: candidate_name.to_string(),
            instructor_id: appointment.instructor_id,
            start_time: appointment.start_time,
        };
        Self::fan_out(conn, &event).await
    }

    pub async fn notify_payment_created(
        conn: &mut PgConnection,
        payment: &Payment,
        candidate_name: &str,
    ) -> Result<u64, AppError> {
        let event = NotificationEvent::PaymentCreated {
            payment_id: payment.id,
            candidate_name: candidate_name.to_string(),
            amount: payment.amount,
            method: payment.method,
        };
        Self::fan_out(conn, &event).await
    }

    #[instrument(skip(db))]
    pub async fn get_user_notifications(
        db: &PgPool,
        user_id: Uuid,
        filters: &NotificationFilterParams,
        pagination: &PaginationParams,
    ) -> Result<Paginated<Notification>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND ($2::boolean IS NULL OR read = $2)",
        )
        .bind(user_id)
        .bind(filters.read)
        .fetch_one(db)
        .await?;

        let data = sqlx::query_as::<_, Notification>(&format!(
            r#"SELECT {} FROM notifications
               WHERE user_id = $1 AND ($2::boolean IS NULL OR read = $2)
               ORDER BY created_at DESC, id
               LIMIT $3 OFFSET $4"#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(filters.read)
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
    pub async fn get_unread_count(db: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(count)
    }

    /// Mark one of the caller's notifications as read. Someone else's id is a 404.
    #[instrument(skip(db))]
    pub async fn mark_as_read(
        db: &PgPool,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOTIFICATION_COLUMNS
        ))
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Notification not found")))
    }

    #[instrument(skip(db))]
    pub async fn mark_all_as_read(db: &PgPool, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(db))]
    pub async fn delete_notification(
        db: &PgPool,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Notification not found")));
        }
        Ok(())
    }
}
