use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use drivers_hub_auth::create_access_token;
use drivers_hub_config::JwtConfig;
use drivers_hub_core::password::ensure_password_length;
use drivers_hub_core::{AppError, hash_password, verify_password};
use drivers_hub_models::auth::normalize_email;
use drivers_hub_models::users::USER_COLUMNS;
use drivers_hub_models::{
    ChangePasswordDto, LoginRequest, LoginResponse, RegisterRequest, User, UserRole,
    UserWithPassword,
};

use crate::metrics::{track_entity_created, track_login, track_user_created};
use crate::modules::instructors::service::InstructorService;
use crate::modules::notifications::service::NotificationService;
use crate::utils::db::unique_violation;

/// Serialises first-admin bootstrap so two anonymous sign-ups cannot both become admin.
const BOOTSTRAP_LOCK_KEY: i64 = 0x4452_4956_4552_53;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    /// Register a user.
    ///
    /// Anonymous callers may only create the very first account, which becomes
    /// an admin. After that only admins register users, with the requested
    /// role (staff by default). Registering an instructor also creates the
    /// instructor record and notifies admins in the same transaction.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn register_user(
        db: &PgPool,
        dto: RegisterRequest,
        caller: Option<&User>,
    ) -> Result<User, AppError> {
        ensure_password_length(&dto.password)?;

        let mut tx = db.begin().await?;

        let role = match caller {
            None => {
                sqlx::query("SELECT pg_advisory_xact_lock($1)")
                    .bind(BOOTSTRAP_LOCK_KEY)
                    .execute(&mut *tx)
                    .await?;
                let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
                    .fetch_one(&mut *tx)
                    .await?;
                if users > 0 {
                    return Err(AppError::forbidden(
                        "Registration is closed. Ask an admin to create your account",
                    ));
                }
                tracing::info!("Bootstrapping first admin account");
                UserRole::Admin
            }
            Some(user) if user.role == UserRole::Admin => dto.role.unwrap_or(UserRole::Staff),
            Some(_) => {
                return Err(AppError::forbidden("Only admins can register users"));
            }
        };

        let user = Self::insert_user(
            &mut tx,
            &dto.first_name,
            &dto.last_name,
            &dto.email,
            &dto.password,
            dto.phone.as_deref(),
            role,
        )
        .await?;

        if role == UserRole::Instructor {
            let instructor_id = sqlx::query_scalar::<_, Uuid>(
                "INSERT INTO instructors (user_id) VALUES ($1) RETURNING id",
            )
            .bind(user.id)
            .fetch_one(&mut *tx)
            .await?;

            let instructor = InstructorService::fetch(&mut tx, instructor_id).await?;
            NotificationService::notify_instructor_created(&mut tx, &instructor).await?;
        }

        tx.commit().await?;

        track_user_created(role.as_str());
        if role == UserRole::Instructor {
            track_entity_created("instructor");
        }
        Ok(user)
    }

    /// Hash the password and insert a user row. Emails are stored lower-case.
    pub async fn insert_user(
        conn: &mut PgConnection,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
        role: UserRole,
    ) -> Result<User, AppError> {
        ensure_password_length(password)?;
        let hashed_password = hash_password(password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users (first_name, last_name, email, password, phone, role)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {}"#,
            USER_COLUMNS
        ))
        .bind(first_name.trim())
        .bind(last_name.trim())
        .bind(normalize_email(email))
        .bind(&hashed_password)
        .bind(phone)
        .bind(role)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| unique_violation(e, "Email already exists"))?;

        Ok(user)
    }

    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let found = sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {}, password FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(normalize_email(&dto.email))
        .fetch_optional(db)
        .await?;

        let Some(UserWithPassword { user, password }) = found else {
            track_login(false);
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &password)? {
            track_login(false);
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let token = create_access_token(user.id, &user.email, user.role.code(), jwt_config)?;

        track_login(true);
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse { token, user })
    }

    /// Check the current password, then store a fresh hash of the new one.
    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        user_id: Uuid,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let stored = sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        if !verify_password(&dto.current_password, &stored)? {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Current password is incorrect"
            )));
        }

        ensure_password_length(&dto.new_password)?;
        let hashed = hash_password(&dto.new_password)?;

        sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
            .bind(&hashed)
            .bind(user_id)
            .execute(db)
            .await?;

        tracing::info!(%user_id, "Password changed");
        Ok(())
    }
}
