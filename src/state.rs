use std::fmt;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use drivers_hub_config::{CorsConfig, EmailConfig, JwtConfig, ServerConfig};
use drivers_hub_core::{FileStorage, LocalFileStorage};

use crate::utils::email::EmailService;
use crate::utils::mailer::{EmailError, build_mailer};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub server_config: ServerConfig,
    pub email: EmailService,
    pub storage: Arc<dyn FileStorage>,
    pub metrics: Option<PrometheusHandle>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("jwt_config", &"<redacted>")
            .field("cors_config", &self.cors_config)
            .field("server_config", &self.server_config)
            .field("email", &self.email)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AppState {
    /// Wire up the mail transport and local document storage around an open pool.
    pub fn new(
        db: PgPool,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        server_config: ServerConfig,
        email_config: &EmailConfig,
        metrics: Option<PrometheusHandle>,
    ) -> Result<Self, EmailError> {
        let mailer = build_mailer(email_config)?;
        let storage = LocalFileStorage::new(
            server_config.upload_dir.clone(),
            server_config.uploads_url(),
            server_config.max_upload_bytes,
        );

        Ok(Self {
            db,
            jwt_config,
            cors_config,
            server_config,
            email: EmailService::new(mailer, email_config.frontend_url.clone()),
            storage: Arc::new(storage),
            metrics,
        })
    }
}
