//! # Drivers Hub Config
//!
//! Configuration structures loaded from environment variables at startup:
//!
//! - [`database`]: connection string and pool size
//! - [`jwt`]: token signing secret and lifetime
//! - [`cors`]: allowed browser origins
//! - [`email`]: SMTP, Ethereal preview and sender settings
//! - [`server`]: port, environment, uploads, logging and metrics
//!
//! ```ignore
//! use drivers_hub_config::{CorsConfig, EmailConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let email_config = EmailConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use email::{EmailConfig, MailTransportKind, SmtpSettings};
pub use jwt::JwtConfig;
pub use server::{Environment, ServerConfig};

/// Read an environment variable, treating blank values as unset.
pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    non_empty_var(name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
