//! Process-level settings: listen port, environment, uploads, logs and metrics.

use std::path::PathBuf;

use crate::{non_empty_var, parse_var};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: Environment,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Public base URL of this API, used to build document links.
    pub public_url: String,
    pub log_dir: PathBuf,
    pub metrics_enabled: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = parse_var("PORT", 5000u16);
        Self {
            port,
            environment: Environment::parse(
                &non_empty_var("APP_ENV").unwrap_or_else(|| "production".to_string()),
            ),
            upload_dir: PathBuf::from(
                non_empty_var("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()),
            ),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            public_url: non_empty_var("PUBLIC_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port)),
            log_dir: PathBuf::from(
                non_empty_var("LOG_DIR").unwrap_or_else(|| "storage/logs".to_string()),
            ),
            metrics_enabled: non_empty_var("METRICS_ENABLED")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(true),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Base URL under which stored uploads are served.
    pub fn uploads_url(&self) -> String {
        format!("{}/uploads", self.public_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse(" DEV "), Environment::Development);
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("staging"), Environment::Production);
    }

    #[test]
    fn test_uploads_url() {
        let config = ServerConfig {
            port: 5000,
            environment: Environment::Production,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            public_url: "https://api.drivershub.test/".to_string(),
            log_dir: PathBuf::from("storage/logs"),
            metrics_enabled: false,
        };
        assert_eq!(config.uploads_url(), "https://api.drivershub.test/uploads");
    }
}
