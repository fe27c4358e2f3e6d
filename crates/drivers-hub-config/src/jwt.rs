use crate::{non_empty_var, parse_var};

const DEV_SECRET: &str = "drivers-hub-dev-secret-change-me";

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret = non_empty_var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET is not set; using the development secret");
            DEV_SECRET.to_string()
        });

        Self {
            secret,
            access_token_expiry: parse_var("JWT_EXPIRY", 86_400), // 24 hours
        }
    }
}
