//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims embedded in every access token.
///
/// `role` is the numeric role code at issue time. Authorization decisions use
/// the role loaded from the database, so a demoted user loses access before
/// the token expires.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    pub email: String,
    pub role: i16,
    /// Expiration, Unix seconds
    pub exp: usize,
    /// Issued-at, Unix seconds
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}
