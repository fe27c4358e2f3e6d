//! # Drivers Hub Auth
//!
//! Access-token claims and the functions that sign and verify them.
//!
//! ```ignore
//! use drivers_hub_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(user_id, "admin@drivershub.local", 0, &jwt_config)?;
//! let claims = verify_token(&token, &jwt_config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
