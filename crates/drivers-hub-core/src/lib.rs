//! # Drivers Hub Core
//!
//! Foundational types shared by every Drivers Hub crate:
//!
//! - [`errors`]: the application error type and its HTTP translation
//! - [`file_storage`]: storage backend for uploaded candidate documents
//! - [`pagination`]: page/limit query parameters and list envelopes
//! - [`password`]: bcrypt hashing and verification
//! - [`serde`]: query-string friendly deserializers
//!
//! ```ignore
//! use drivers_hub_core::{AppError, PaginationParams, hash_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Candidate not found"));
//! let hash = hash_password("secure_password")?;
//! let offset = PaginationParams::default().offset();
//! ```

pub mod errors;
pub mod file_storage;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::{AppError, ErrorResponse, FieldError};
pub use file_storage::{FileStorage, LocalFileStorage, StorageError};
pub use pagination::{Paginated, PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
