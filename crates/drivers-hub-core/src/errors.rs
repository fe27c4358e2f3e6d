//! Application error type and its HTTP translation.
//!
//! Every handler returns `Result<_, AppError>` and lets errors bubble with `?`.
//! [`AppError`] is the one place where failures become HTTP responses, so the
//! wire format of every error lives here:
//!
//! ```json
//! { "message": "Validation failed", "errors": [{ "field": "email", "message": "email is invalid" }] }
//! ```
//!
//! Server errors (5xx) are logged and, unless detailed errors were enabled with
//! [`expose_internal_errors`], reported to the client with a generic message.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationErrors;

static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Message sent in place of internal error details outside development.
pub const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

/// Toggle whether 5xx responses carry the underlying error chain.
///
/// Called once at startup with `true` in development mode only.
pub fn expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL_ERRORS.store(enabled, Ordering::Relaxed);
}

fn internal_errors_exposed() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed)
}

/// A single failed field in a validation error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub errors: Vec<FieldError>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            errors: Vec::new(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(anyhow::anyhow!(message.into()))
    }

    /// 400 with a per-field breakdown.
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!("Validation failed"),
            errors,
        }
    }

    /// 400 built from `validator` output.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        Self::validation(field_errors(errors))
    }

    /// Message the client will see for this error.
    pub fn public_message(&self) -> String {
        if self.status.is_server_error() && !internal_errors_exposed() {
            GENERIC_INTERNAL_MESSAGE.to_string()
        } else {
            format!("{:#}", self.error)
        }
    }
}

/// Flatten `validator` output into a stable, field-sorted list.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                FieldError::new(field.to_string(), message)
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "Request failed");
        }

        let body = Json(ErrorResponse {
            message: self.public_message(),
            errors: self.errors,
        });

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(email)]
        email: String,
        #[validate(length(min = 6, message = "password must be at least 6 characters"))]
        password: String,
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = AppError::not_found(anyhow::anyhow!("Candidate not found"));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Candidate not found");
    }

    #[test]
    fn test_internal_errors_are_hidden_by_default() {
        let err = AppError::internal_error("connection refused on 10.0.0.4");
        assert_eq!(err.public_message(), GENERIC_INTERNAL_MESSAGE);
    }

    #[test]
    fn test_validation_errors_are_collected_per_field() {
        let dto = Signup {
            email: "nope".to_string(),
            password: "123".to_string(),
        };
        let err = AppError::from_validation(&dto.validate().unwrap_err());

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].field, "email");
        assert_eq!(err.errors[0].message, "email is invalid");
        assert_eq!(err.errors[1].message, "password must be at least 6 characters");
    }

    #[test]
    fn test_error_response_omits_empty_errors() {
        let body = serde_json::to_value(ErrorResponse {
            message: "Forbidden".to_string(),
            errors: vec![],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Forbidden" }));
    }
}
