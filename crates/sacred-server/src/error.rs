//! HTTP error types for `SacredSecret` server.
//!
//! Maps domain errors from `sacred-core` into appropriate HTTP responses.
//! Every error variant produces a JSON body with a machine-readable `error`
//! field and a human-readable `message`.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sacred_core::FormReport;
use sacred_core::error::RegistrationError;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// One or more fields failed validation; nothing was registered.
    ValidationFailed(BTreeMap<String, String>),
    /// Client sent invalid input.
    BadRequest(String),
    /// A conflict (e.g., email already registered).
    Conflict(String),
    /// The upstream account service failed.
    BadGateway(String),
    /// Internal server error.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message, fields) = match self {
            Self::ValidationFailed(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                format!("{} field(s) failed validation", fields.len()),
                Some(fields),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "bad_gateway", msg, None),
            Self::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg,
                None,
            ),
        };

        let body = ErrorBody {
            error: error_type,
            message,
            fields,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<&FormReport> for AppError {
    fn from(report: &FormReport) -> Self {
        Self::ValidationFailed(
            report
                .errors()
                .into_iter()
                .map(|(field, message)| (field.to_owned(), message.to_owned()))
                .collect(),
        )
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::AlreadyRegistered { .. } => Self::Conflict(err.to_string()),
            RegistrationError::Rejected { .. } => Self::BadRequest(err.to_string()),
            RegistrationError::Upstream { .. } => Self::BadGateway(err.to_string()),
            RegistrationError::Internal { .. } => Self::Internal(err.to_string()),
        }
    }
}
