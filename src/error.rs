//! Defines the app level error type and its conversion to JSON responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::validation::ValidationErrors;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body or a path parameter failed validation.
    ///
    /// `message` summarises which input was rejected, e.g. "Invalid body".
    #[error("{message}: {errors:?}")]
    Validation {
        /// A short description of the rejected input.
        message: &'static str,
        /// The individual issues found with the input.
        errors: ValidationErrors,
    },

    /// The request did not carry a session cookie.
    #[error("the session cookie is missing")]
    MissingSession,

    /// The maintenance token was missing or did not match.
    #[error("invalid admin token")]
    InvalidAdminToken,

    /// No transaction exists with the requested ID for the caller's session.
    #[error("the transaction could not be found")]
    TransactionNotFound,

    /// The requested route does not exist.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The stored amounts of a session add up to a value that is not a finite
    /// number.
    #[error("the total of session {0} is outside the supported range")]
    TotalOutOfRange(String),

    /// The lock for the database connection was poisoned.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        Error::SqlError(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation { message, errors } => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": message,
                    "error": errors,
                })),
            )
                .into_response(),
            Error::MissingSession | Error::InvalidAdminToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized." })),
            )
                .into_response(),
            Error::TransactionNotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "transaction": null,
                    "error": "Transaction not found.",
                })),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Not found." })),
            )
                .into_response(),
            Error::TotalOutOfRange(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                tracing::error!("An unexpected error occurred: {self}");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error." })),
                )
                    .into_response()
            }
        }
    }
}
