//! Ledgerwise is a web service for tracking personal finances.
//!
//! This library provides a JSON REST API for storing transactions, sorting them
//! into categories with keyword rules, importing them in bulk from CSV and XLSX
//! files, and reporting on where the money went.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
pub mod auth;
mod category;
mod database_id;
mod db;
pub mod endpoints;
pub mod import;
mod logging;
mod password;
mod register_user;
pub mod report;
mod routing;
pub mod rule;
#[cfg(test)]
mod test_utils;
pub mod transaction;
mod user;

pub use app_state::{AppState, AuthConfig};
pub use category::{DEFAULT_CATEGORIES, UNCATEGORIZED, categorize};
pub use db::initialize as initialize_db;
pub use import::{FileFormat, ingest};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use report::{
    CategoryTotal, MonthlyTotal, MonthlyTrends, Summary, category_breakdown, monthly_trends,
    summarize,
};
pub use routing::build_router;
pub use user::{User, UserID};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username or password did not match a registered user.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The bearer token is missing, malformed or expired.
    #[error("missing or invalid access token")]
    Unauthorized,

    /// The access token could not be created.
    #[error("could not create access token: {0}")]
    TokenCreation(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The username is already taken by another user.
    #[error("the username \"{0}\" is already registered")]
    DuplicateUsername(String),

    /// A rule with the same keyword (ignoring case) already exists.
    #[error("a rule for the keyword \"{0}\" already exists")]
    DuplicateKeyword(String),

    /// A required text field was empty or otherwise unusable.
    #[error("{0}")]
    InvalidInput(String),

    /// The uploaded file does not have a supported extension.
    ///
    /// Holds the offending file name.
    #[error("unsupported file format for \"{0}\", expected a .csv or .xlsx file")]
    UnsupportedFormat(String),

    /// The header row of an uploaded file is missing a required column.
    #[error("the file is missing the required column \"{0}\"")]
    MissingColumn(String),

    /// A row in an uploaded file could not be turned into a transaction.
    ///
    /// `row` is the 1-based row number in the file, where the header is row 1.
    #[error("row {row}: {reason}")]
    MalformedRow {
        /// The 1-based row number in the file.
        row: usize,
        /// What was wrong with the row.
        reason: String,
    },

    /// The uploaded file could not be read as CSV or XLSX at all.
    #[error("could not read the file: {0}")]
    InvalidFile(String),

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The request body could not be read within the limit of `0` bytes.
    #[error("the request body is larger than {0} bytes or could not be read")]
    PayloadTooLarge(usize),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_) | Error::InvalidInput(_) | Error::MultipartError(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::DuplicateUsername(_) | Error::DuplicateKeyword(_) => StatusCode::CONFLICT,
            Error::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::MissingColumn(_) | Error::MalformedRow { .. } | Error::InvalidFile(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::TokenCreation(_)
            | Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal errors are logged here and never shown to the client.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        let body = match self {
            Error::MalformedRow { row, .. } => json!({ "error": message, "row": row }),
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    async fn response_json(error: Error) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn malformed_row_reports_row_number() {
        let (status, body) = response_json(Error::MalformedRow {
            row: 3,
            reason: "missing value for \"amount\"".to_owned(),
        })
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["row"], 3);
        assert_eq!(body["error"], "row 3: missing value for \"amount\"");
    }

    #[tokio::test]
    async fn internal_errors_are_not_shown_to_client() {
        let (status, body) = response_json(Error::HashingError("secret detail".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("secret detail"));
    }

    #[tokio::test]
    async fn taxonomy_maps_to_distinct_statuses() {
        assert_eq!(
            Error::DuplicateKeyword("Amazon".to_owned())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(Error::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::UnsupportedFormat("a.pdf".to_owned())
                .into_response()
                .status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            Error::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::PayloadTooLarge(16).into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
