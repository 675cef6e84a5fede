//! File Export error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// File Export error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied input did not match an accepted shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Spreadsheet writer error
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// PDF writer error
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Archive builder error
    #[error("Archive error: {0}")]
    Archive(String),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status reported to callers for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::InvalidInput(_) => "BAD_REQUEST",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Spreadsheet(_) | Error::Pdf(_) | Error::Csv(_) => "WRITE_FAILED",
            Error::Archive(_) => "ARCHIVE_FAILED",
            Error::Io(_) => "IO_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (
            status,
            Json(serde_json::json!({
                "error": {"code": self.code(), "message": self.to_string()}
            })),
        )
            .into_response()
    }
}

/// Result type alias for File Export operations
pub type Result<T> = std::result::Result<T, Error>;
