//! Error taxonomy.
//!
//! Two layers, deliberately separate:
//!
//! - [`ApiError`] — per-request failures. Each maps to an HTTP status and a
//!   human-readable detail message; the request fails, the process carries
//!   on. Nothing is retried.
//! - [`Error`] — infrastructure failures (binding the listener, accepting a
//!   connection). These surface from [`Server::serve`](crate::Server::serve)
//!   and usually end the process.

use std::fmt;

use http::StatusCode;
use thiserror::Error as ThisError;

use crate::filter::{ConflictingFilters, ParseError};

/// A request-scoped failure, mapped onto the HTTP surface.
#[derive(Debug, ThisError)]
pub enum ApiError {
    /// Malformed input: wrong type, out-of-range parameter. 422.
    #[error("{0}")]
    Validation(String),

    /// Request the service cannot interpret at all. 400.
    #[error("{0}")]
    BadRequest(String),

    /// Duplicate create for an id already in the store. 409.
    #[error("String already exists")]
    AlreadyExists,

    /// Read or delete of a value that is not stored. 404.
    #[error("String not found")]
    NotFound,

    /// Empty natural-language query. 400.
    #[error("Unable to parse natural language query")]
    EmptyQuery,

    /// Parsed filters contradict each other (min > max). 422.
    #[error("Parsed query resulted in conflicting filters")]
    ConflictingFilters,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::EmptyQuery => StatusCode::BAD_REQUEST,
            Self::ConflictingFilters => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<ParseError> for ApiError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::EmptyQuery => Self::EmptyQuery,
        }
    }
}

impl From<ConflictingFilters> for ApiError {
    fn from(_: ConflictingFilters) -> Self {
        Self::ConflictingFilters
    }
}

/// Infrastructure failure: binding to a port or accepting a connection.
///
/// Application-level errors (404, 409, 422, …) are [`ApiError`]s rendered
/// as responses, never this type.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}
