/*!
 * Error types for the crge-explorer application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur while signing in against the identity provider
#[derive(Error, Debug)]
pub enum AuthError {
    /// The identity provider rejected the email/password pair
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The provider throttled the sign-in attempt
    #[error("Too many sign-in attempts, try again later: {0}")]
    RateLimited(String),

    /// The provider rejected the request for another reason
    #[error("Sign-in rejected by identity provider: {status_code} - {message}")]
    Rejected {
        /// HTTP status code
        status_code: u16,
        /// Error message from the provider
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error during sign-in: {0}")]
    ConnectionError(String),

    /// Error when parsing the provider response fails
    #[error("Failed to parse sign-in response: {0}")]
    ParseError(String),
}

/// Errors that can occur while querying the tabular backend
///
/// An empty result set is not an error: queries that match nothing
/// return `Ok` with an empty sequence.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Error when making the backend request fails
    #[error("Backend request failed: {0}")]
    RequestFailed(String),

    /// The request did not complete within the configured timeout
    #[error("Backend request timed out: {0}")]
    Timeout(String),

    /// The bearer token was missing, expired, or rejected server-side
    #[error("Backend refused authorization: {0}")]
    Unauthorized(String),

    /// Error returned by the backend itself
    #[error("Backend responded with error: {status_code} - {message}")]
    BackendRejected {
        /// HTTP status code
        status_code: u16,
        /// Error message from the backend
        message: String,
    },

    /// Error when parsing a backend response fails
    #[error("Failed to parse backend response: {0}")]
    ParseError(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error loading or validating configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the auth lifecycle
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Error from a backend query
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Error from terminal input/output
    #[error("I/O error: {0}")]
    Io(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
