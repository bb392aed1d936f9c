/*!
 * Error types for the coltrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur during a single call to the translation endpoint.
///
/// These never escape the retrying client: every variant is retried and,
/// once attempts run out, the batch passes through untranslated.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the per-request timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The response parsed but does not line up with the request
    #[error("Response carried {actual} translations for {expected} texts")]
    ResponseMismatch {
        /// Number of texts sent
        expected: usize,
        /// Number of translations received
        actual: usize,
    },

    /// Error with the client certificate or key
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the failure happened below HTTP (connection, timeout, transport)
    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::Timeout(_)
        )
    }

    /// Build a provider error from a reqwest error, keeping timeouts and
    /// connection failures apart from the rest
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the tabular record container
#[derive(Error, Debug)]
pub enum TableError {
    /// A row has no value under the requested field
    #[error("Row {row} has no field '{field}'")]
    MissingField {
        /// Row index
        row: usize,
        /// Field name
        field: String,
    },

    /// A row has a non-string value under the requested field
    #[error("Row {row} field '{field}' is not a string")]
    InvalidValue {
        /// Row index
        row: usize,
        /// Field name
        field: String,
    },

    /// A column being written does not match the number of rows
    #[error("Column has {actual} values but the table has {expected} rows")]
    ColumnLength {
        /// Number of rows in the table
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// The file contents could not be parsed
    #[error("Failed to parse records: {0}")]
    Parse(String),

    /// The file extension is not a known record format
    #[error("Unsupported record format: {0}")]
    UnsupportedFormat(String),
}

/// Errors that can occur during translation.
///
/// Per-batch network failures are absorbed; what surfaces here is either a
/// setup problem or a broken structural invariant.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider while building the transport
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A batch task ended without producing a result
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    /// The reassembled output does not line up with the input
    #[error("Expected {expected} translated records, got {actual}")]
    LengthMismatch {
        /// Number of input records
        expected: usize,
        /// Number of output records
        actual: usize,
    },

    /// A batch result arrived at the wrong position
    #[error("Batch {batch_index} found at position {position}")]
    OutOfOrder {
        /// Position in the result list
        position: usize,
        /// Index carried by the result
        batch_index: usize,
    },

    /// Options that cannot drive a run
    #[error("Invalid translation options: {0}")]
    InvalidOptions(String),

    /// Error reading or writing the record table
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the record table
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

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
        Self::File(error.to_string())
    }
}
