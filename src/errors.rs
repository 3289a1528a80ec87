/*!
 * Error types for the questlate application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::translation::formatting::PlaceholderReport;

/// Errors that can occur when talking to a translation backend
///
/// Cloneable so that one failed model load can be handed to every task
/// that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The model for the requested language cannot be loaded
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
}

/// Errors that can occur during translation of a single text
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The translated text lost, duplicated or invented placeholders
    #[error("Placeholder mismatch in '{text}': {report}")]
    PlaceholderMismatch {
        /// The cleaned source text that was sent for translation
        text: String,
        /// What went wrong
        report: PlaceholderReport,
    },
}

/// Application-level errors raised by configuration and the file pipeline
#[derive(Error, Debug)]
pub enum AppError {
    /// The input directory cannot be traversed
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
