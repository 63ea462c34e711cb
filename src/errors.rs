/*!
 * Error types for the docutrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
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

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the provider asked us to slow down.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimitExceeded(_))
    }

    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Server-side failures and dropped connections are transient; client errors
    /// other than rate limiting will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RequestFailed(_) | Self::ParseError(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::RateLimitExceeded(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors that can occur while reading or writing a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The container archive could not be read or written
    #[error("Archive error: {0}")]
    Archive(String),

    /// A required part is missing from the container
    #[error("Missing document part: {0}")]
    MissingPart(String),

    /// The XML of a part is malformed
    #[error("XML error: {0}")]
    Xml(String),

    /// The tree does not have the expected shape
    #[error("Unexpected document structure: {0}")]
    Structure(String),
}

impl From<zip::result::ZipError> for DocumentError {
    fn from(error: zip::result::ZipError) -> Self {
        Self::Archive(error.to_string())
    }
}

/// Errors that can occur while translating a whole document
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error with document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Invalid translation settings
    #[error("Configuration error: {0}")]
    Config(String),
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

    /// Error from document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),
}
