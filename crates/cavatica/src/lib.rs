//! # Cavatica
//!
//! Client for the Cavatica (Seven Bridges v2) workspace API.
//!
//! Contains:
//! - [`CavaticaClient`]: authenticated, paginated project file listing
//! - [`RetryPolicy`]: sleep-and-retry handling for rate-limit (429) and
//!   maintenance (503) responses
//! - [`RemoteFile`]: the file model, including its free-form metadata mapping
//!
//! The client is blocking; callers process files one at a time.

pub mod client;
pub mod file;
pub mod retry;

pub use client::{CavaticaClient, DEFAULT_API_URL};
pub use file::RemoteFile;
pub use retry::{RetryDecision, RetryPolicy};

/// Errors that can occur when talking to the workspace API.
#[derive(Debug, thiserror::Error)]
pub enum CavaticaError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status that is not retried.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A retryable status persisted past the configured attempt limit.
    #[error("gave up after {attempts} attempts (last status {status})")]
    RetriesExhausted { attempts: u32, status: u16 },

    /// Failed to parse an API response.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Type alias for Results that can fail with a [`CavaticaError`].
pub type CavaticaResult<T> = Result<T, CavaticaError>;
