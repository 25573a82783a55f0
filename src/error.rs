use reqwest::StatusCode;

use crate::takeout::ReadError;

/// Failure of a single call to the Spotify Web API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unexpected HTTP status: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ApiError {
    /// Network level failures that may go away when the request is sent again.
    ///
    /// Undecodable bodies and requests that could not even be built are not
    /// transient, and neither is anything the API itself reported.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(error) => {
                !error.is_decode()
                    && !error.is_builder()
                    && (error.is_connect()
                        || error.is_timeout()
                        || error.is_request()
                        || error.is_redirect()
                        || error.is_body()
                        || error.is_status())
            }
            ApiError::Api { .. }
            | ApiError::UnexpectedStatus(_)
            | ApiError::UnexpectedResponse(_) => false,
        }
    }
}

/// An unrecoverable import failure. Raised to `main`, which ends the process.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: &'static str,
        attempts: usize,
        #[source]
        source: ApiError,
    },
    #[error("{operation} failed: {source}")]
    Fatal {
        operation: &'static str,
        #[source]
        source: ApiError,
    },
    #[error(transparent)]
    Read(#[from] ReadError),
}
