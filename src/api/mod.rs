pub mod client;

use reqwest::StatusCode;
use thiserror::Error;

pub use client::{ApiClient, UnauthorizedEvent};

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered 401. The persisted session has already been
    /// cleared when this is returned.
    #[error("not authorized, please sign in again")]
    Unauthorized,

    #[error("backend returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A background worker died before producing a response.
    #[error("request interrupted")]
    Interrupted,
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
