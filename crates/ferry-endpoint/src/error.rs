//! Error type for storage endpoint operations
//!
//! Every failed endpoint call carries either the protocol status code of
//! the rejected request or the transport/filesystem error that prevented
//! the request from completing.

use reqwest::StatusCode;

/// Failure of a single storage endpoint operation.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The endpoint answered with a non-success status code.
    #[error("bad response with code {code}")]
    Status {
        /// Protocol status code of the rejected request
        code: u16,
    },

    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local filesystem failure while staging record bytes.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl EndpointError {
    /// Build a status failure from a raw protocol code.
    #[inline]
    #[must_use]
    pub fn status(code: u16) -> Self {
        Self::Status { code }
    }

    /// Protocol status code, if the endpoint answered at all.
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code } => Some(*code),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Io(_) => None,
        }
    }

    /// The record already exists at the endpoint.
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(StatusCode::CONFLICT.as_u16())
    }

    /// The named record is absent from the endpoint.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}
