//! Error types for the PSN API client.

use psnawp_http::{HttpError, StatusCode};
use thiserror::Error;

/// Errors returned by every client operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PsnError {
    /// Rejected locally before any request was sent.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The transport failed or the server answered non-2xx.
    ///
    /// The transport error is passed through untouched; a missing account is
    /// an `HttpError::HttpStatus` with status 404.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The response parsed as JSON but lacks a field this client reads.
    #[error("unexpected response from {context}: {source}")]
    Decode {
        /// Which call produced the response.
        context: &'static str,
        /// Underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// A configured base URL cannot carry path segments.
    #[error("invalid endpoint `{url}`: {reason}")]
    InvalidEndpoint {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Configuration could not be loaded or applied.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PsnError {
    pub(crate) fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(context: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Decode { context, source }
    }

    /// HTTP status of a failed request, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(err) => err.status(),
            _ => None,
        }
    }

    /// `true` when the server answered 404 Not Found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http(err) if err.is_not_found())
    }

    /// `true` for errors raised locally from bad input.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
