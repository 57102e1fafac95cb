//! Error types for quakemap.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur while fetching and decoding a feed.
///
/// The variants carry their detail as owned strings so the error stays
/// `Clone` and comparable in tests. The UI collapses all of these into one
/// generic message; the variant matters for logging only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No parsed response within the request deadline
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure (DNS, connect, TLS, read)
    #[error("network failure: {0}")]
    Network(String),

    /// Upstream returned a non-success HTTP status
    #[error("unexpected HTTP status {0}")]
    BadStatus(u16),

    /// Response body was not a valid feed document
    #[error("failed to parse feed: {0}")]
    Parse(String),
}

impl FetchError {
    /// Classify a reqwest transport error.
    ///
    /// reqwest reports its own deadline expiry as an error too; fold that
    /// into [`FetchError::Timeout`] so there is a single timeout kind.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Short kind name for structured log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network(_) => "network",
            Self::BadStatus(_) => "bad_status",
            Self::Parse(_) => "parse",
        }
    }
}
