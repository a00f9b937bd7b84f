//! Error types for fetch operations.

use thiserror::Error;

/// Boxed error produced by a transport implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building, sending, or decoding a request.
///
/// Every failure is terminal for the page it occurred on; nothing in this
/// crate retries.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transport failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// The server answered with a status outside `200..300`.
    #[error("HTTP {code}: {reason}")]
    HttpStatus { code: u16, reason: String },

    /// A successful response carried no body.
    #[error("Did not receive data from request")]
    NoData,

    /// The body could not be parsed as JSON.
    #[error("Unable to decode JSON from data: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// The request URL could not be built.
    #[error("Unable to create url with string {attempted}")]
    InvalidUrl {
        attempted: String,
        #[source]
        source: url::ParseError,
    },

    /// A header name or value cannot be sent on the wire.
    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },

    /// Paging metadata was required but could not be determined.
    #[error("Unable to retrieve paging information for request")]
    MissingPagingSignal,

    /// Configuration is missing or incomplete.
    #[error("Configuration required: {0}")]
    ConfigMissing(String),
}

impl FetchError {
    /// Build an [`FetchError::HttpStatus`] with the canonical reason phrase.
    pub fn http_status(code: u16) -> Self {
        let reason = reqwest::StatusCode::from_u16(code)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown status");
        Self::HttpStatus {
            code,
            reason: reason.to_string(),
        }
    }

    /// Numeric code for this error kind.
    ///
    /// `HttpStatus` reports its status code; the remaining kinds use fixed
    /// codes in the 5xx range.
    pub fn code(&self) -> u16 {
        match self {
            Self::HttpStatus { code, .. } => *code,
            Self::Transport(_) => 500,
            Self::MalformedJson(_) => 501,
            Self::InvalidUrl { .. } | Self::InvalidHeader { .. } => 503,
            Self::NoData => 504,
            Self::MissingPagingSignal => 505,
            Self::ConfigMissing(_) => 506,
        }
    }

    /// Returns true if the request never reached the transport.
    pub fn is_construction_error(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::InvalidHeader { .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Result type alias for fetch operations.
pub type Result<T> = core::result::Result<T, FetchError>;
