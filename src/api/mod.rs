//! TweetBinder API client with a pluggable transport seam.
//!
//! This module defines the [`Transport`] trait that all HTTP access goes
//! through, the [`Auth`] capability that carries the deployment's credential
//! scheme, and the [`ApiError`] taxonomy every client operation reports
//! failures with. The production transport is [`HttpTransport`]; tests use
//! [`RecordingTransport`] for call-counting assertions.

mod recording;
mod reports;
mod transport;

pub use recording::{RecordedCall, RecordingTransport};
pub use reports::ReportClient;
pub use transport::HttpTransport;

use async_trait::async_trait;

/// A raw HTTP exchange outcome: the status code and body text, regardless of
/// whether the status indicates success. Classification of non-2xx responses
/// belongs to the caller, not the transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Single-shot HTTP access used by [`ReportClient`].
///
/// A transport performs exactly one GET or POST per call and either returns
/// the provider's response (any status) or fails with
/// [`ApiError::Transport`] when no response was received at all. Timeouts
/// and connection handling live behind this seam; the client adds no retry
/// or backoff of its own.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Perform one GET request.
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<RawResponse, ApiError>;

    /// Perform one POST request with a JSON body.
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
    ) -> Result<RawResponse, ApiError>;
}

/// Credential capability, selected once at startup and injected into the
/// client. Exactly one scheme is active per deployment.
#[derive(Debug, Clone)]
pub enum Auth {
    /// API key passed as the `key` query parameter.
    ApiKey(String),
    /// Bearer token passed as an `Authorization` header.
    Bearer(String),
}

impl Auth {
    /// Query parameter contributed by this credential, if any.
    pub(crate) fn query_pair(&self) -> Option<(&'static str, &str)> {
        match self {
            Auth::ApiKey(key) => Some(("key", key.as_str())),
            Auth::Bearer(_) => None,
        }
    }

    /// Header contributed by this credential, if any.
    pub(crate) fn header(&self) -> Option<(String, String)> {
        match self {
            Auth::ApiKey(_) => None,
            Auth::Bearer(token) => Some(("Authorization".to_string(), format!("Bearer {token}"))),
        }
    }
}

/// Caller input that fails a local precondition. These never reach the
/// network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The search query was missing or blank.
    #[error("search query must not be empty")]
    EmptyQuery,

    /// Both date bounds were supplied with the start after the end.
    #[error("startDate {start} is after endDate {end}")]
    InvertedDateRange { start: i64, end: i64 },

    /// The content filter string was not a JSON object.
    #[error("filter is not a valid JSON object: {0}")]
    MalformedFilter(String),
}

/// Uniform failure taxonomy for every client operation.
///
/// Expected failures are always returned, never thrown past the client
/// boundary; only genuine programming errors panic.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Local precondition failure; no request was issued.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The call could not complete (connectivity, timeout, DNS). No
    /// provider status code exists.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The provider responded with a non-2xx status or an in-body error
    /// field. Status code and provider text are carried verbatim.
    #[error("provider error (status {status}): {body}")]
    Provider { status: u16, body: String },

    /// A 2xx response missing a field the protocol guarantees.
    #[error("provider contract violation: {0}")]
    Contract(String),
}

impl ApiError {
    /// Short machine-readable kind tag, used when rendering errors as
    /// structured text.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Transport(_) => "transport",
            ApiError::Provider { .. } => "provider",
            ApiError::Contract(_) => "contract",
        }
    }
}
