//! Recording transport for testing purposes.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ApiError, RawResponse, Transport};

/// One request observed by a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    pub url: String,
    pub body: Option<String>,
}

/// A transport that records every call and replays canned responses.
///
/// Responses are consumed in FIFO order; when the queue is empty an empty
/// `200 {}` response is returned. Used for call-counting assertions where a
/// real HTTP server would be overkill.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<Result<RawResponse, ApiError>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body.
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse {
                status,
                body: body.into(),
            }));
    }

    /// Queue a transport-level failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Transport(message.into())));
    }

    /// All calls observed so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls observed so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, method: &str, url: &str, body: Option<String>) {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            url: url.to_string(),
            body,
        });
    }

    fn next_response(&self) -> Result<RawResponse, ApiError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(RawResponse {
                status: 200,
                body: "{}".to_string(),
            }))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, url: &str, _headers: &[(String, String)]) -> Result<RawResponse, ApiError> {
        self.record("GET", url, None);
        self.next_response()
    }

    async fn post(
        &self,
        url: &str,
        _headers: &[(String, String)],
        body: String,
    ) -> Result<RawResponse, ApiError> {
        self.record("POST", url, Some(body));
        self.next_response()
    }
}
