//! Report request and lifecycle models.
//!
//! A [`ReportRequest`] captures the caller's intent to create a report or
//! count job. It is built through [`ReportRequestBuilder`], which performs
//! the only local validation in the submission path, and is immutable once
//! built. The provider is the system of record for the job itself; the
//! client holds nothing beyond the caller-visible `resourceId`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ValidationError;

/// Which kind of job to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Full report with statistics and per-item content.
    Full,
    /// Count-only report (cheaper, no content).
    Count,
}

impl ReportKind {
    /// Provider sub-resource for this kind.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ReportKind::Full => "twitter",
            ReportKind::Count => "twitter-count",
        }
    }
}

/// Which provider endpoint variant to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    /// Last seven days of data.
    Recent,
    /// Full archive search.
    Historical,
}

impl TimeWindow {
    /// Provider path token for this window.
    pub fn path_segment(&self) -> &'static str {
        match self {
            TimeWindow::Recent => "7-day",
            TimeWindow::Historical => "historical",
        }
    }

    /// Parse the wire token used by the tool/CLI surface.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "7-day" | "recent" => Some(TimeWindow::Recent),
            "historical" => Some(TimeWindow::Historical),
            _ => None,
        }
    }
}

/// A validated request to create a report or count job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    /// Boolean/keyword search expression (may contain AND/OR, hashtags,
    /// mentions, etc.). Always non-empty.
    pub raw_query: String,

    /// Cap on items collected. A hint only; the provider enforces its own
    /// ceiling.
    pub limit: Option<u64>,

    /// Start of the collection window as a Unix timestamp (seconds).
    pub start_date: Option<i64>,

    /// End of the collection window as a Unix timestamp (seconds).
    pub end_date: Option<i64>,

    /// Full report or count-only.
    pub kind: ReportKind,

    /// Recent (7-day) or historical data.
    pub window: TimeWindow,
}

impl ReportRequest {
    /// Start building a request for the given search query.
    pub fn builder(raw_query: impl Into<String>) -> ReportRequestBuilder {
        ReportRequestBuilder {
            raw_query: raw_query.into(),
            limit: None,
            start_date: None,
            end_date: None,
            kind: ReportKind::Full,
            window: TimeWindow::Recent,
        }
    }

    /// The provider creation path for this request, resolved from
    /// `kind x window` (four combinations).
    pub fn submit_path(&self) -> String {
        format!(
            "/reports/{}/{}",
            self.kind.path_segment(),
            self.window.path_segment()
        )
    }

    /// The canonical JSON submission body:
    /// `{"query": {"raw": ..., "limit": ..., "startDate": ..., "endDate": ...}}`
    /// with absent optionals omitted.
    pub fn body(&self) -> Value {
        serde_json::to_value(SubmitBody {
            query: QueryBody {
                raw: &self.raw_query,
                limit: self.limit,
                start_date: self.start_date,
                end_date: self.end_date,
            },
        })
        .unwrap_or(Value::Null)
    }
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    query: QueryBody<'a>,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    raw: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    start_date: Option<i64>,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    end_date: Option<i64>,
}

/// Builder for [`ReportRequest`].
///
/// [`build`](ReportRequestBuilder::build) rejects an empty query and an
/// inverted date range; everything else is left to the provider.
#[derive(Debug, Clone)]
pub struct ReportRequestBuilder {
    raw_query: String,
    limit: Option<u64>,
    start_date: Option<i64>,
    end_date: Option<i64>,
    kind: ReportKind,
    window: TimeWindow,
}

impl ReportRequestBuilder {
    /// Set the maximum number of items to collect.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the start of the collection window (Unix seconds).
    pub fn start_date(mut self, ts: i64) -> Self {
        self.start_date = Some(ts);
        self
    }

    /// Set the end of the collection window (Unix seconds).
    pub fn end_date(mut self, ts: i64) -> Self {
        self.end_date = Some(ts);
        self
    }

    /// Set the report kind (default: full).
    pub fn kind(mut self, kind: ReportKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the time window (default: recent/7-day).
    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Validate and build the request.
    pub fn build(self) -> Result<ReportRequest, ValidationError> {
        if self.raw_query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ValidationError::InvertedDateRange { start, end });
            }
        }

        Ok(ReportRequest {
            raw_query: self.raw_query,
            limit: self.limit,
            start_date: self.start_date,
            end_date: self.end_date,
            kind: self.kind,
            window: self.window,
        })
    }
}

/// Lifecycle state of a provider-side report job.
///
/// All transitions are provider-driven and observed through
/// [`ReportClient::status`](crate::api::ReportClient::status); the client
/// never infers a transition locally. Stats and content retrieval are only
/// meaningful in the [`Generated`](ReportState::Generated) state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportState {
    /// Queued or processing.
    Waiting,
    /// Complete and readable.
    Generated,
    /// Terminal; data no longer current.
    Outdated,
    /// Terminal; removed on the provider side.
    Deleted,
    /// Terminal; moved to cold storage.
    Archived,
    /// A status string this client does not recognize. Carried through
    /// verbatim so a provider-side addition never crashes the client; an
    /// unknown state is never treated as readable.
    Other(String),
}

impl ReportState {
    /// Map a provider status string onto the state enum.
    pub fn parse(s: &str) -> Self {
        match s {
            "Waiting" => ReportState::Waiting,
            "Generated" => ReportState::Generated,
            "Outdated" => ReportState::Outdated,
            "Deleted" => ReportState::Deleted,
            "Archived" => ReportState::Archived,
            other => ReportState::Other(other.to_string()),
        }
    }

    /// Whether stats and content retrieval are valid in this state.
    pub fn is_readable(&self) -> bool {
        matches!(self, ReportState::Generated)
    }

    /// The provider-facing status string.
    pub fn as_str(&self) -> &str {
        match self {
            ReportState::Waiting => "Waiting",
            ReportState::Generated => "Generated",
            ReportState::Outdated => "Outdated",
            ReportState::Deleted => "Deleted",
            ReportState::Archived => "Archived",
            ReportState::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ReportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider-assigned report job as observed at one point in time.
#[derive(Debug, Clone)]
pub struct ReportJob {
    /// Opaque identifier assigned by the provider on submission. Always
    /// non-empty; a failed submission is an error, never a job without an
    /// id.
    pub resource_id: String,

    /// State at observation time.
    pub state: ReportState,

    /// The provider's response body, verbatim. Fields this client does not
    /// inspect pass through here untouched.
    pub raw: Value,
}

/// Provider response to a report/count submission. Only the fields the
/// client inspects are typed; the rest of the body is kept as raw JSON on
/// the resulting [`ReportJob`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReportResponse {
    pub status: Option<String>,
    #[serde(rename = "resourceId")]
    pub resource_id: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Provider response to a status poll.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportStatusResponse {
    pub status: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_rejects_empty_query() {
        let err = ReportRequest::builder("   ").build().unwrap_err();
        assert_eq!(err, ValidationError::EmptyQuery);
    }

    #[test]
    fn build_rejects_inverted_date_range() {
        let err = ReportRequest::builder("#rustlang")
            .start_date(1_700_000_000)
            .end_date(1_600_000_000)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvertedDateRange {
                start: 1_700_000_000,
                end: 1_600_000_000
            }
        );
    }

    #[test]
    fn build_accepts_equal_dates() {
        let request = ReportRequest::builder("#rustlang")
            .start_date(1_700_000_000)
            .end_date(1_700_000_000)
            .build()
            .unwrap();
        assert_eq!(request.start_date, request.end_date);
    }

    #[test]
    fn submit_path_covers_all_four_combinations() {
        let cases = [
            (ReportKind::Full, TimeWindow::Recent, "/reports/twitter/7-day"),
            (
                ReportKind::Full,
                TimeWindow::Historical,
                "/reports/twitter/historical",
            ),
            (
                ReportKind::Count,
                TimeWindow::Recent,
                "/reports/twitter-count/7-day",
            ),
            (
                ReportKind::Count,
                TimeWindow::Historical,
                "/reports/twitter-count/historical",
            ),
        ];

        for (kind, window, expected) in cases {
            let request = ReportRequest::builder("query")
                .kind(kind)
                .window(window)
                .build()
                .unwrap();
            assert_eq!(request.submit_path(), expected);
        }
    }

    #[test]
    fn body_omits_absent_optionals() {
        let request = ReportRequest::builder("#rustlang OR #golang")
            .build()
            .unwrap();
        let body = request.body();
        assert_eq!(body["query"]["raw"], "#rustlang OR #golang");
        assert!(body["query"].get("limit").is_none());
        assert!(body["query"].get("startDate").is_none());
        assert!(body["query"].get("endDate").is_none());
    }

    #[test]
    fn body_carries_all_fields_when_present() {
        let request = ReportRequest::builder("from:jack")
            .limit(500)
            .start_date(1_600_000_000)
            .end_date(1_600_086_400)
            .build()
            .unwrap();
        let body = request.body();
        assert_eq!(body["query"]["limit"], 500);
        assert_eq!(body["query"]["startDate"], 1_600_000_000i64);
        assert_eq!(body["query"]["endDate"], 1_600_086_400i64);
    }

    #[test]
    fn state_parse_round_trips_known_states() {
        for s in ["Waiting", "Generated", "Outdated", "Deleted", "Archived"] {
            assert_eq!(ReportState::parse(s).as_str(), s);
        }
    }

    #[test]
    fn unknown_state_is_carried_through_and_never_readable() {
        let state = ReportState::parse("Rendering");
        assert_eq!(state, ReportState::Other("Rendering".to_string()));
        assert_eq!(state.as_str(), "Rendering");
        assert!(!state.is_readable());
    }

    #[test]
    fn only_generated_is_readable() {
        assert!(ReportState::Generated.is_readable());
        for state in [
            ReportState::Waiting,
            ReportState::Outdated,
            ReportState::Deleted,
            ReportState::Archived,
        ] {
            assert!(!state.is_readable(), "{state} must not be readable");
        }
    }

    #[test]
    fn time_window_parses_wire_tokens() {
        assert_eq!(TimeWindow::parse("7-day"), Some(TimeWindow::Recent));
        assert_eq!(TimeWindow::parse("historical"), Some(TimeWindow::Historical));
        assert_eq!(TimeWindow::parse("last-month"), None);
    }
}
