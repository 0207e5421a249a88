//! TweetBinder report client: submission, lifecycle observation, and
//! retrieval.
//!
//! Every operation is a single attempt against the provider. There is no
//! retry, no backoff, and no deduplication: submitting the same query twice
//! creates two distinct jobs, and polling cadence belongs entirely to the
//! caller. The provider owns the ground truth for job state; this client
//! observes transitions, it never infers them.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::models::{
    sort_token, ContentKind, ContentQuery, CreateReportResponse, ReportJob, ReportRequest,
    ReportState, ReportStatusResponse, SortDirection,
};

use super::{ApiError, Auth, RawResponse, Transport};

/// Client for the TweetBinder report API.
///
/// Holds no mutable state between calls; each operation is fully
/// parameterized by its arguments plus the injected credential and
/// transport, so concurrent use needs no coordination.
#[derive(Debug, Clone)]
pub struct ReportClient {
    base: Url,
    auth: Auth,
    transport: Arc<dyn Transport>,
}

impl ReportClient {
    /// Create a client for the given provider base URL.
    ///
    /// A path component on the base (e.g. a gateway prefix) is preserved:
    /// endpoint paths are appended under it rather than replacing it.
    pub fn new(base: Url, auth: Auth, transport: Arc<dyn Transport>) -> Self {
        let mut base = base;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            base,
            auth,
            transport,
        }
    }

    /// Submit a report or count job.
    ///
    /// Issues exactly one POST to the creation endpoint resolved from the
    /// request's kind and time window. On success the provider's body must
    /// carry a `resourceId`; a 2xx response without one is reported as a
    /// contract violation, never as a partially-populated job.
    pub async fn submit(&self, request: &ReportRequest) -> Result<ReportJob, ApiError> {
        let url = self.url_for(&request.submit_path(), &[])?;
        let body = serde_json::to_string(&request.body())
            .map_err(|e| ApiError::Contract(format!("failed to encode request body: {e}")))?;

        tracing::debug!(path = %request.submit_path(), "submitting report");

        let response = self
            .transport
            .post(url.as_str(), &self.headers(), body)
            .await?;
        let raw = Self::success_json(response)?;

        let parsed: CreateReportResponse = serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::Contract(format!("unexpected submission response: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(ApiError::Provider {
                status: 200,
                body: error,
            });
        }

        let resource_id = match parsed.resource_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                // Without a resourceId the job was never created. Prefer the
                // provider's own message when it offered one.
                return Err(match parsed.message {
                    Some(message) => ApiError::Provider {
                        status: 200,
                        body: message,
                    },
                    None => ApiError::Contract(
                        "submission response is missing resourceId".to_string(),
                    ),
                });
            }
        };

        // The provider documents Waiting as the initial state; the body's
        // status field wins when present.
        let state = parsed
            .status
            .as_deref()
            .map(ReportState::parse)
            .unwrap_or(ReportState::Waiting);

        tracing::info!(resource_id = %resource_id, state = %state, "report submitted");

        Ok(ReportJob {
            resource_id,
            state,
            raw,
        })
    }

    /// Fetch the current state of a job.
    ///
    /// Unrecognized status strings become [`ReportState::Other`] and are
    /// carried through without failing; they are never treated as readable.
    pub async fn status(&self, resource_id: &str) -> Result<ReportJob, ApiError> {
        let url = self.url_for(&format!("/reports/{}", urlencoding::encode(resource_id)), &[])?;

        let response = self.transport.get(url.as_str(), &self.headers()).await?;
        let raw = Self::success_json(response)?;

        let parsed: ReportStatusResponse = serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::Contract(format!("unexpected status response: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(ApiError::Provider {
                status: 200,
                body: error,
            });
        }

        let status = parsed.status.ok_or_else(|| {
            ApiError::Contract("status response is missing the status field".to_string())
        })?;

        Ok(ReportJob {
            resource_id: resource_id.to_string(),
            state: ReportState::parse(&status),
            raw,
        })
    }

    /// Fetch a completed report's statistics.
    ///
    /// No local readiness check is performed: a job that is not `Generated`
    /// yields the provider's own rejection as a provider error, so callers
    /// observe identical semantics whether they poll first or not.
    pub async fn stats(&self, resource_id: &str) -> Result<Value, ApiError> {
        let url = self.url_for(
            &format!("/reports/{}/stats", urlencoding::encode(resource_id)),
            &[],
        )?;
        let response = self.transport.get(url.as_str(), &self.headers()).await?;
        Self::success_json(response)
    }

    /// Fetch one page of a completed report's tweets or users.
    ///
    /// A malformed filter fails locally before any network call; everything
    /// else in the query passes through to the provider, and the returned
    /// page (including its pagination metadata) is the provider's verbatim.
    pub async fn content(
        &self,
        resource_id: &str,
        kind: ContentKind,
        query: &ContentQuery,
    ) -> Result<Value, ApiError> {
        let params = query.to_params()?;
        let url = self.url_for(
            &format!(
                "/reports/{}/{}",
                urlencoding::encode(resource_id),
                kind.path_segment()
            ),
            &params,
        )?;
        let response = self.transport.get(url.as_str(), &self.headers()).await?;
        Self::success_json(response)
    }

    /// List the account's report jobs, optionally ordered.
    ///
    /// The `order` parameter follows the same `field|direction` shape as
    /// content sorting and is only sent when both halves are present.
    pub async fn list(
        &self,
        order_by: Option<&str>,
        direction: Option<SortDirection>,
    ) -> Result<Value, ApiError> {
        let mut params = Vec::new();
        if let Some(order) = sort_token(order_by, direction) {
            params.push(("order".to_string(), order));
        }
        let url = self.url_for("/reports", &params)?;
        let response = self.transport.get(url.as_str(), &self.headers()).await?;
        Self::success_json(response)
    }

    /// Fetch the account's quota/credit snapshot.
    pub async fn balances(&self) -> Result<Value, ApiError> {
        let url = self.url_for("/me/balances", &[])?;
        let response = self.transport.get(url.as_str(), &self.headers()).await?;
        Self::success_json(response)
    }

    fn url_for(&self, path: &str, params: &[(String, String)]) -> Result<Url, ApiError> {
        // Endpoint paths carry a leading slash; join them relative to the
        // base so a path prefix on the base survives.
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Transport(format!("invalid request URL: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            if let Some((key, value)) = self.auth.query_pair() {
                pairs.append_pair(key, value);
            }
        }

        // `query_pairs_mut` leaves an empty query (a trailing `?`) behind
        // when nothing was appended; drop it so URLs without parameters
        // carry no query component at all.
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.auth.header().into_iter().collect()
    }

    /// Classify a raw response: non-2xx becomes a provider error carrying
    /// the status and body verbatim; a 2xx body that is not JSON is a
    /// contract violation.
    fn success_json(response: RawResponse) -> Result<Value, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Provider {
                status: response.status,
                body: response.body,
            });
        }
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Contract(format!("response body is not valid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RecordingTransport;
    use crate::models::ReportKind;

    fn client_with(transport: Arc<RecordingTransport>, auth: Auth) -> ReportClient {
        ReportClient::new(
            Url::parse("https://api.tweetbinder.com").unwrap(),
            auth,
            transport,
        )
    }

    fn api_key_client(transport: Arc<RecordingTransport>) -> ReportClient {
        client_with(transport, Auth::ApiKey("test-key".to_string()))
    }

    fn query_pairs(url: &str) -> Vec<(String, String)> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[tokio::test]
    async fn submit_issues_exactly_one_post_and_returns_job() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"status":"Waiting","resourceId":"abc123"}"#);
        let client = api_key_client(transport.clone());

        let request = ReportRequest::builder("#rustlang").build().unwrap();
        let job = client.submit(&request).await.unwrap();

        assert_eq!(job.resource_id, "abc123");
        assert_eq!(job.state, ReportState::Waiting);
        assert_eq!(transport.call_count(), 1);

        let call = &transport.calls()[0];
        assert_eq!(call.method, "POST");
        assert!(call.url.starts_with("https://api.tweetbinder.com/reports/twitter/7-day"));

        let body: Value = serde_json::from_str(call.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["query"]["raw"], "#rustlang");
    }

    #[tokio::test]
    async fn sequential_submissions_yield_distinct_resource_ids() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"status":"Waiting","resourceId":"job-1"}"#);
        transport.push_response(200, r#"{"status":"Waiting","resourceId":"job-2"}"#);
        let client = api_key_client(transport.clone());

        let request = ReportRequest::builder("#rustlang").build().unwrap();
        let first = client.submit(&request).await.unwrap();
        let second = client.submit(&request).await.unwrap();

        assert_ne!(first.resource_id, second.resource_id);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn submit_non_2xx_is_a_provider_error_with_status_and_body() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(402, "Insufficient credits");
        let client = api_key_client(transport);

        let request = ReportRequest::builder("#rustlang").build().unwrap();
        let err = client.submit(&request).await.unwrap_err();

        match err {
            ApiError::Provider { status, body } => {
                assert_eq!(status, 402);
                assert_eq!(body, "Insufficient credits");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_missing_resource_id_is_a_contract_violation() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"status":"Waiting"}"#);
        let client = api_key_client(transport);

        let request = ReportRequest::builder("#rustlang").build().unwrap();
        let err = client.submit(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Contract(_)));
    }

    #[tokio::test]
    async fn submit_in_body_error_is_surfaced_verbatim() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"error":"Invalid query syntax"}"#);
        let client = api_key_client(transport);

        let request = ReportRequest::builder("#rustlang").build().unwrap();
        let err = client.submit(&request).await.unwrap_err();

        match err {
            ApiError::Provider { body, .. } => assert_eq!(body, "Invalid query syntax"),
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_transport_failure_carries_no_status() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_failure("connection refused");
        let client = api_key_client(transport);

        let request = ReportRequest::builder("#rustlang").build().unwrap();
        let err = client.submit(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn api_key_is_sent_as_query_parameter() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"balances":{}}"#);
        let client = api_key_client(transport.clone());

        client.balances().await.unwrap();

        let pairs = query_pairs(&transport.calls()[0].url);
        assert!(pairs.contains(&("key".to_string(), "test-key".to_string())));
    }

    #[tokio::test]
    async fn bearer_token_is_not_leaked_into_the_url() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"balances":{}}"#);
        let client = client_with(transport.clone(), Auth::Bearer("tok".to_string()));

        client.balances().await.unwrap();

        let url = &transport.calls()[0].url;
        assert!(!url.contains("tok"));
        assert!(query_pairs(url).is_empty());
    }

    #[tokio::test]
    async fn status_maps_generated_state() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"status":"Generated"}"#);
        let client = api_key_client(transport.clone());

        let job = client.status("abc123").await.unwrap();
        assert_eq!(job.state, ReportState::Generated);
        assert!(job.state.is_readable());
        assert!(transport.calls()[0]
            .url
            .starts_with("https://api.tweetbinder.com/reports/abc123"));
    }

    #[tokio::test]
    async fn status_for_unknown_resource_is_a_provider_error_not_a_crash() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(404, r#"{"message":"Report not found"}"#);
        let client = api_key_client(transport);

        let err = client.status("missing").await.unwrap_err();
        assert!(matches!(err, ApiError::Provider { status: 404, .. }));
    }

    #[tokio::test]
    async fn status_with_unrecognized_state_string_is_carried_through() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"status":"Rendering","progress":42}"#);
        let client = api_key_client(transport);

        let job = client.status("abc123").await.unwrap();
        assert_eq!(job.state, ReportState::Other("Rendering".to_string()));
        assert!(!job.state.is_readable());
        assert_eq!(job.raw["progress"], 42);
    }

    #[tokio::test]
    async fn stats_on_waiting_job_surfaces_the_provider_rejection() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(409, "Report is not generated yet");
        let client = api_key_client(transport.clone());

        let err = client.stats("abc123").await.unwrap_err();
        match err {
            ApiError::Provider { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body, "Report is not generated yet");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
        assert!(transport.calls()[0].url.contains("/reports/abc123/stats"));
    }

    #[tokio::test]
    async fn malformed_filter_fails_before_any_network_call() {
        let transport = Arc::new(RecordingTransport::new());
        let client = api_key_client(transport.clone());

        let query = ContentQuery::new().filter("{bad json");
        let err = client
            .content("abc123", ContentKind::Tweets, &query)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Validation(crate::api::ValidationError::MalformedFilter(_))
        ));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn content_request_carries_pagination_sort_and_filter() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"items":[],"pagination":{"total":0}}"#);
        let client = api_key_client(transport.clone());

        let query = ContentQuery::new()
            .page(2)
            .per_page(50)
            .sort_by("createdAt")
            .sort_direction(SortDirection::Descending)
            .filter(r#"{"counts.favorites":{"$gt":10}}"#);
        client
            .content("abc123", ContentKind::Tweets, &query)
            .await
            .unwrap();

        let call = &transport.calls()[0];
        assert!(call.url.contains("/reports/abc123/tweets"));

        let pairs = query_pairs(&call.url);
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("perPage".to_string(), "50".to_string())));
        assert!(pairs.contains(&("sort".to_string(), "createdAt|-1".to_string())));
        assert!(pairs.contains(&(
            "filter[counts.favorites]".to_string(),
            r#"{"$gt":10}"#.to_string()
        )));
    }

    #[tokio::test]
    async fn content_page_passes_through_provider_payload_verbatim() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(
            200,
            r#"{"items":[{"id":"1"}],"pagination":{"total":1,"page":1,"perPage":10,"totalPages":1}}"#,
        );
        let client = api_key_client(transport);

        let page = client
            .content("abc123", ContentKind::Users, &ContentQuery::new())
            .await
            .unwrap();

        assert_eq!(page["pagination"]["total"], 1);
        assert_eq!(page["items"][0]["id"], "1");
    }

    #[tokio::test]
    async fn list_includes_order_only_when_fully_specified() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, "[]");
        transport.push_response(200, "[]");
        let client = api_key_client(transport.clone());

        client
            .list(Some("createdAt"), Some(SortDirection::Descending))
            .await
            .unwrap();
        client.list(Some("createdAt"), None).await.unwrap();

        let calls = transport.calls();
        let with_order = query_pairs(&calls[0].url);
        assert!(with_order.contains(&("order".to_string(), "createdAt|-1".to_string())));

        let without_order = query_pairs(&calls[1].url);
        assert!(!without_order.iter().any(|(k, _)| k == "order"));
    }

    #[tokio::test]
    async fn balances_hits_the_me_endpoint() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"balances":{"credits":100}}"#);
        let client = api_key_client(transport.clone());

        let balances = client.balances().await.unwrap();
        assert_eq!(balances["balances"]["credits"], 100);
        assert!(transport.calls()[0]
            .url
            .starts_with("https://api.tweetbinder.com/me/balances"));
    }

    #[tokio::test]
    async fn base_url_path_prefix_is_preserved() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"status":"Waiting","resourceId":"p-1"}"#);
        transport.push_response(200, r#"{"balances":{}}"#);
        let client = ReportClient::new(
            Url::parse("https://proxy.example.com/tweetbinder").unwrap(),
            Auth::ApiKey("test-key".to_string()),
            transport.clone(),
        );

        let request = ReportRequest::builder("#rustlang").build().unwrap();
        client.submit(&request).await.unwrap();
        client.balances().await.unwrap();

        let calls = transport.calls();
        assert!(calls[0]
            .url
            .starts_with("https://proxy.example.com/tweetbinder/reports/twitter/7-day"));
        assert!(calls[1]
            .url
            .starts_with("https://proxy.example.com/tweetbinder/me/balances"));
    }

    #[tokio::test]
    async fn count_submission_uses_the_count_endpoint() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(200, r#"{"status":"Waiting","resourceId":"count-1"}"#);
        let client = api_key_client(transport.clone());

        let request = ReportRequest::builder("#rustlang")
            .kind(ReportKind::Count)
            .build()
            .unwrap();
        client.submit(&request).await.unwrap();

        assert!(transport.calls()[0]
            .url
            .starts_with("https://api.tweetbinder.com/reports/twitter-count/7-day"));
    }
}
