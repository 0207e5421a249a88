//! Tool handlers bridging MCP arguments to the report client.
//!
//! Handlers render every client outcome, success or failure, as structured
//! text content. An expected failure (bad input, provider rejection,
//! transport trouble) is a readable message to the calling agent, never a
//! crash of the host; only malformed tool invocations (missing required
//! arguments) surface as protocol-level errors.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::api::{ApiError, ReportClient};
use crate::models::{ContentKind, ContentQuery, ReportKind, ReportRequest, SortDirection, TimeWindow};

use super::tools::ToolHandler;

/// Wrap text in the MCP content shape.
fn text_result(text: impl Into<String>) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": text.into(),
            }
        ]
    })
}

/// Render a client error as user-visible text.
fn error_result(error: &ApiError) -> Value {
    text_result(format!("Error ({}): {}", error.kind(), error))
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("Missing '{key}' parameter"))
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

fn optional_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(|v| v.as_u64())
}

fn optional_i64(args: &Value, key: &str) -> Option<i64> {
    args.get(key).and_then(|v| v.as_i64())
}

/// Handler for submitting a report or count job.
#[derive(Debug)]
pub struct CreateReportHandler {
    pub client: Arc<ReportClient>,
    pub kind: ReportKind,
}

#[async_trait::async_trait]
impl ToolHandler for CreateReportHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let query = required_str(&args, "query")?;

        let window = match optional_str(&args, "reportType") {
            Some(s) => TimeWindow::parse(s)
                .ok_or_else(|| format!("Invalid 'reportType': '{s}' (expected '7-day' or 'historical')"))?,
            None => TimeWindow::Recent,
        };

        let mut builder = ReportRequest::builder(query).kind(self.kind).window(window);
        if let Some(limit) = optional_u64(&args, "limit") {
            builder = builder.limit(limit);
        }
        if let Some(start) = optional_i64(&args, "startDate") {
            builder = builder.start_date(start);
        }
        if let Some(end) = optional_i64(&args, "endDate") {
            builder = builder.end_date(end);
        }

        let request = match builder.build() {
            Ok(request) => request,
            Err(e) => return Ok(error_result(&e.into())),
        };

        match self.client.submit(&request).await {
            Ok(job) => {
                let what = match self.kind {
                    ReportKind::Full => "report",
                    ReportKind::Count => "count report",
                };
                Ok(text_result(format!(
                    "Twitter {what} created successfully!\n\n\
                     Report ID: {id}\n\n\
                     Status: {state}\n\n\
                     Your report is being processed. Check its status with the \
                     'get-report-status' tool using this Report ID. Once the status is \
                     'Generated', retrieve results with 'get-report-stats' or \
                     'get-report-content'.\n\n\
                     Note: processing may take a few minutes depending on the size of \
                     your query.",
                    id = job.resource_id,
                    state = job.state,
                )))
            }
            Err(e) => Ok(error_result(&e)),
        }
    }
}

/// Handler for polling a report's lifecycle state.
#[derive(Debug)]
pub struct GetStatusHandler {
    pub client: Arc<ReportClient>,
}

#[async_trait::async_trait]
impl ToolHandler for GetStatusHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let report_id = required_str(&args, "reportId")?;

        match self.client.status(report_id).await {
            Ok(job) => {
                let guidance = if job.state.is_readable() {
                    "The report is ready: fetch results with 'get-report-stats' or 'get-report-content'."
                } else {
                    match job.state {
                        crate::models::ReportState::Waiting => {
                            "The report is still being processed. Check again shortly."
                        }
                        _ => "The report is not readable in this state; stats and content are unavailable.",
                    }
                };
                Ok(text_result(format!(
                    "Report {id} status: {state}\n\n{guidance}",
                    id = job.resource_id,
                    state = job.state,
                )))
            }
            Err(e) => Ok(error_result(&e)),
        }
    }
}

/// Handler for fetching a generated report's statistics.
#[derive(Debug)]
pub struct GetStatsHandler {
    pub client: Arc<ReportClient>,
}

#[async_trait::async_trait]
impl ToolHandler for GetStatsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let report_id = required_str(&args, "reportId")?;

        match self.client.stats(report_id).await {
            Ok(stats) => Ok(text_result(format!(
                "Statistics for report {report_id}:\n\n{}",
                pretty(&stats)
            ))),
            Err(e) => Ok(error_result(&e)),
        }
    }
}

/// Handler for fetching paginated report content (tweets or users).
#[derive(Debug)]
pub struct GetContentHandler {
    pub client: Arc<ReportClient>,
}

#[async_trait::async_trait]
impl ToolHandler for GetContentHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let report_id = required_str(&args, "reportId")?;
        let content_type = required_str(&args, "contentType")?;
        let kind = ContentKind::parse(content_type).ok_or_else(|| {
            format!("Invalid 'contentType': '{content_type}' (expected 'tweets' or 'users')")
        })?;

        let mut query = ContentQuery::new();
        if let Some(page) = optional_u64(&args, "page") {
            let page = u32::try_from(page)
                .map_err(|_| format!("Invalid 'page': {page} is out of range"))?;
            query = query.page(page);
        }
        if let Some(per_page) = optional_u64(&args, "perPage") {
            let per_page = u32::try_from(per_page)
                .map_err(|_| format!("Invalid 'perPage': {per_page} is out of range"))?;
            query = query.per_page(per_page);
        }
        if let Some(sort_by) = optional_str(&args, "sortBy") {
            query = query.sort_by(sort_by);
        }
        if let Some(direction) = optional_str(&args, "sortDirection") {
            let direction = SortDirection::parse(direction).ok_or_else(|| {
                format!("Invalid 'sortDirection': '{direction}' (expected '1' or '-1')")
            })?;
            query = query.sort_direction(direction);
        }
        if let Some(filter) = optional_str(&args, "filter") {
            query = query.filter(filter);
        }

        match self.client.content(report_id, kind, &query).await {
            Ok(page) => Ok(text_result(format!(
                "{content_type} for report {report_id}:\n\n{}",
                pretty(&page)
            ))),
            Err(e) => Ok(error_result(&e)),
        }
    }
}

/// Handler for listing the account's reports.
#[derive(Debug)]
pub struct ListReportsHandler {
    pub client: Arc<ReportClient>,
}

#[async_trait::async_trait]
impl ToolHandler for ListReportsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let order_by = optional_str(&args, "orderBy");
        let direction = match optional_str(&args, "orderDirection") {
            Some(s) => Some(SortDirection::parse(s).ok_or_else(|| {
                format!("Invalid 'orderDirection': '{s}' (expected '1' or '-1')")
            })?),
            None => None,
        };

        match self.client.list(order_by, direction).await {
            Ok(reports) => Ok(text_result(format!("Reports:\n\n{}", pretty(&reports)))),
            Err(e) => Ok(error_result(&e)),
        }
    }
}

/// Handler for the account quota/credit snapshot.
#[derive(Debug)]
pub struct GetBalancesHandler {
    pub client: Arc<ReportClient>,
}

#[async_trait::async_trait]
impl ToolHandler for GetBalancesHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let _ = args;
        match self.client.balances().await {
            Ok(balances) => Ok(text_result(format!(
                "Account balances:\n\n{}",
                pretty(&balances)
            ))),
            Err(e) => Ok(error_result(&e)),
        }
    }
}
