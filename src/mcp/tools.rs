//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::api::ReportClient;
use crate::models::ReportKind;

use super::handlers::{
    CreateReportHandler, GetBalancesHandler, GetContentHandler, GetStatsHandler, GetStatusHandler,
    ListReportsHandler,
};

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "create-twitter-report")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a new tool registry with every report tool bound to the given
    /// client.
    pub fn new(client: Arc<ReportClient>) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };
        registry.register_report_tools(&client);
        registry
    }

    fn register_report_tools(&mut self, client: &Arc<ReportClient>) {
        let submission_schema = |what: &str| {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": format!(
                            "The search query for Twitter data to {}. Can include operators like AND, OR, hashtags, mentions, etc.",
                            what
                        )
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of tweets to collect (up to 50,000)."
                    },
                    "startDate": {
                        "type": "integer",
                        "description": "Start date as Unix timestamp (seconds since epoch)."
                    },
                    "endDate": {
                        "type": "integer",
                        "description": "End date as Unix timestamp (seconds since epoch)."
                    },
                    "reportType": {
                        "type": "string",
                        "enum": ["7-day", "historical"],
                        "default": "7-day",
                        "description": "'7-day' for last week or 'historical' for all time."
                    }
                },
                "required": ["query"]
            })
        };

        // 1. create-twitter-report - submit a full report job
        self.register(Tool {
            name: "create-twitter-report".to_string(),
            description: "Creates a new report that analyzes Twitter/X data based on a search query. The report provides statistics and tweet data once generated.".to_string(),
            input_schema: submission_schema("analyze"),
            handler: Arc::new(CreateReportHandler {
                client: client.clone(),
                kind: ReportKind::Full,
            }),
        });

        // 2. create-twitter-count - submit a count-only job
        self.register(Tool {
            name: "create-twitter-count".to_string(),
            description: "Creates a count-only report that tallies tweets matching a search query without collecting their content.".to_string(),
            input_schema: submission_schema("count"),
            handler: Arc::new(CreateReportHandler {
                client: client.clone(),
                kind: ReportKind::Count,
            }),
        });

        // 3. get-report-status - poll a job's lifecycle state
        self.register(Tool {
            name: "get-report-status".to_string(),
            description: "Checks the status of a report. Stats and content are only available once the status is 'Generated'.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "reportId": {
                        "type": "string",
                        "description": "The report ID returned when the report was created."
                    }
                },
                "required": ["reportId"]
            }),
            handler: Arc::new(GetStatusHandler {
                client: client.clone(),
            }),
        });

        // 4. get-report-stats - fetch a generated report's statistics
        self.register(Tool {
            name: "get-report-stats".to_string(),
            description: "Retrieves statistics for a generated report: contributors, engagement, sentiment and more. The report must be in the 'Generated' state.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "reportId": {
                        "type": "string",
                        "description": "The report ID returned when the report was created."
                    }
                },
                "required": ["reportId"]
            }),
            handler: Arc::new(GetStatsHandler {
                client: client.clone(),
            }),
        });

        // 5. get-report-content - paginated tweets or users
        self.register(Tool {
            name: "get-report-content".to_string(),
            description: "Retrieves the tweets or users collected by a generated report, with pagination, sorting and filtering.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "reportId": {
                        "type": "string",
                        "description": "The report ID returned when the report was created."
                    },
                    "contentType": {
                        "type": "string",
                        "enum": ["tweets", "users"],
                        "description": "Whether to fetch matched tweets or matched users."
                    },
                    "page": {
                        "type": "integer",
                        "description": "1-based page number."
                    },
                    "perPage": {
                        "type": "integer",
                        "description": "Number of items per page."
                    },
                    "sortBy": {
                        "type": "string",
                        "description": "Field to sort by (e.g., 'createdAt', 'counts.favorites'). Only applied together with sortDirection."
                    },
                    "sortDirection": {
                        "type": "string",
                        "enum": ["1", "-1"],
                        "description": "'1' for ascending, '-1' for descending. Only applied together with sortBy."
                    },
                    "filter": {
                        "type": "string",
                        "description": "JSON-encoded filter object, e.g. '{\"counts.favorites\":{\"$gt\":10}}'."
                    }
                },
                "required": ["reportId", "contentType"]
            }),
            handler: Arc::new(GetContentHandler {
                client: client.clone(),
            }),
        });

        // 6. list-reports - enumerate the account's jobs
        self.register(Tool {
            name: "list-reports".to_string(),
            description: "Lists all reports on the account, optionally ordered by a field.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "orderBy": {
                        "type": "string",
                        "description": "Field to order by (e.g., 'createdAt'). Only applied together with orderDirection."
                    },
                    "orderDirection": {
                        "type": "string",
                        "enum": ["1", "-1"],
                        "description": "'1' for ascending, '-1' for descending. Only applied together with orderBy."
                    }
                }
            }),
            handler: Arc::new(ListReportsHandler {
                client: client.clone(),
            }),
        });

        // 7. get-account-balances - quota/credit snapshot
        self.register(Tool {
            name: "get-account-balances".to_string(),
            description: "Retrieves the account's remaining report credits and quota.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
            handler: Arc::new(GetBalancesHandler {
                client: client.clone(),
            }),
        });
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools
    pub fn all(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .get(name)
            .ok_or_else(|| format!("Tool '{}' not found", name))?;

        tool.handler.execute(args).await
    }
}
