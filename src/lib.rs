//! # TweetBinder MCP
//!
//! A Model Context Protocol (MCP) server exposing TweetBinder's asynchronous
//! Twitter/X report-generation API as callable tools.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (ReportRequest, ContentQuery, etc.)
//! - [`api`]: The TweetBinder client, transport seam, and error types
//! - [`mcp`]: MCP protocol implementation and server
//! - [`config`]: Configuration management
//!
//! Reports are asynchronous on the provider side: a submission returns a
//! `resourceId` immediately, the job moves through its lifecycle on the
//! provider's schedule, and callers poll [`api::ReportClient::status`] until
//! the report reaches the `Generated` state before fetching stats or content.

pub mod api;
pub mod config;
pub mod mcp;
pub mod models;

// Re-export commonly used types
pub use api::{ApiError, Auth, ReportClient, Transport, ValidationError};
pub use models::{ContentQuery, ReportJob, ReportRequest, ReportState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
