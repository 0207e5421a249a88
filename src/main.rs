use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tweetbinder_mcp::api::{HttpTransport, ReportClient};
use tweetbinder_mcp::config::Config;
use tweetbinder_mcp::mcp::server::McpServer;
use tweetbinder_mcp::models::{
    ContentKind, ContentQuery, ReportKind, ReportRequest, SortDirection, TimeWindow,
};
use url::Url;

/// TweetBinder MCP - Twitter/X report creation and retrieval through the TweetBinder API
#[derive(Parser, Debug)]
#[command(name = "tweetbinder-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create and retrieve TweetBinder Twitter/X analytics reports", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server (default: stdio mode)
    Serve {
        /// Serve over HTTP/SSE instead of stdio
        #[arg(long)]
        http: bool,

        /// Host to bind in HTTP mode
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind in HTTP mode
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },

    /// Submit a full report for a search query
    Create {
        /// Search query (may contain AND/OR, hashtags, mentions, etc.)
        query: String,

        /// Maximum number of tweets to collect
        #[arg(long, short)]
        limit: Option<u64>,

        /// Start date (Unix seconds or RFC 3339)
        #[arg(long)]
        start_date: Option<String>,

        /// End date (Unix seconds or RFC 3339)
        #[arg(long)]
        end_date: Option<String>,

        /// Report window: 7-day or historical
        #[arg(long, default_value = "7-day")]
        window: String,
    },

    /// Submit a count-only report for a search query
    Count {
        /// Search query
        query: String,

        /// Start date (Unix seconds or RFC 3339)
        #[arg(long)]
        start_date: Option<String>,

        /// End date (Unix seconds or RFC 3339)
        #[arg(long)]
        end_date: Option<String>,

        /// Report window: 7-day or historical
        #[arg(long, default_value = "7-day")]
        window: String,
    },

    /// Check the status of a report
    Status {
        /// Report ID
        report_id: String,
    },

    /// Fetch statistics for a generated report
    Stats {
        /// Report ID
        report_id: String,
    },

    /// Fetch tweets or users collected by a generated report
    Content {
        /// Report ID
        report_id: String,

        /// Content kind: tweets or users
        #[arg(long, default_value = "tweets")]
        kind: String,

        /// 1-based page number
        #[arg(long)]
        page: Option<u32>,

        /// Items per page
        #[arg(long)]
        per_page: Option<u32>,

        /// Sort field (used together with --sort-direction)
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort direction: 1 or -1 (used together with --sort-by)
        #[arg(long)]
        sort_direction: Option<String>,

        /// JSON-encoded filter object
        #[arg(long)]
        filter: Option<String>,
    },

    /// List the account's reports
    List {
        /// Order field (used together with --order-direction)
        #[arg(long)]
        order_by: Option<String>,

        /// Order direction: 1 or -1 (used together with --order-by)
        #[arg(long)]
        order_direction: Option<String>,
    },

    /// Show the account's remaining credits and quota
    Balances,
}

/// Parse a date given either as Unix seconds or as an RFC 3339 timestamp.
fn parse_date(s: &str) -> Result<i64> {
    if let Ok(ts) = s.parse::<i64>() {
        return Ok(ts);
    }
    let parsed = chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| anyhow::anyhow!("invalid date '{}': {}", s, e))?;
    Ok(parsed.timestamp())
}

fn parse_direction(s: &str) -> Result<SortDirection> {
    SortDirection::parse(s)
        .ok_or_else(|| anyhow::anyhow!("invalid sort direction '{}' (expected '1' or '-1')", s))
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

async fn submit(
    client: &ReportClient,
    kind: ReportKind,
    query: String,
    limit: Option<u64>,
    start_date: Option<String>,
    end_date: Option<String>,
    window: String,
) -> Result<()> {
    let window = TimeWindow::parse(&window)
        .ok_or_else(|| anyhow::anyhow!("invalid window '{}' (expected '7-day' or 'historical')", window))?;

    let mut builder = ReportRequest::builder(query).kind(kind).window(window);
    if let Some(limit) = limit {
        builder = builder.limit(limit);
    }
    if let Some(start) = start_date {
        builder = builder.start_date(parse_date(&start)?);
    }
    if let Some(end) = end_date {
        builder = builder.end_date(parse_date(&end)?);
    }

    let job = client.submit(&builder.build()?).await?;
    println!("Report ID: {}", job.resource_id);
    println!("Status: {}", job.state);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity. Logs go to stderr so stdio MCP
    // framing on stdout stays clean.
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("tweetbinder_mcp={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let auth = config.auth()?;
    let base = Url::parse(&config.api_base)
        .map_err(|e| anyhow::anyhow!("invalid api_base '{}': {}", config.api_base, e))?;
    let transport = Arc::new(HttpTransport::with_timeout(Duration::from_secs(
        config.timeout_secs,
    )));
    let client = ReportClient::new(base, auth, transport);

    match cli.command.unwrap_or(Commands::Serve {
        http: false,
        host: "127.0.0.1".to_string(),
        port: 3000,
    }) {
        Commands::Serve { http, host, port } => {
            let server = McpServer::new(Arc::new(client))?;

            if http {
                let addr = format!("{}:{}", host, port);
                let (bound_addr, handle) = server.run_http(&addr).await?;
                tracing::info!("MCP server listening on {}", bound_addr);

                handle
                    .await
                    .map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?;
            } else {
                tracing::info!("Running MCP server in stdio mode");
                server.run().await?;
            }
        }

        Commands::Create {
            query,
            limit,
            start_date,
            end_date,
            window,
        } => {
            submit(
                &client,
                ReportKind::Full,
                query,
                limit,
                start_date,
                end_date,
                window,
            )
            .await?;
        }

        Commands::Count {
            query,
            start_date,
            end_date,
            window,
        } => {
            submit(
                &client,
                ReportKind::Count,
                query,
                None,
                start_date,
                end_date,
                window,
            )
            .await?;
        }

        Commands::Status { report_id } => {
            let job = client.status(&report_id).await?;
            println!("Status: {}", job.state);
            if !job.state.is_readable() {
                tracing::info!("stats and content are available once the status is Generated");
            }
        }

        Commands::Stats { report_id } => {
            let stats = client.stats(&report_id).await?;
            print_json(&stats);
        }

        Commands::Content {
            report_id,
            kind,
            page,
            per_page,
            sort_by,
            sort_direction,
            filter,
        } => {
            let kind = ContentKind::parse(&kind)
                .ok_or_else(|| anyhow::anyhow!("invalid kind '{}' (expected 'tweets' or 'users')", kind))?;

            let mut query = ContentQuery::new();
            if let Some(page) = page {
                query = query.page(page);
            }
            if let Some(per_page) = per_page {
                query = query.per_page(per_page);
            }
            if let Some(sort_by) = sort_by {
                query = query.sort_by(sort_by);
            }
            if let Some(direction) = sort_direction {
                query = query.sort_direction(parse_direction(&direction)?);
            }
            if let Some(filter) = filter {
                query = query.filter(filter);
            }

            let page = client.content(&report_id, kind, &query).await?;
            print_json(&page);
        }

        Commands::List {
            order_by,
            order_direction,
        } => {
            let direction = order_direction
                .as_deref()
                .map(parse_direction)
                .transpose()?;
            let reports = client.list(order_by.as_deref(), direction).await?;
            print_json(&reports);
        }

        Commands::Balances => {
            let balances = client.balances().await?;
            print_json(&balances);
        }
    }

    Ok(())
}
