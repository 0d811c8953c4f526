//! SQLite MCP Server - Main entry point.
//!
//! Serves one SQLite database file to MCP clients over stdio or HTTP.

use sqlite_mcp_server::config::{Config, TransportMode};
use sqlite_mcp_server::tools::DatabaseOperationService;
use sqlite_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber. Output goes to stderr so the stdio
/// transport keeps stdout to itself.
fn init_tracing(config: &Config) {
    if !config.enable_logs {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse_args();

    init_tracing(&config);

    let Some(database_path) = config.database_path.clone() else {
        eprintln!("Error: A database path must be configured.");
        eprintln!();
        eprintln!("Usage: sqlite-mcp-server --database-path <path>");
        eprintln!("       SQLITE_DB_PATH=<path> sqlite-mcp-server");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  sqlite-mcp-server -d data.db");
        eprintln!("  sqlite-mcp-server -d data.db --allow-raw-sql");
        eprintln!("  sqlite-mcp-server -d data.db --transport http --http-port 3000");
        std::process::exit(1);
    };

    info!(
        transport = %config.transport,
        database = %database_path.display(),
        "Starting SQLite MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let raw_sql = config.raw_sql_policy();
    if config.allow_raw_sql {
        warn!("Raw SQL enabled: conditions and query text are executed verbatim");
    }

    let operations = Arc::new(DatabaseOperationService::new(database_path, raw_sql));

    let result = match config.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            StdioTransport::new(operations).run().await
        }
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            HttpTransport::new(
                operations,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            )
            .run()
            .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
