//! Nimbus: weather and web search tools for MCP clients.
//!
//! Main binary with subcommands:
//! - `mcp-server`: MCP server over stdin/stdout (default transport for clients
//!   that spawn the server)
//! - `mcp-server-http`: MCP server over HTTP

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use miette::Result;
use nimbus_mcp::{
    McpServer, ServerConfig,
    config::{DEFAULT_BRAVE_BASE_URL, DEFAULT_NWS_BASE_URL, DEFAULT_USER_AGENT},
    http,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nimbus")]
#[command(about = "Weather and web search tools over MCP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server using stdio transport
    McpServer {
        #[command(flatten)]
        upstream: UpstreamArgs,
    },

    /// Run the MCP server with HTTP transport
    McpServerHttp {
        #[command(flatten)]
        upstream: UpstreamArgs,

        /// HTTP server port
        #[arg(long, env = "NIMBUS_PORT", default_value = "3848")]
        port: u16,
    },
}

/// Upstream API settings shared by both transports.
#[derive(Args)]
struct UpstreamArgs {
    /// Brave Search API key (search tool reports an error without it)
    #[arg(long, env = "BRAVE_SEARCH_API_KEY", hide_env_values = true)]
    brave_api_key: Option<String>,

    /// National Weather Service API base URL
    #[arg(long, env = "NIMBUS_NWS_BASE_URL", default_value = DEFAULT_NWS_BASE_URL)]
    nws_base_url: String,

    /// Brave Search API base URL
    #[arg(long, env = "NIMBUS_BRAVE_BASE_URL", default_value = DEFAULT_BRAVE_BASE_URL)]
    brave_base_url: String,

    /// User-Agent sent to the NWS API
    #[arg(long, env = "NIMBUS_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Timeout for each upstream request, in seconds
    #[arg(long, env = "NIMBUS_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,
}

impl UpstreamArgs {
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::default()
            .with_nws_base_url(self.nws_base_url)
            .with_brave_base_url(self.brave_base_url)
            .with_brave_api_key(self.brave_api_key);
        config.user_agent = self.user_agent;
        config.request_timeout = Duration::from_secs(self.timeout_secs);
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol stream
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "nimbus=info,nimbus_mcp=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::McpServer { upstream } => run_mcp_server(upstream.into_config()).await,
        Commands::McpServerHttp { upstream, port } => {
            run_mcp_server_http(upstream.into_config(), port).await
        }
    }
}

fn build_server(config: &ServerConfig) -> Result<McpServer> {
    if config.brave_api_key.is_none() {
        tracing::warn!("BRAVE_SEARCH_API_KEY not set, brave_search will report an error");
    }

    McpServer::from_config(config).map_err(|e| miette::miette!("{}", e))
}

async fn run_mcp_server(config: ServerConfig) -> Result<()> {
    let server = build_server(&config)?;
    server.run().await.map_err(|e| miette::miette!("{}", e))?;

    Ok(())
}

async fn run_mcp_server_http(config: ServerConfig, port: u16) -> Result<()> {
    tracing::info!("starting MCP HTTP server on port {}", port);

    let server = build_server(&config)?;
    http::run_server(server, port)
        .await
        .map_err(|e| miette::miette!("HTTP server error: {}", e))?;

    Ok(())
}
