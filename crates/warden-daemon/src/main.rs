//! # warden
//!
//! Warden MCP server daemon.
//!
//! Starts an MCP server on stdio that any MCP client connects to. Every
//! file tool call is checked against the allowed directories before it
//! touches disk.
//!
//! ## Usage
//!
//! Typically started by the MCP client via `.mcp.json`:
//! ```json
//! {
//!   "mcpServers": {
//!     "warden": {
//!       "type": "stdio",
//!       "command": "warden",
//!       "args": ["--allowed-dirs", "/workspace"]
//!     }
//!   }
//! }
//! ```
//!
//! In a container, set `HOST_WORKSPACE` and `CONTAINER_WORKSPACE` so paths
//! the client reports from the host are rewritten to their container form.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use warden_mcp_gateway::{GatewayConfig, WardenServer};
use warden_sandbox::parse_allowed_dirs;

/// Warden MCP server.
#[derive(Parser, Debug)]
#[command(name = "warden", about = "Sandboxed filesystem MCP server", version)]
struct Cli {
    /// Comma-separated list of directories the tools may access.
    #[arg(long, env = "ALLOWED_DIRS")]
    allowed_dirs: Option<String>,

    /// Workspace root as seen from the host (enables path remapping).
    #[arg(long, env = "HOST_WORKSPACE")]
    host_workspace: Option<String>,

    /// Workspace root inside the container (enables path remapping).
    #[arg(long, env = "CONTAINER_WORKSPACE")]
    container_workspace: Option<String>,

    /// TOML config file. Flags and environment override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append every resource change to this JSONL file.
    #[arg(long)]
    events_log: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

/// Merge the config file (if any) with flags and environment.
fn resolve_config(cli: &Cli) -> Result<GatewayConfig> {
    let mut config = match &cli.config {
        Some(path) => GatewayConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GatewayConfig::default(),
    };

    if let Some(raw) = &cli.allowed_dirs {
        config.sandbox.allowed_dirs = parse_allowed_dirs(raw)?;
    }
    if let Some(host) = &cli.host_workspace {
        config.sandbox.host_workspace = Some(host.clone());
    }
    if let Some(container) = &cli.container_workspace {
        config.sandbox.container_workspace = Some(container.clone());
    }
    if let Some(log) = &cli.events_log {
        config.events_log = Some(log.clone());
    }

    if config.sandbox.allowed_dirs.is_empty() {
        bail!("no allowed directories: pass --allowed-dirs, set ALLOWED_DIRS, or list allowed_dirs in --config");
    }
    Ok(config)
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("warden_daemon=info".parse()?)
        .add_directive("warden_mcp_gateway=info".parse()?)
        .add_directive("warden_watcher=info".parse()?);

    // Logs go to stderr so they don't interfere with MCP on stdout.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    let config = resolve_config(&cli)?;
    tracing::info!(
        allowed_dirs = ?config.sandbox.allowed_dirs,
        remap = config.sandbox.remap_pair().is_some(),
        "starting Warden MCP server"
    );

    let server = WardenServer::new(&config)?;
    let watcher = Arc::clone(server.connector().watcher());

    tracing::info!("MCP server ready, waiting for client connection");

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|e| tracing::error!("serving error: {:?}", e))?;

    tokio::select! {
        result = service.waiting() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received");
        }
    }

    tracing::info!("MCP server shutting down");
    watcher.shutdown();
    Ok(())
}
