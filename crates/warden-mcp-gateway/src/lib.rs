//! # warden-mcp-gateway
//!
//! MCP (Model Context Protocol) server for Warden.
//!
//! Exposes the sandboxed filesystem tools over `rmcp`. Paths outside the
//! allowed directories are refused with a protocol error; every other failure
//! comes back as a tool result flagged as an error.
//!
//! ## Key components
//!
//! - [`WardenServer`] — rmcp `ServerHandler` with ten file tools
//! - [`GatewayConfig`] — sandbox settings plus optional JSONL change log
//! - [`GatewayError`] — startup and configuration failures

pub mod config;
pub mod error;
pub mod server;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use server::WardenServer;
