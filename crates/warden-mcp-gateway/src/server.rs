// server.rs — MCP server for Warden.
//
// WardenServer implements the rmcp ServerHandler trait and exposes the
// sandboxed filesystem tools. Every call goes through FsConnector, which
// validates paths before touching disk and reports its own changes to the
// resource watcher.
//
// A sandbox violation is returned as a protocol error (invalid_request) so
// the client cannot mistake it for an ordinary tool failure. Every other
// failure is a tool result with `is_error` set and a readable message.
//
// Tools:
//   read_file                 — read one file
//   read_multiple_files       — read several files or whole directories
//   write_file                — create or overwrite a file
//   move_file                 — move or rename (refuses an existing target)
//   get_file_info             — size, timestamps, type, permissions
//   search_files              — glob on names, with exclude patterns
//   edit_file                 — ordered exact-text replacements, returns a diff
//   create_directory          — mkdir -p
//   list_allowed_directories  — the sandbox roots
//   list_resources            — the live resource registry

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;

use warden_connector_fs::{FsConnector, FsConnectorError};
use warden_edit::Edit;
use warden_sandbox::PathSandbox;
use warden_watcher::JsonlSink;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

// ── Tool parameter types ─────────────────────────────────────────

/// Parameters for `read_file`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadFileParams {
    /// Path of the file to read.
    pub path: String,
}

/// Parameters for `read_multiple_files`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadMultipleFilesParams {
    /// Files or directories to read. Empty reads every allowed directory.
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Parameters for `write_file`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    /// Path of the file to write.
    pub path: String,
    /// Full new content of the file.
    pub content: String,
}

/// Parameters for `move_file`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MoveFileParams {
    /// Current path.
    #[serde(alias = "sourcePath")]
    pub source_path: String,
    /// New path. Must not exist yet.
    #[serde(alias = "targetPath")]
    pub target_path: String,
}

/// Parameters for tools whose path is optional.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct OptionalPathParams {
    /// Target path. Defaults to the first allowed directory.
    pub path: Option<String>,
}

/// Parameters for `search_files`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchFilesParams {
    /// Directory to start from. Defaults to the first allowed directory.
    pub path: Option<String>,
    /// Glob matched against entry names (e.g., "*.rs").
    pub pattern: String,
    /// Globs matched against paths relative to the start; matching
    /// directories are skipped entirely.
    #[serde(default, alias = "excludePatterns")]
    pub exclude_patterns: Vec<String>,
}

/// One replacement in an `edit_file` request.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditOperation {
    /// Exact text to find. Every occurrence is replaced.
    #[serde(alias = "oldText")]
    pub old_text: String,
    /// Replacement text.
    #[serde(alias = "newText")]
    pub new_text: String,
}

/// Parameters for `edit_file`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditFileParams {
    /// Path of the file to edit.
    pub path: String,
    /// Replacements, applied in order; each sees the result of the previous.
    pub edits: Vec<EditOperation>,
    /// Return the diff without writing.
    #[serde(default, alias = "dryRun")]
    pub dry_run: bool,
}

// ── MCP Server ───────────────────────────────────────────────────

/// The MCP gateway server. Holds the connector and the tool router.
pub struct WardenServer {
    connector: FsConnector,
    tool_router: ToolRouter<Self>,
}

// Tool definitions. Each `#[tool]` method becomes an MCP tool.
#[tool_router]
impl WardenServer {
    /// Build the sandbox, start the watcher and attach the change log.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let sandbox = Arc::new(PathSandbox::new(&config.sandbox)?);
        let connector = FsConnector::start(sandbox)?;
        if let Some(log) = &config.events_log {
            connector.watcher().subscribe(Box::new(JsonlSink::new(log)));
            tracing::info!(path = %log.display(), "change log enabled");
        }
        Ok(Self::with_connector(connector))
    }

    /// Create a server around an existing connector.
    pub fn with_connector(connector: FsConnector) -> Self {
        Self {
            connector,
            tool_router: Self::tool_router(),
        }
    }

    pub fn connector(&self) -> &FsConnector {
        &self.connector
    }

    /// Stop the resource watcher. Tool calls still work afterwards but the
    /// registry no longer follows OS changes.
    pub fn shutdown(&self) {
        self.connector.watcher().shutdown();
    }

    fn path_or_default(&self, path: Option<String>) -> String {
        path.filter(|p| !p.trim().is_empty())
            .or_else(|| self.connector.allowed_directories().into_iter().next())
            .unwrap_or_default()
    }

    // ── Read tools ───────────────────────────────────────────

    #[tool(description = "Read the complete contents of a file.")]
    fn read_file(
        &self,
        Parameters(params): Parameters<ReadFileParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.connector.read_file(&params.path) {
            Ok(content) => Ok(CallToolResult::success(vec![Content::text(content)])),
            Err(e) => tool_error(e),
        }
    }

    #[tool(
        description = "Read several files, or every file under the given directories. Each entry is printed as '<path>:' followed by its content and a '---' separator. With no paths, reads every allowed directory."
    )]
    fn read_multiple_files(
        &self,
        Parameters(params): Parameters<ReadMultipleFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.connector.read_multiple_files(&params.paths) {
            Ok(content) => Ok(CallToolResult::success(vec![Content::text(content)])),
            Err(e) => tool_error(e),
        }
    }

    #[tool(description = "Get size, timestamps, type and permissions of a file or directory.")]
    fn get_file_info(
        &self,
        Parameters(params): Parameters<OptionalPathParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.path_or_default(params.path);
        match self.connector.get_file_info(&path) {
            Ok(info) => Ok(CallToolResult::success(vec![Content::text(info.to_string())])),
            Err(e) => tool_error(e),
        }
    }

    #[tool(
        description = "Search for files and directories whose name matches a glob pattern. Exclude patterns are matched against paths relative to the start directory."
    )]
    fn search_files(
        &self,
        Parameters(params): Parameters<SearchFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.path_or_default(params.path);
        match self
            .connector
            .search_files(&path, &params.pattern, &params.exclude_patterns)
        {
            Ok(found) if found.is_empty() => {
                Ok(CallToolResult::success(vec![Content::text("No matches found")]))
            }
            Ok(found) => Ok(CallToolResult::success(vec![Content::text(found.join("\n"))])),
            Err(e) => tool_error(e),
        }
    }

    // ── Write tools ──────────────────────────────────────────

    #[tool(description = "Create a file, or overwrite it if it exists.")]
    fn write_file(
        &self,
        Parameters(params): Parameters<WriteFileParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.connector.write_file(&params.path, &params.content) {
            Ok(path) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Successfully wrote to {}",
                path.display()
            ))])),
            Err(e) => tool_error(e),
        }
    }

    #[tool(description = "Move or rename a file or directory. Fails if the target already exists.")]
    fn move_file(
        &self,
        Parameters(params): Parameters<MoveFileParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .connector
            .move_file(&params.source_path, &params.target_path)
        {
            Ok((from, to)) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Successfully moved {} to {}",
                from.display(),
                to.display()
            ))])),
            Err(e) => tool_error(e),
        }
    }

    #[tool(
        description = "Apply exact-text replacements to a file, in order, and return a unified diff. If any old_text is not found, nothing is written. Set dry_run to preview."
    )]
    fn edit_file(
        &self,
        Parameters(params): Parameters<EditFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let edits: Vec<Edit> = params
            .edits
            .into_iter()
            .map(|e| Edit::new(e.old_text, e.new_text))
            .collect();
        match self
            .connector
            .edit_file(&params.path, &edits, params.dry_run)
        {
            Ok(diff) => Ok(CallToolResult::success(vec![Content::text(diff)])),
            Err(e) => tool_error(e),
        }
    }

    #[tool(description = "Create a directory, including any missing parents.")]
    fn create_directory(
        &self,
        Parameters(params): Parameters<OptionalPathParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = self.path_or_default(params.path);
        match self.connector.create_directory(&path) {
            Ok(path) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Successfully created directory {}",
                path.display()
            ))])),
            Err(e) => tool_error(e),
        }
    }

    // ── Introspection tools ──────────────────────────────────

    #[tool(description = "List the directories this server is allowed to access.")]
    fn list_allowed_directories(&self) -> Result<CallToolResult, McpError> {
        let dirs = self.connector.allowed_directories();
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Allowed directories:\n{}",
            dirs.join("\n")
        ))]))
    }

    #[tool(
        description = "List files and directories seen changing under the allowed directories. 'authoritative' is false after the change queue overflowed."
    )]
    fn list_resources(&self) -> Result<CallToolResult, McpError> {
        let resources: Vec<serde_json::Value> = self
            .connector
            .resources()
            .into_iter()
            .map(|(uri, path)| {
                serde_json::json!({
                    "uri": uri,
                    "path": path.display().to_string(),
                })
            })
            .collect();

        let response = serde_json::json!({
            "authoritative": self.connector.watcher().is_authoritative(),
            "resources": resources,
        });
        Ok(CallToolResult::success(vec![Content::json(response)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?]))
    }
}

// ── ServerHandler implementation ─────────────────────────────────

#[tool_handler]
impl ServerHandler for WardenServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "warden".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Warden".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Warden MCP server. File tools only work inside the allowed \
                 directories; call list_allowed_directories first. Paths \
                 outside them are rejected. Use edit_file with dry_run to \
                 preview changes before writing."
                    .into(),
            ),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Sandbox violations become protocol errors; everything else is reported
/// as a failed tool result.
fn tool_error(err: FsConnectorError) -> Result<CallToolResult, McpError> {
    if err.is_access_denied() {
        tracing::warn!(error = %err, "tool call rejected by sandbox");
        return Err(McpError::invalid_request(err.to_string(), None));
    }
    tracing::debug!(error = %err, "tool call failed");
    Ok(CallToolResult::error(vec![Content::text(err.to_string())]))
}
