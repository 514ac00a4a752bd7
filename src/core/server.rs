//! Tool server implementation and lifecycle management.
//!
//! [`McpServer`] owns one [`ToolRegistry`] and exposes it two ways: as an
//! rmcp `ServerHandler` (STDIO transport) and through plain methods used by
//! the HTTP transport.
//!
//! The ToolRouter is built from the registry in `domains/tools/router.rs`.
//! **Adding a new tool does NOT require modifying this file!**

use std::sync::Arc;

use rmcp::{
    ServerHandler,
    handler::server::tool::ToolRouter,
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool_handler,
};
use tracing::info;

use super::config::{Config, ServerKind};
use super::error::Error;
use crate::domains::tools::{ToolContext, ToolRegistry, ToolResult, build_tool_router};

/// A tool server for one [`ServerKind`].
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tools of this server, shared by both transports.
    registry: Arc<ToolRegistry>,

    /// Tool router for MCP tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a server with the given configuration.
    pub fn new(config: Config) -> super::error::Result<Self> {
        let config = Arc::new(config);
        let context = ToolContext::new(config.clone())
            .map_err(|e| Error::config(format!("Failed to build tool context: {}", e)))?;

        let registry = Arc::new(ToolRegistry::new(config.kind(), Arc::new(context)));
        info!(
            server = %config.kind(),
            tools = registry.entries().len(),
            "Tool registry ready"
        );

        Ok(Self {
            tool_router: build_tool_router::<Self>(registry.clone()),
            config,
            registry,
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// The kind of server.
    pub fn kind(&self) -> ServerKind {
        self.config.kind()
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The tool registry.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Human-readable instructions sent to MCP clients.
    pub fn instructions(&self) -> String {
        format!(
            "{}. Tools: {}.",
            self.kind().summary(),
            self.registry.tool_names().join(", ")
        )
    }

    /// List all tools as `{name, description, inputSchema}` objects.
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.registry
            .list_tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name with raw JSON arguments.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> ToolResult<serde_json::Value> {
        self.registry.call_tool(name, arguments).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name().to_string(),
                version: self.version().to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}
