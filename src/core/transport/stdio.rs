//! STDIO transport.
//!
//! MCP clients that spawn a tool server as a child process talk to it over
//! stdin/stdout. Logging stays on stderr.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Serve one MCP session until the client disconnects.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        let name = server.name().to_string();
        let tools = server.registry().entries().len();

        let session = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;
        info!(server = %name, tools, "MCP session open on stdin/stdout");

        let reason = session
            .waiting()
            .await
            .map_err(|e| TransportError::Session(e.to_string()))?;

        info!(server = %name, "MCP session closed: {:?}", reason);
        Ok(())
    }
}
