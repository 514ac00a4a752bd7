//! Tools domain module.
//!
//! Tools are executable functions called by agents over HTTP or MCP. Each
//! server kind exposes its own group of tools.
//!
//! ## Architecture
//!
//! - `definitions/` - Tool implementations, one module per server
//! - `handlers.rs` - The `ToolDefinition` trait, shared context and entries
//! - `registry.rs` - Per-server tool sets and name-based dispatch
//! - `router.rs` - rmcp ToolRouter built from the registry (STDIO transport)
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Implement `ToolDefinition` in the server's module under `definitions/`
//! 2. Export it from that module
//! 3. Add `ToolEntry::of::<YourTool>()` to `ToolRegistry::entries_for`
//!
//! Both transports pick the tool up from the registry.

pub mod definitions;
mod error;
mod handlers;
mod registry;
pub mod router;

pub use error::{ToolError, ToolResult};
pub use handlers::{
    ToolContext, ToolDefinition, ToolEntry, http_client_builder, parse_params, tool_model,
};
#[cfg(test)]
pub(crate) use handlers::test_context;
pub use registry::ToolRegistry;
pub use router::{build_tool_router, to_call_result};
