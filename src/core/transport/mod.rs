//! Transport layer for the tool servers.
//!
//! This module provides the transport implementations:
//! - **HTTP**: REST `/tools/{name}` endpoints plus JSON-RPC over POST - feature: `http`
//! - **STDIO**: Standard input/output MCP mode - feature: `stdio`
//!
//! Each transport handles the connection lifecycle and delegates
//! tool calls to the [`McpServer`](crate::core::McpServer).

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
