//! Agent Tool Servers Library
//!
//! Four domain-scoped tool servers for AI agents, built from one library:
//!
//! - **research**: arXiv paper search, paper info and citations
//! - **document**: PDF text, table and metadata extraction plus text analysis
//! - **data**: validation, CSV/JSON conversion, cleaning and statistics
//! - **web**: page fetching, scraping, URL parsing and reachability checks
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, logging, URL policy, the server
//!   handler and transports (HTTP and STDIO)
//! - **domains**: the tools, grouped by the server that exposes them
//!
//! # Example
//!
//! ```rust,no_run
//! use agent_tool_servers::core::{ServerKind, run};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run(ServerKind::Data).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result, ServerKind};
