//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the tool
//! servers: configuration, error handling, logging, the outbound URL policy,
//! the server handler and the transport layer.

pub mod config;
pub mod error;
pub mod logging;
pub mod security;
pub mod server;
pub mod transport;

pub use config::{Config, ServerKind};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};

use tracing::{info, warn};

/// Load configuration, initialize logging and serve `kind` until shutdown.
///
/// Every server binary is a thin wrapper around this function.
pub async fn run(kind: ServerKind) -> Result<()> {
    let mut config = Config::from_env(kind)?;
    init_logging(&config.logging);

    for warning in config.warnings.drain(..) {
        warn!("{}", warning);
    }

    info!("Starting {} v{}", config.server.name, config.server.version);
    if config.security.allow_private_hosts {
        warn!("Private host targets allowed by MCP_ALLOW_PRIVATE_HOSTS");
    }

    let transport = TransportService::new(config.transport.clone());
    let server = McpServer::new(config)?;

    transport.run(server).await?;

    info!("Server shutting down");
    Ok(())
}
