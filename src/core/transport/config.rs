//! Transport configuration types.

use serde::{Deserialize, Serialize};

use crate::core::config::ServerKind;

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (MCP clients that spawn the server).
    #[cfg(feature = "stdio")]
    Stdio,

    /// HTTP transport: REST tool endpoints and JSON-RPC over POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for the JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

#[cfg(feature = "http")]
fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

#[cfg(feature = "http")]
impl HttpConfig {
    /// Default HTTP settings for the given server.
    pub fn for_server(kind: ServerKind) -> Self {
        Self {
            port: kind.default_port(),
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }

    /// Check that the JSON-RPC path can be mounted next to the built-in routes.
    pub fn validate(&self) -> Result<(), String> {
        let path = self.rpc_path.as_str();
        if !path.starts_with('/') {
            return Err(format!("MCP_HTTP_PATH must start with '/': {:?}", path));
        }
        if path.contains(['{', '}', '*']) {
            return Err(format!("MCP_HTTP_PATH must be a literal path: {:?}", path));
        }
        let reserved = matches!(path, "/" | "/health" | "/tools") || path.starts_with("/tools/");
        if reserved {
            return Err(format!(
                "MCP_HTTP_PATH {:?} collides with a built-in route",
                path
            ));
        }
        Ok(())
    }

    /// Resolve the listening port.
    ///
    /// `MCP_HTTP_PORT` wins, then the platform-assigned `PORT`, then the
    /// server's development port.
    fn port_from_env(kind: ServerKind) -> u16 {
        ["MCP_HTTP_PORT", "PORT"]
            .iter()
            .find_map(|var| std::env::var(var).ok().and_then(|p| p.parse().ok()))
            .unwrap_or_else(|| kind.default_port())
    }
}

impl TransportConfig {
    /// Default transport for the given server: HTTP when compiled in.
    pub fn for_server(kind: ServerKind) -> Self {
        #[cfg(feature = "http")]
        {
            Self::Http(HttpConfig::for_server(kind))
        }

        #[cfg(all(not(feature = "http"), feature = "stdio"))]
        {
            let _ = kind;
            Self::Stdio
        }

        #[cfg(not(any(feature = "stdio", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or http");
        }
    }

    /// Create a STDIO transport config.
    #[cfg(feature = "stdio")]
    pub fn stdio() -> Self {
        Self::Stdio
    }

    /// Create an HTTP transport config.
    #[cfg(feature = "http")]
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        })
    }

    /// Load transport config from environment variables.
    pub fn from_env(kind: ServerKind) -> Self {
        let transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Self::Stdio,
            #[cfg(feature = "http")]
            _ => {
                let port = HttpConfig::port_from_env(kind);
                let host = std::env::var("MCP_HTTP_HOST").unwrap_or_else(|_| default_host());
                let rpc_path =
                    std::env::var("MCP_HTTP_PATH").unwrap_or_else(|_| default_rpc_path());
                let enable_cors = std::env::var("MCP_HTTP_CORS")
                    .map(|v| v.to_lowercase() != "false" && v != "0")
                    .unwrap_or(true);
                Self::Http(HttpConfig {
                    port,
                    host,
                    rpc_path,
                    enable_cors,
                })
            }
            #[cfg(not(feature = "http"))]
            _ => Self::for_server(kind),
        }
    }

    /// Reject settings the transport cannot start with.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => Ok(()),
            #[cfg(feature = "http")]
            Self::Http(cfg) => cfg.validate(),
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}", cfg.host, cfg.port),
        }
    }

    /// Check if this transport is the STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}

#[cfg(all(test, feature = "http"))]
mod tests {
    use super::*;

    #[test]
    fn test_http_default_uses_kind_port() {
        match TransportConfig::for_server(ServerKind::Web) {
            TransportConfig::Http(cfg) => {
                assert_eq!(cfg.port, 8004);
                assert_eq!(cfg.host, "0.0.0.0");
                assert_eq!(cfg.rpc_path, "/mcp");
            }
            #[allow(unreachable_patterns)]
            _ => panic!("expected HTTP transport"),
        }
    }

    #[test]
    fn test_rpc_path_validation() {
        let mut cfg = HttpConfig::for_server(ServerKind::Data);
        assert!(cfg.validate().is_ok());

        for bad in ["mcp", "/", "/health", "/tools", "/tools/mcp", "/{name}", ""] {
            cfg.rpc_path = bad.to_string();
            assert!(cfg.validate().is_err(), "{:?} should be rejected", bad);
        }

        cfg.rpc_path = "/api/mcp".to_string();
        assert!(TransportConfig::Http(cfg).validate().is_ok());
    }

    #[test]
    fn test_description() {
        let cfg = TransportConfig::http(9000, "127.0.0.1");
        assert_eq!(cfg.description(), "HTTP on 127.0.0.1:9000");
        assert!(!cfg.is_stdio());
    }
}
