//! Configuration management for the tool servers.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables or defaults. Every server binary
//! shares the same layout; only the [`ServerKind`] differs.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Browser-like User-Agent sent with outbound requests.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Which tool server this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    /// Academic paper search and citation tools.
    Research,
    /// PDF processing and text analysis tools.
    Document,
    /// Validation, conversion and statistics tools.
    Data,
    /// Web fetching, scraping and URL tools.
    Web,
}

impl ServerKind {
    /// All server kinds, in port order.
    pub const ALL: [ServerKind; 4] = [Self::Research, Self::Document, Self::Data, Self::Web];

    /// Name reported to clients.
    pub fn server_name(self) -> &'static str {
        match self {
            Self::Research => "research_tools",
            Self::Document => "document_tools",
            Self::Data => "data_tools",
            Self::Web => "web_tools",
        }
    }

    /// Port used in local development when neither `MCP_HTTP_PORT` nor `PORT` is set.
    pub fn default_port(self) -> u16 {
        match self {
            Self::Research => 8001,
            Self::Document => 8002,
            Self::Data => 8003,
            Self::Web => 8004,
        }
    }

    /// Short human description used in server instructions.
    pub fn summary(self) -> &'static str {
        match self {
            Self::Research => "Academic paper search, analysis, and citation tools",
            Self::Document => "PDF processing, text extraction, and document analysis tools",
            Self::Data => "Data validation, cleaning, transformation, and analysis tools",
            Self::Web => "Web scraping, URL operations, and HTTP utilities",
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Research => "research",
            Self::Document => "document",
            Self::Data => "data",
            Self::Web => "web",
        };
        f.write_str(name)
    }
}

impl FromStr for ServerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "research" | "research_tools" => Ok(Self::Research),
            "document" | "documents" | "document_tools" => Ok(Self::Document),
            "data" | "data_tools" => Ok(Self::Data),
            "web" | "web_tools" => Ok(Self::Web),
            other => Err(format!("Unknown server kind: {}", other)),
        }
    }
}

/// Main configuration structure for a tool server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Outbound HTTP client configuration.
    pub http_client: HttpClientConfig,

    /// Research tools configuration.
    pub research: ResearchConfig,

    /// Outbound URL policy.
    pub security: SecurityConfig,

    /// Problems found while loading, logged once logging is up.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Which tool set this server exposes.
    pub kind: ServerKind,

    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

/// Configuration for the shared outbound HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Timeout for PDF downloads, in seconds.
    pub download_timeout_secs: u64,

    /// Largest body accepted when downloading documents.
    pub max_download_bytes: u64,
}

/// Configuration for the research tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// arXiv Atom API endpoint.
    pub arxiv_api_url: String,

    /// Directory holding the per-topic paper cache.
    pub paper_dir: PathBuf,
}

/// Policy applied to user-supplied URLs before they are fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allow `localhost`, loopback and private address literals.
    pub allow_private_hosts: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            download_timeout_secs: 30,
            max_download_bytes: 50 * 1024 * 1024,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            arxiv_api_url: "http://export.arxiv.org/api/query".to_string(),
            paper_dir: PathBuf::from("papers"),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allow_private_hosts: false,
        }
    }
}

impl Config {
    /// Create a configuration with default values for the given server.
    pub fn for_server(kind: ServerKind) -> Self {
        Self {
            server: ServerConfig {
                kind,
                name: kind.server_name().to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
            transport: TransportConfig::for_server(kind),
            http_client: HttpClientConfig::default(),
            research: ResearchConfig::default(),
            security: SecurityConfig::default(),
            warnings: Vec::new(),
        }
    }

    /// Load configuration for the given server from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`,
    /// except the platform-assigned `PORT`. Ignored values are recorded in
    /// [`Config::warnings`]; an unusable transport setting is an error.
    pub fn from_env(kind: ServerKind) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::for_server(kind);

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(format) = std::env::var("MCP_LOG_FORMAT") {
            config.logging.json = format.eq_ignore_ascii_case("json");
        }

        config.transport = TransportConfig::from_env(kind);
        config.transport.validate().map_err(Error::config)?;

        if let Ok(user_agent) = std::env::var("MCP_USER_AGENT") {
            config.http_client.user_agent = user_agent;
        }

        if let Ok(max) = std::env::var("MCP_MAX_DOWNLOAD_BYTES") {
            match max.parse() {
                Ok(bytes) => config.http_client.max_download_bytes = bytes,
                Err(_) => config
                    .warnings
                    .push(format!("Ignoring invalid MCP_MAX_DOWNLOAD_BYTES: {}", max)),
            }
        }

        if let Ok(url) = std::env::var("MCP_ARXIV_API_URL") {
            config.research.arxiv_api_url = url;
        }

        if let Ok(dir) = std::env::var("MCP_PAPER_DIR") {
            config.research.paper_dir = PathBuf::from(dir);
        }

        if let Ok(allow) = std::env::var("MCP_ALLOW_PRIVATE_HOSTS") {
            match allow.parse() {
                Ok(flag) => config.security.allow_private_hosts = flag,
                Err(_) => config
                    .warnings
                    .push(format!("Ignoring invalid MCP_ALLOW_PRIVATE_HOSTS: {}", allow)),
            }
        }

        Ok(config)
    }

    /// The server kind this configuration belongs to.
    pub fn kind(&self) -> ServerKind {
        self.server.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_ports_per_server() {
        let ports: Vec<u16> = ServerKind::ALL.iter().map(|k| k.default_port()).collect();
        assert_eq!(ports, vec![8001, 8002, 8003, 8004]);
    }

    #[test]
    fn test_server_kind_from_str() {
        assert_eq!("web".parse::<ServerKind>(), Ok(ServerKind::Web));
        assert_eq!("Data_Tools".parse::<ServerKind>(), Ok(ServerKind::Data));
        assert!("audio".parse::<ServerKind>().is_err());
    }

    #[test]
    fn test_for_server_uses_kind_name() {
        let config = Config::for_server(ServerKind::Document);
        assert_eq!(config.server.name, "document_tools");
        assert_eq!(config.kind(), ServerKind::Document);
        assert!(!config.security.allow_private_hosts);
    }

    #[test]
    fn test_paper_dir_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_PAPER_DIR", "/tmp/paper-cache");
        }
        let config = Config::from_env(ServerKind::Research).unwrap();
        assert_eq!(config.research.paper_dir, PathBuf::from("/tmp/paper-cache"));
        unsafe {
            std::env::remove_var("MCP_PAPER_DIR");
        }
    }

    #[test]
    fn test_invalid_download_cap_keeps_default() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_MAX_DOWNLOAD_BYTES", "lots");
        }
        let config = Config::from_env(ServerKind::Document).unwrap();
        assert_eq!(config.http_client.max_download_bytes, 50 * 1024 * 1024);
        assert_eq!(
            config.warnings,
            vec!["Ignoring invalid MCP_MAX_DOWNLOAD_BYTES: lots".to_string()]
        );
        unsafe {
            std::env::remove_var("MCP_MAX_DOWNLOAD_BYTES");
        }
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_bad_rpc_path_is_config_error() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        for path in ["mcp", "/tools/rpc", "/health"] {
            unsafe {
                std::env::set_var("MCP_HTTP_PATH", path);
            }
            let result = Config::from_env(ServerKind::Data);
            assert!(
                matches!(result, Err(Error::Config(_))),
                "{} should be rejected",
                path
            );
        }
        unsafe {
            std::env::set_var("MCP_HTTP_PATH", "/rpc");
        }
        let config = Config::from_env(ServerKind::Data).unwrap();
        match config.transport {
            TransportConfig::Http(http) => assert_eq!(http.rpc_path, "/rpc"),
            #[allow(unreachable_patterns)]
            _ => panic!("expected HTTP transport"),
        }
        unsafe {
            std::env::remove_var("MCP_HTTP_PATH");
        }
    }
}
