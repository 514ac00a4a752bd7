//! Tool-specific error types.

use thiserror::Error;

use crate::core::security::UrlPolicyError;

/// Result type for tool execution.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A remote resource could not be fetched.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// A remote resource did not answer in time.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Content could not be parsed (PDF, CSV, JSON, feed).
    #[error("Parse error: {0}")]
    Parse(String),

    /// A looked-up item does not exist.
    #[error("{0}")]
    ResourceNotFound(String),

    /// The URL was rejected by the outbound URL policy.
    #[error("URL blocked: {0}")]
    Blocked(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new fetch error.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "tool_not_found",
            Self::InvalidArguments(_) => "invalid_arguments",
            Self::Fetch(_) => "fetch_error",
            Self::Timeout(_) => "timeout",
            Self::Parse(_) => "parse_error",
            Self::ResourceNotFound(_) => "not_found",
            Self::Blocked(_) => "blocked",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_redirect() {
            if let Some(policy_err) = policy_error_in(&err) {
                return match policy_err {
                    UrlPolicyError::Blocked { .. } => Self::Blocked(policy_err.to_string()),
                    _ => Self::Fetch(policy_err.to_string()),
                };
            }
        }

        let target = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "request".to_string());
        if err.is_timeout() {
            Self::Timeout(target)
        } else {
            Self::Fetch(err.to_string())
        }
    }
}

/// The URL policy failure behind a refused redirect, if any.
fn policy_error_in(err: &reqwest::Error) -> Option<&UrlPolicyError> {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if let Some(policy_err) = inner.downcast_ref::<UrlPolicyError>() {
            return Some(policy_err);
        }
        source = inner.source();
    }
    None
}

impl From<UrlPolicyError> for ToolError {
    fn from(err: UrlPolicyError) -> Self {
        match err {
            UrlPolicyError::Blocked { .. } => Self::Blocked(err.to_string()),
            _ => Self::InvalidArguments(err.to_string()),
        }
    }
}
