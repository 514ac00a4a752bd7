//! URL decomposition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolResult};

/// Parameters for URL parsing.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ParseUrlParams {
    /// The URL to parse.
    #[schemars(description = "The URL to parse")]
    pub url: String,
}

/// Components of a URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlParts {
    pub url: String,
    pub scheme: String,
    /// Host with an explicit port, if any.
    pub domain: String,
    pub path: String,
    pub query: String,
    /// Decoded query parameters; a repeated key keeps its last value.
    pub query_params: Map<String, Value>,
    pub fragment: String,
    pub is_secure: bool,
}

/// Split an absolute URL into its parts. Nothing is fetched.
pub fn parse_url(raw: &str) -> ToolResult<UrlParts> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ToolError::invalid_arguments(format!("Failed to parse URL: {}", e)))?;

    let domain = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    let query = url.query().unwrap_or_default().to_string();
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&query)
        .map_err(|e| ToolError::invalid_arguments(format!("Invalid query string: {}", e)))?;
    let query_params = pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    Ok(UrlParts {
        url: raw.to_string(),
        scheme: url.scheme().to_string(),
        domain,
        path: url.path().to_string(),
        query,
        query_params,
        fragment: url.fragment().unwrap_or_default().to_string(),
        is_secure: url.scheme() == "https",
    })
}

/// URL parsing tool.
pub struct ParseUrlTool;

#[async_trait::async_trait]
impl ToolDefinition for ParseUrlTool {
    type Params = ParseUrlParams;
    type Output = UrlParts;

    const NAME: &'static str = "parse_url";
    const DESCRIPTION: &'static str = "Parse a URL into its components (scheme, domain, path, \
         query, fragment). Use this to analyze URLs or extract query parameters.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        parse_url(&params.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_url() {
        let parts = parse_url("https://example.com/a?b=1").unwrap();
        assert_eq!(parts.scheme, "https");
        assert_eq!(parts.domain, "example.com");
        assert_eq!(parts.path, "/a");
        assert_eq!(parts.query, "b=1");
        assert_eq!(Value::Object(parts.query_params), json!({"b": "1"}));
        assert!(parts.is_secure);
    }

    #[test]
    fn test_parse_port_fragment_and_encoded_params() {
        let parts = parse_url("http://localhost:8080/search?q=rust+lang&tag=a%26b&q=last#top").unwrap();
        assert_eq!(parts.domain, "localhost:8080");
        assert_eq!(parts.fragment, "top");
        assert!(!parts.is_secure);
        assert_eq!(parts.query_params["q"], "last");
        assert_eq!(parts.query_params["tag"], "a&b");
    }

    #[test]
    fn test_parse_relative_url_fails() {
        assert!(matches!(
            parse_url("/just/a/path"),
            Err(ToolError::InvalidArguments(_))
        ));
    }
}
