//! Tool handler plumbing.
//!
//! Every tool implements [`ToolDefinition`]: a name, a description, typed
//! parameters and an async `execute`. [`ToolEntry`] erases the types so the
//! registry can hold tools of one server in a single list, and both the HTTP
//! transport and the rmcp router dispatch through it.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::definitions::research::PaperStore;
use super::error::{ToolError, ToolResult};
use crate::core::config::Config;
use crate::core::security::redirect_policy;

/// Shared state handed to every tool invocation.
pub struct ToolContext {
    /// Server configuration.
    pub config: Arc<Config>,

    /// Pooled HTTP client for all outbound requests.
    pub http: reqwest::Client,

    /// On-disk cache of arXiv search results.
    pub papers: PaperStore,
}

impl ToolContext {
    /// Build the context for a server, including its HTTP client.
    pub fn new(config: Arc<Config>) -> ToolResult<Self> {
        let http = http_client_builder(&config)
            .build()
            .map_err(|e| ToolError::internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(config, http))
    }

    /// Build the context around an existing HTTP client.
    pub fn with_client(config: Arc<Config>, http: reqwest::Client) -> Self {
        let papers = PaperStore::new(config.research.paper_dir.clone());
        Self {
            config,
            http,
            papers,
        }
    }
}

/// Client settings shared by every tool: User-Agent, connect timeout and a
/// redirect policy that re-checks each hop against the URL policy.
pub fn http_client_builder(config: &Config) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(config.http_client.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirect_policy(config.security.clone()))
}

/// A statically described tool.
///
/// Implementors are unit structs; the trait only carries associated items.
#[async_trait::async_trait]
pub trait ToolDefinition: Send + Sync + 'static {
    /// Parameters, deserialized from the request's JSON object.
    type Params: DeserializeOwned + JsonSchema + Send + 'static;

    /// Result, serialized into the response body.
    type Output: Serialize + Send;

    /// Tool name as registered in MCP and used in `/tools/{name}`.
    const NAME: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    /// Run the tool.
    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output>;
}

/// Create the rmcp Tool model (metadata) for a definition.
pub fn tool_model<T: ToolDefinition>() -> Tool {
    Tool {
        name: T::NAME.into(),
        description: Some(T::DESCRIPTION.into()),
        input_schema: cached_schema_for_type::<T::Params>(),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

/// Deserialize tool arguments, treating a missing body as an empty object.
pub fn parse_params<P: DeserializeOwned>(arguments: serde_json::Value) -> ToolResult<P> {
    let arguments = match arguments {
        serde_json::Value::Null => serde_json::Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::invalid_arguments(e.to_string()))
}

type InvokeFn = fn(serde_json::Value, Arc<ToolContext>) -> BoxFuture<'static, ToolResult<serde_json::Value>>;

fn invoke<T: ToolDefinition>(
    arguments: serde_json::Value,
    ctx: Arc<ToolContext>,
) -> BoxFuture<'static, ToolResult<serde_json::Value>> {
    async move {
        let params: T::Params = parse_params(arguments)?;
        let output = T::execute(params, &ctx).await?;
        serde_json::to_value(output)
            .map_err(|e| ToolError::internal(format!("Failed to serialize result: {}", e)))
    }
    .boxed()
}

/// A registered tool: its metadata plus a type-erased entry point.
#[derive(Clone)]
pub struct ToolEntry {
    tool: Tool,
    invoke: InvokeFn,
}

impl ToolEntry {
    /// Register a tool definition.
    pub fn of<T: ToolDefinition>() -> Self {
        Self {
            tool: tool_model::<T>(),
            invoke: invoke::<T>,
        }
    }

    /// Tool name.
    pub fn name(&self) -> &str {
        &self.tool.name
    }

    /// Tool metadata.
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    /// Run the tool with raw JSON arguments.
    pub fn call(
        &self,
        arguments: serde_json::Value,
        ctx: Arc<ToolContext>,
    ) -> BoxFuture<'static, ToolResult<serde_json::Value>> {
        (self.invoke)(arguments, ctx)
    }
}

/// Build a context for tests, letting the caller adjust the configuration.
#[cfg(test)]
pub(crate) fn test_context(
    kind: crate::core::ServerKind,
    configure: impl FnOnce(&mut Config),
) -> Arc<ToolContext> {
    let mut config = Config::for_server(kind);
    configure(&mut config);
    Arc::new(ToolContext::new(Arc::new(config)).expect("tool context"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct EchoParams {
        text: String,
        #[serde(default)]
        repeat: usize,
    }

    struct EchoTool;

    #[async_trait::async_trait]
    impl ToolDefinition for EchoTool {
        type Params = EchoParams;
        type Output = String;

        const NAME: &'static str = "echo";
        const DESCRIPTION: &'static str = "Echo text";

        async fn execute(params: EchoParams, _ctx: &ToolContext) -> ToolResult<String> {
            Ok(params.text.repeat(params.repeat.max(1)))
        }
    }

    #[test]
    fn test_parse_params_null_is_empty_object() {
        let result: ToolResult<EchoParams> = parse_params(serde_json::Value::Null);
        // `text` is required, so an empty object still fails validation
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn test_tool_model_has_schema() {
        let tool = tool_model::<EchoTool>();
        assert_eq!(tool.name, "echo");
        assert!(tool.input_schema.contains_key("properties"));
    }

    #[tokio::test]
    async fn test_entry_invokes_definition() {
        let entry = ToolEntry::of::<EchoTool>();
        let result = entry
            .call(
                serde_json::json!({"text": "ab", "repeat": 2}),
                test_context(crate::core::ServerKind::Data, |_| {}),
            )
            .await
            .unwrap();
        assert_eq!(result, serde_json::json!("abab"));
    }
}
