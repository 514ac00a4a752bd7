//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! This module builds the ToolRouter for the STDIO transport. Each route
//! forwards to [`ToolRegistry::call_tool`], so both transports share one
//! dispatch path.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
    model::{CallToolResult, Content},
};

use super::error::ToolError;
use super::handlers::ToolEntry;
use super::registry::ToolRegistry;

/// Build the tool router with all tools of the registry's server.
pub fn build_tool_router<S>(registry: Arc<ToolRegistry>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    registry
        .entries()
        .iter()
        .fold(ToolRouter::new(), |router, entry| {
            router.with_route(create_route(entry, registry.clone()))
        })
}

/// Create a ToolRoute forwarding to the registry.
fn create_route<S>(entry: &ToolEntry, registry: Arc<ToolRegistry>) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    let name = entry.name().to_string();
    ToolRoute::new_dyn(entry.tool().clone(), move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().unwrap_or_default();
        let registry = registry.clone();
        let name = name.clone();
        async move {
            let result = registry
                .call_tool(&name, serde_json::Value::Object(args))
                .await;
            to_call_result(result)
        }
        .boxed()
    })
}

/// Convert a tool outcome into an MCP tool result.
///
/// Invalid arguments become protocol errors; every other failure is reported
/// as a tool result with `isError` set.
pub fn to_call_result(
    result: Result<serde_json::Value, ToolError>,
) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => {
            let text = match &value {
                serde_json::Value::String(s) => s.clone(),
                other => serde_json::to_string_pretty(other)
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?,
            };
            // MCP structured content must be a JSON object
            let structured_content = value.is_object().then_some(value);
            Ok(CallToolResult {
                content: vec![Content::text(text)],
                structured_content,
                is_error: Some(false),
                meta: None,
            })
        }
        Err(ToolError::InvalidArguments(msg)) => Err(McpError::invalid_params(msg, None)),
        Err(ToolError::NotFound(name)) => Err(McpError::invalid_params(
            format!("Unknown tool: {}", name),
            None,
        )),
        Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, ServerKind};
    use crate::domains::tools::handlers::ToolContext;

    struct TestServer {}

    fn test_registry(kind: ServerKind) -> Arc<ToolRegistry> {
        let context = ToolContext::new(Arc::new(Config::for_server(kind))).unwrap();
        Arc::new(ToolRegistry::new(kind, Arc::new(context)))
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(test_registry(ServerKind::Web));
        let tools = router.list_all();
        assert_eq!(tools.len(), 8);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"fetch_webpage"));
        assert!(names.contains(&"parse_url"));
        assert!(names.contains(&"check_multiple_urls"));
    }

    #[test]
    fn test_registry_matches_router() {
        for kind in ServerKind::ALL {
            let registry = test_registry(kind);
            let registry_names = registry.tool_names();

            let router: ToolRouter<TestServer> = build_tool_router(registry.clone());
            let router_tools = router.list_all();
            let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

            assert_eq!(registry_names.len(), router_names.len());
            for name in registry_names {
                assert!(router_names.contains(&name));
            }
        }
    }

    #[test]
    fn test_call_result_structured_for_objects() {
        let result = to_call_result(Ok(serde_json::json!({"valid": true}))).unwrap();
        assert_eq!(result.is_error, Some(false));
        assert_eq!(
            result.structured_content,
            Some(serde_json::json!({"valid": true}))
        );
    }

    #[test]
    fn test_call_result_plain_string() {
        let result = to_call_result(Ok(serde_json::json!("hello"))).unwrap();
        assert!(result.structured_content.is_none());
        let text = match &result.content[0].raw {
            rmcp::model::RawContent::Text(t) => &t.text,
            _ => panic!("Expected text content"),
        };
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_call_result_errors() {
        assert!(to_call_result(Err(ToolError::invalid_arguments("bad"))).is_err());
        let fetch = to_call_result(Err(ToolError::fetch("down"))).unwrap();
        assert_eq!(fetch.is_error, Some(true));
    }
}
