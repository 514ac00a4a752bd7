//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - The tool set of each server kind
//! - Name-based dispatch used by every transport
//! - Tool metadata for listing

use std::sync::Arc;

use rmcp::model::Tool;
use tracing::{info, instrument, warn};

use super::definitions::{data, document, research, web};
use super::error::{ToolError, ToolResult};
use super::handlers::{ToolContext, ToolEntry};
use crate::core::config::ServerKind;

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - the tools one server exposes.
///
/// This is the single source of truth for the server's tools: the HTTP
/// transport dispatches through [`ToolRegistry::call_tool`] and the rmcp
/// router is built from [`ToolRegistry::entries`].
pub struct ToolRegistry {
    kind: ServerKind,
    context: Arc<ToolContext>,
    entries: Vec<ToolEntry>,
}

impl ToolRegistry {
    /// Create the registry for a server kind.
    pub fn new(kind: ServerKind, context: Arc<ToolContext>) -> Self {
        Self {
            kind,
            context,
            entries: Self::entries_for(kind),
        }
    }

    /// All tools belonging to a server kind, in catalog order.
    pub fn entries_for(kind: ServerKind) -> Vec<ToolEntry> {
        match kind {
            ServerKind::Research => vec![
                ToolEntry::of::<research::SearchPapersTool>(),
                ToolEntry::of::<research::ExtractPaperInfoTool>(),
                ToolEntry::of::<research::SearchPapersByAuthorTool>(),
                ToolEntry::of::<research::GetPaperCitationTool>(),
            ],
            ServerKind::Document => vec![
                ToolEntry::of::<document::ExtractTextFromPdfTool>(),
                ToolEntry::of::<document::ExtractTablesFromPdfTool>(),
                ToolEntry::of::<document::CountPdfPagesTool>(),
                ToolEntry::of::<document::ExtractPdfMetadataTool>(),
                ToolEntry::of::<document::CleanTextTool>(),
                ToolEntry::of::<document::CountWordsTool>(),
                ToolEntry::of::<document::ExtractEmailsTool>(),
                ToolEntry::of::<document::ExtractUrlsTool>(),
            ],
            ServerKind::Data => vec![
                ToolEntry::of::<data::ValidateEmailTool>(),
                ToolEntry::of::<data::ValidateUrlTool>(),
                ToolEntry::of::<data::ValidatePhoneTool>(),
                ToolEntry::of::<data::CsvToJsonTool>(),
                ToolEntry::of::<data::JsonToCsvTool>(),
                ToolEntry::of::<data::CleanStringTool>(),
                ToolEntry::of::<data::DetectDataTypeTool>(),
                ToolEntry::of::<data::FindDuplicatesTool>(),
                ToolEntry::of::<data::NormalizeWhitespaceTool>(),
                ToolEntry::of::<data::CalculateStatisticsTool>(),
            ],
            ServerKind::Web => vec![
                ToolEntry::of::<web::FetchWebpageTool>(),
                ToolEntry::of::<web::CheckUrlStatusTool>(),
                ToolEntry::of::<web::ExtractLinksTool>(),
                ToolEntry::of::<web::ScrapeWebpageTool>(),
                ToolEntry::of::<web::ExtractMetadataTool>(),
                ToolEntry::of::<web::ParseUrlTool>(),
                ToolEntry::of::<web::DownloadFileInfoTool>(),
                ToolEntry::of::<web::CheckMultipleUrlsTool>(),
            ],
        }
    }

    /// The server kind this registry serves.
    pub fn kind(&self) -> ServerKind {
        self.kind
    }

    /// Registered tool entries.
    pub fn entries(&self) -> &[ToolEntry] {
        &self.entries
    }

    /// Shared tool context.
    pub fn context(&self) -> &Arc<ToolContext> {
        &self.context
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    /// Get all tools as Tool models (metadata).
    pub fn list_tools(&self) -> Vec<Tool> {
        self.entries.iter().map(|e| e.tool().clone()).collect()
    }

    /// Look up a tool entry by name.
    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Dispatch a tool call to the appropriate handler.
    #[instrument(skip(self, arguments), fields(server = %self.kind))]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> ToolResult<serde_json::Value> {
        let Some(entry) = self.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return Err(ToolError::not_found(name));
        };

        info!("Calling tool: {}", name);
        let result = entry.call(arguments, self.context.clone()).await;

        if let Err(ref e) = result {
            warn!(kind = e.kind(), "Tool {} failed: {}", name, e);
        }

        result
    }
}
