//! arXiv Atom API client.

use std::time::Duration;

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::tools::{ToolContext, ToolError, ToolResult};

const ABS_MARKER: &str = "/abs/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Cached details of one paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperInfo {
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract", alias = "summary")]
    pub summary: String,
    pub pdf_url: String,
    /// Publication date, `YYYY-MM-DD`.
    pub published: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl PaperInfo {
    /// Publication year, or an empty string when the date is missing.
    pub fn year(&self) -> &str {
        self.published.split('-').next().unwrap_or_default()
    }
}

/// A paper returned by the API with its short identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ArxivPaper {
    /// Short ID such as `2301.12345v1`.
    pub paper_id: String,
    pub info: PaperInfo,
}

/// Result ordering supported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Relevance,
    SubmittedDate,
}

impl SortBy {
    fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::SubmittedDate => "submittedDate",
        }
    }
}

/// Run a search query against the configured API endpoint.
pub async fn search(
    ctx: &ToolContext,
    query: &str,
    max_results: usize,
    sort_by: SortBy,
) -> ToolResult<Vec<ArxivPaper>> {
    let max_results = max_results.to_string();
    let params = [
        ("search_query", query),
        ("start", "0"),
        ("max_results", max_results.as_str()),
        ("sortBy", sort_by.as_str()),
        ("sortOrder", "descending"),
    ];
    fetch_feed(ctx, &params).await
}

/// Look a single paper up by its ID.
pub async fn fetch_by_id(ctx: &ToolContext, paper_id: &str) -> ToolResult<Option<ArxivPaper>> {
    let papers = fetch_feed(ctx, &[("id_list", paper_id)]).await?;
    Ok(papers.into_iter().next())
}

async fn fetch_feed(ctx: &ToolContext, params: &[(&str, &str)]) -> ToolResult<Vec<ArxivPaper>> {
    let endpoint = &ctx.config.research.arxiv_api_url;
    debug!("Querying arXiv at {} with {:?}", endpoint, params);

    let body = ctx
        .http
        .get(endpoint)
        .query(params)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    parse_feed(&body)
}

fn child_text<'a>(node: Node<'a, 'a>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|child| child.has_tag_name(name))
        .and_then(|child| child.text())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse an Atom feed into papers, skipping API error entries.
pub fn parse_feed(xml: &str) -> ToolResult<Vec<ArxivPaper>> {
    let document = Document::parse(xml)
        .map_err(|e| ToolError::parse(format!("Invalid arXiv response: {}", e)))?;

    let papers = document
        .root_element()
        .children()
        .filter(|node| node.has_tag_name("entry"))
        .filter_map(parse_entry)
        .collect();

    Ok(papers)
}

fn parse_entry(entry: Node) -> Option<ArxivPaper> {
    let entry_id = child_text(entry, "id")?.trim();
    let (_, short_id) = entry_id.split_once(ABS_MARKER)?;
    let short_id = short_id.to_string();

    let authors = entry
        .children()
        .filter(|node| node.has_tag_name("author"))
        .filter_map(|author| child_text(author, "name"))
        .map(collapse_whitespace)
        .collect();

    let categories = entry
        .children()
        .filter(|node| node.has_tag_name("category"))
        .filter_map(|node| node.attribute("term"))
        .map(str::to_string)
        .collect();

    let pdf_url = entry
        .children()
        .filter(|node| node.has_tag_name("link"))
        .find(|node| node.attribute("title") == Some("pdf"))
        .and_then(|node| node.attribute("href"))
        .map(str::to_string)
        .unwrap_or_else(|| entry_id.replacen(ABS_MARKER, "/pdf/", 1));

    let published: String = child_text(entry, "published")
        .map(|date| date.trim().chars().take(10).collect())
        .unwrap_or_default();

    Some(ArxivPaper {
        paper_id: short_id,
        info: PaperInfo {
            title: collapse_whitespace(child_text(entry, "title").unwrap_or_default()),
            authors,
            summary: child_text(entry, "summary")
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            pdf_url,
            published,
            categories,
        },
    })
}
