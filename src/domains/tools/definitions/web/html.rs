//! HTML extraction tools.
//!
//! `scraper::Html` is not `Send`, so documents are parsed and queried inside
//! `spawn_blocking` after the body has been fetched.

use std::time::Duration;

use schemars::JsonSchema;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use super::fetch::get_page;
use crate::domains::tools::definitions::common::{checked_url, dedupe_preserving_order, truncate_chars};
use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolResult};

const PAGE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ELEMENTS: usize = 50;
const MAX_ELEMENT_HTML_CHARS: usize = 500;
const MAX_TEXT_CHARS: usize = 5_000;

fn selector(css: &str) -> ToolResult<Selector> {
    Selector::parse(css)
        .map_err(|e| ToolError::invalid_arguments(format!("Invalid CSS selector '{}': {}", css, e)))
}

/// Fetch a page and run a parser over its body on the blocking pool.
async fn with_page<T, F>(ctx: &ToolContext, raw_url: &str, parse: F) -> ToolResult<T>
where
    T: Send + 'static,
    F: FnOnce(&str, &Url) -> ToolResult<T> + Send + 'static,
{
    let url = checked_url(ctx, raw_url)?;
    let page = get_page(ctx, url.clone(), PAGE_TIMEOUT).await?;
    tokio::task::spawn_blocking(move || parse(&page.body, &url))
        .await
        .map_err(|e| ToolError::internal(format!("HTML parsing task failed: {}", e)))?
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// extract_links
// ============================================================================

/// Parameters for link extraction.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExtractLinksParams {
    /// The webpage URL.
    #[schemars(description = "The webpage URL to extract links from")]
    pub url: String,

    #[serde(default)]
    #[schemars(description = "If true, also return same-domain links as 'links' (default: false)")]
    pub filter_external: bool,
}

/// Links found on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkReport {
    pub url: String,
    /// Number of links before de-duplication.
    pub total_links: usize,
    pub internal_links: Vec<String>,
    pub external_links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
}

/// Same host and port as the page, or no host at all (`mailto:`).
fn is_internal(link: &Url, base: &Url) -> bool {
    match link.host_str() {
        None => true,
        Some(host) => {
            base.host_str() == Some(host)
                && link.port_or_known_default() == base.port_or_known_default()
        }
    }
}

/// Resolve every `<a href>` against the page URL and split by host.
pub fn collect_links(html: &str, base: &Url) -> ToolResult<(Vec<String>, Vec<String>, usize)> {
    let document = Html::parse_document(html);
    let anchors = selector("a[href]")?;

    let mut internal = Vec::new();
    let mut external = Vec::new();
    for anchor in document.select(&anchors) {
        let Some(link) = anchor
            .value()
            .attr("href")
            .and_then(|href| base.join(href.trim()).ok())
        else {
            continue;
        };
        if is_internal(&link, base) {
            internal.push(link.to_string());
        } else {
            external.push(link.to_string());
        }
    }

    let total = internal.len() + external.len();
    Ok((
        dedupe_preserving_order(internal),
        dedupe_preserving_order(external),
        total,
    ))
}

/// Link extraction tool.
pub struct ExtractLinksTool;

#[async_trait::async_trait]
impl ToolDefinition for ExtractLinksTool {
    type Params = ExtractLinksParams;
    type Output = LinkReport;

    const NAME: &'static str = "extract_links";
    const DESCRIPTION: &'static str = "Extract all links from a webpage, split into internal \
         and external links. Use this to discover page structure or find related pages.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let (internal_links, external_links, total_links) =
            with_page(ctx, &params.url, collect_links).await?;
        info!(
            "Found {} link(s) on {}: {} internal, {} external",
            total_links,
            params.url,
            internal_links.len(),
            external_links.len()
        );

        Ok(LinkReport {
            url: params.url,
            total_links,
            links: params.filter_external.then(|| internal_links.clone()),
            internal_links,
            external_links,
        })
    }
}

// ============================================================================
// scrape_webpage
// ============================================================================

/// Parameters for scraping.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ScrapeWebpageParams {
    /// The webpage URL.
    #[schemars(description = "The webpage URL to scrape")]
    pub url: String,

    /// Optional CSS selector.
    #[serde(default)]
    #[schemars(
        description = "CSS selector to target specific elements (optional; without it the page title and text are returned)"
    )]
    pub css_selector: Option<String>,
}

/// One element matched by a selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedElement {
    pub text: String,
    /// Outer HTML, first 500 characters.
    pub html: String,
}

/// Scrape result, shaped by whether a selector was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScrapeResult {
    Selected {
        url: String,
        selector: String,
        count: usize,
        elements: Vec<ScrapedElement>,
    },
    Page {
        url: String,
        title: String,
        text: String,
        text_length: usize,
    },
}

/// Elements matching a selector, at most 50.
pub fn select_elements(html: &str, css: &str) -> ToolResult<Vec<ScrapedElement>> {
    let selector = selector(css)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .take(MAX_ELEMENTS)
        .map(|element| ScrapedElement {
            text: element_text(element),
            html: truncate_chars(&element.html(), MAX_ELEMENT_HTML_CHARS),
        })
        .collect())
}

/// Page title and visible text, one stripped text node per line.
pub fn page_text(html: &str) -> (String, String) {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|title| document.select(&title).next().map(element_text))
        .unwrap_or_else(|| "No title".to_string());

    let lines: Vec<&str> = document
        .tree
        .root()
        .descendants()
        .filter(|node| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|element| matches!(element.name(), "script" | "style"))
            })
        })
        .filter_map(|node| node.value().as_text().map(|text| text.trim()))
        .filter(|text| !text.is_empty())
        .collect();

    (title, lines.join("\n"))
}

/// Scraping tool.
pub struct ScrapeWebpageTool;

#[async_trait::async_trait]
impl ToolDefinition for ScrapeWebpageTool {
    type Params = ScrapeWebpageParams;
    type Output = ScrapeResult;

    const NAME: &'static str = "scrape_webpage";
    const DESCRIPTION: &'static str = "Scrape content from a webpage using a CSS selector. \
         Use this to extract structured data or specific elements. \
         Without a selector, returns the page title and main text.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let url = params.url;
        match params.css_selector.filter(|css| !css.trim().is_empty()) {
            Some(css) => {
                // Reject a bad selector before fetching anything.
                selector(&css)?;
                let query = css.clone();
                let elements =
                    with_page(ctx, &url, move |html, _| select_elements(html, &query)).await?;
                Ok(ScrapeResult::Selected {
                    url,
                    selector: css,
                    count: elements.len(),
                    elements,
                })
            }
            None => {
                let (title, text) = with_page(ctx, &url, |html, _| Ok(page_text(html))).await?;
                Ok(ScrapeResult::Page {
                    url,
                    title,
                    text_length: text.chars().count(),
                    text: truncate_chars(&text, MAX_TEXT_CHARS),
                })
            }
        }
    }
}

// ============================================================================
// extract_metadata
// ============================================================================

/// Parameters naming one page.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PageUrlParams {
    /// The webpage URL.
    #[schemars(description = "The webpage URL to analyze")]
    pub url: String,
}

/// Page metadata from `<title>` and `<meta>` tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMetadata {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub author: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
}

fn meta_content(document: &Html, attribute: &str, value: &str) -> Option<String> {
    let css = format!("meta[{}=\"{}\"]", attribute, value);
    let selector = Selector::parse(&css).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
}

/// Read title, description, keywords, author and Open Graph tags.
pub fn page_metadata(html: &str, url: &str) -> PageMetadata {
    let document = Html::parse_document(html);
    let title = Selector::parse("title")
        .ok()
        .and_then(|title| document.select(&title).next().map(element_text));

    PageMetadata {
        url: url.to_string(),
        title,
        description: meta_content(&document, "name", "description"),
        keywords: meta_content(&document, "name", "keywords"),
        author: meta_content(&document, "name", "author"),
        og_title: meta_content(&document, "property", "og:title"),
        og_description: meta_content(&document, "property", "og:description"),
        og_image: meta_content(&document, "property", "og:image"),
    }
}

/// Metadata extraction tool.
pub struct ExtractMetadataTool;

#[async_trait::async_trait]
impl ToolDefinition for ExtractMetadataTool {
    type Params = PageUrlParams;
    type Output = PageMetadata;

    const NAME: &'static str = "extract_metadata";
    const DESCRIPTION: &'static str = "Extract metadata from a webpage: title, description, \
         keywords, author, and Open Graph tags. Use this for link previews or SEO analysis.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let url = params.url;
        let requested = url.clone();
        with_page(ctx, &url, move |html, _| Ok(page_metadata(html, &requested))).await
    }
}
