//! Webpage retrieval.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::default_page_timeout;
use crate::domains::tools::definitions::common::{checked_url, timeout_from_secs, truncate_chars};
use crate::domains::tools::{ToolContext, ToolDefinition, ToolResult};

const MAX_CONTENT_CHARS: usize = 10_000;

/// A page fetched with GET.
#[derive(Debug)]
pub struct FetchedPage {
    pub final_url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// GET a URL that already passed the URL policy, following redirects.
///
/// Non-success statuses are returned as pages, not errors.
pub async fn get_page(ctx: &ToolContext, url: Url, timeout: Duration) -> ToolResult<FetchedPage> {
    debug!("GET {}", url);
    let response = ctx.http.get(url).timeout(timeout).send().await?;

    let final_url = response.url().clone();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;

    Ok(FetchedPage {
        final_url,
        status,
        headers,
        body,
    })
}

/// Charset named in the `Content-Type` header, if any.
pub fn charset(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

/// Header map flattened to strings; repeated headers are joined with ", ".
pub fn header_strings(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

/// Parameters for page fetching.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FetchWebpageParams {
    /// The URL to fetch.
    #[schemars(description = "The URL to fetch")]
    pub url: String,

    #[serde(default = "default_page_timeout")]
    #[schemars(description = "Request timeout in seconds (default: 10)")]
    pub timeout: u64,
}

/// A fetched page.
#[derive(Debug, Clone, Serialize)]
pub struct WebpageContent {
    pub success: bool,
    pub status_code: u16,
    /// URL after redirects.
    pub url: String,
    /// First 10 000 characters of the body.
    pub content: String,
    /// Length of the full body in characters.
    pub content_length: usize,
    pub encoding: Option<String>,
    pub headers: BTreeMap<String, String>,
}

/// Page fetching tool.
pub struct FetchWebpageTool;

#[async_trait::async_trait]
impl ToolDefinition for FetchWebpageTool {
    type Params = FetchWebpageParams;
    type Output = WebpageContent;

    const NAME: &'static str = "fetch_webpage";
    const DESCRIPTION: &'static str = "Fetch the content of a webpage. \
         Use this to retrieve HTML content, check page accessibility, or download web pages. \
         Returns the status code, headers, and up to 10,000 characters of content.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let url = checked_url(ctx, &params.url)?;
        let page = get_page(ctx, url, timeout_from_secs(params.timeout)).await?;

        Ok(WebpageContent {
            success: true,
            status_code: page.status.as_u16(),
            url: page.final_url.to_string(),
            content: truncate_chars(&page.body, MAX_CONTENT_CHARS),
            content_length: page.body.chars().count(),
            encoding: charset(&page.headers),
            headers: header_strings(&page.headers),
        })
    }
}
