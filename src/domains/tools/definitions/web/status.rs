//! Reachability checks using HEAD requests.

use std::time::{Duration, Instant};

use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderName};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::default_check_timeout;
use crate::domains::tools::definitions::common::{checked_url, round_to, timeout_from_secs};
use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolResult};

const MAX_URLS: usize = 50;
const MAX_CONCURRENT_CHECKS: usize = 8;
const FILE_INFO_TIMEOUT: Duration = Duration::from_secs(10);
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

async fn head(ctx: &ToolContext, url: Url, timeout: Duration) -> ToolResult<reqwest::Response> {
    debug!("HEAD {}", url);
    Ok(ctx.http.head(url).timeout(timeout).send().await?)
}

// ============================================================================
// check_url_status
// ============================================================================

/// Parameters for a single status check.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckUrlStatusParams {
    /// The URL to check.
    #[schemars(description = "The URL to check")]
    pub url: String,

    #[serde(default = "default_check_timeout")]
    #[schemars(description = "Request timeout in seconds (default: 5)")]
    pub timeout: u64,
}

/// Outcome of a status check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UrlStatus {
    Reachable {
        url: String,
        accessible: bool,
        status_code: u16,
        status_message: Option<String>,
        response_time_seconds: f64,
        final_url: String,
        redirected: bool,
    },
    Unreachable {
        url: String,
        accessible: bool,
        error: String,
    },
}

/// Single URL status tool.
pub struct CheckUrlStatusTool;

#[async_trait::async_trait]
impl ToolDefinition for CheckUrlStatusTool {
    type Params = CheckUrlStatusParams;
    type Output = UrlStatus;

    const NAME: &'static str = "check_url_status";
    const DESCRIPTION: &'static str = "Check if a URL is accessible and get its HTTP status. \
         Use this to verify links or check website availability. \
         Returns the status code, response time, and final URL after redirects.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let url = checked_url(ctx, &params.url)?;
        let requested = url.to_string();
        let started = Instant::now();

        let status = match head(ctx, url, timeout_from_secs(params.timeout)).await {
            Ok(response) => {
                let final_url = response.url().to_string();
                UrlStatus::Reachable {
                    url: params.url,
                    accessible: true,
                    status_code: response.status().as_u16(),
                    status_message: response.status().canonical_reason().map(str::to_string),
                    response_time_seconds: round_to(started.elapsed().as_secs_f64(), 3),
                    redirected: final_url != requested,
                    final_url,
                }
            }
            Err(err) => UrlStatus::Unreachable {
                url: params.url,
                accessible: false,
                error: match err {
                    ToolError::Timeout(_) => "Timeout".to_string(),
                    other => other.to_string(),
                },
            },
        };

        Ok(status)
    }
}

// ============================================================================
// download_file_info
// ============================================================================

/// Parameters for file info lookup.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DownloadFileInfoParams {
    /// The file URL.
    #[schemars(description = "The file URL")]
    pub url: String,
}

/// Size and type of a remote file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub url: String,
    /// True only for a 200 response.
    pub accessible: bool,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub file_size_bytes: Option<u64>,
    pub file_size_mb: Option<f64>,
    pub final_url: String,
}

fn header_text(response: &reqwest::Response, name: HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Size in mebibytes, rounded to two decimals.
pub fn size_in_mb(bytes: u64) -> f64 {
    round_to(bytes as f64 / BYTES_PER_MB, 2)
}

/// Remote file info tool.
pub struct DownloadFileInfoTool;

#[async_trait::async_trait]
impl ToolDefinition for DownloadFileInfoTool {
    type Params = DownloadFileInfoParams;
    type Output = FileInfo;

    const NAME: &'static str = "download_file_info";
    const DESCRIPTION: &'static str = "Get information about a downloadable file without \
         downloading it. Use this to check file size, type, and availability first.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let url = checked_url(ctx, &params.url)?;
        let response = head(ctx, url, FILE_INFO_TIMEOUT).await?;

        let content_type = header_text(&response, CONTENT_TYPE);
        let file_size_bytes =
            header_text(&response, CONTENT_LENGTH).and_then(|len| len.trim().parse::<u64>().ok());

        Ok(FileInfo {
            url: params.url,
            accessible: response.status() == reqwest::StatusCode::OK,
            status_code: response.status().as_u16(),
            content_type,
            file_size_bytes,
            file_size_mb: file_size_bytes.map(size_in_mb),
            final_url: response.url().to_string(),
        })
    }
}

// ============================================================================
// check_multiple_urls
// ============================================================================

/// Parameters for a batch status check.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckMultipleUrlsParams {
    /// URLs to check; only the first 50 are used.
    #[schemars(description = "List of URLs to check (at most 50 are checked)")]
    pub urls: Vec<String>,

    #[serde(default = "default_check_timeout")]
    #[schemars(description = "Timeout per URL in seconds (default: 5)")]
    pub timeout: u64,
}

/// Short status of one URL in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUrlStatus {
    pub url: String,
    pub accessible: bool,
    pub status_code: Option<u16>,
}

async fn check_one(ctx: &ToolContext, raw: String, timeout: Duration) -> BatchUrlStatus {
    let status_code = match checked_url(ctx, &raw) {
        Ok(url) => head(ctx, url, timeout)
            .await
            .ok()
            .map(|response| response.status().as_u16()),
        Err(err) => {
            debug!("Skipping {}: {}", raw, err);
            None
        }
    };

    BatchUrlStatus {
        url: raw,
        accessible: status_code.is_some(),
        status_code,
    }
}

/// Batch status tool.
pub struct CheckMultipleUrlsTool;

#[async_trait::async_trait]
impl ToolDefinition for CheckMultipleUrlsTool {
    type Params = CheckMultipleUrlsParams;
    type Output = Vec<BatchUrlStatus>;

    const NAME: &'static str = "check_multiple_urls";
    const DESCRIPTION: &'static str = "Check the status of multiple URLs at once (up to 50). \
         Use this to validate link lists or audit site availability. \
         Results are returned in input order.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let timeout = timeout_from_secs(params.timeout);
        let urls = params.urls.into_iter().take(MAX_URLS);
        let results: Vec<BatchUrlStatus> = futures::stream::iter(urls)
            .map(|url| check_one(ctx, url, timeout))
            .buffered(MAX_CONCURRENT_CHECKS)
            .collect()
            .await;

        let reachable = results.iter().filter(|r| r.accessible).count();
        info!("Checked {} URL(s), {} reachable", results.len(), reachable);
        Ok(results)
    }
}
