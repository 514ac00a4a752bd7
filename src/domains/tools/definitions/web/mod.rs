//! Web tools module.
//!
//! - `fetch`: page retrieval and the shared GET helper
//! - `status`: HEAD-based reachability and file info checks
//! - `html`: link, content and metadata extraction with `scraper`
//! - `parse`: URL decomposition
//!
//! Every caller-supplied URL passes the outbound URL policy before a request
//! is made.

pub mod fetch;
pub mod html;
pub mod parse;
pub mod status;

pub use fetch::FetchWebpageTool;
pub use html::{ExtractLinksTool, ExtractMetadataTool, ScrapeWebpageTool};
pub use parse::ParseUrlTool;
pub use status::{CheckMultipleUrlsTool, CheckUrlStatusTool, DownloadFileInfoTool};

fn default_page_timeout() -> u64 {
    10
}

fn default_check_timeout() -> u64 {
    5
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::core::ServerKind;
    use crate::domains::tools::{ToolContext, test_context};

    /// Web context that may reach the loopback mock server.
    pub(crate) fn local_context() -> Arc<ToolContext> {
        test_context(ServerKind::Web, |config| {
            config.security.allow_private_hosts = true;
        })
    }
}
