//! Research tools module.
//!
//! This module searches arXiv and keeps what it finds:
//! - `arxiv`: Atom API client and feed parsing
//! - `store`: on-disk paper cache shared by the lookup tools
//! - `citation`: BibTeX, APA and simple citation styles
//!
//! Papers found by `search_papers` are cached per topic so that
//! `extract_paper_info` and `get_paper_citation` can resolve their IDs.
//! IDs that were never searched are fetched from arXiv directly.

pub mod arxiv;
pub mod citation;
pub mod store;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use arxiv::PaperInfo;
pub use store::PaperStore;

use self::arxiv::SortBy;
use self::citation::{CitationFormat, format_citation};
use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolResult};

const MAX_TOPIC_RESULTS: usize = 20;
const MAX_AUTHOR_RESULTS: usize = 15;

fn default_max_results() -> usize {
    5
}

fn default_citation_format() -> String {
    "bibtex".to_string()
}

fn require_non_empty<'a>(value: &'a str, field: &str) -> ToolResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ToolError::invalid_arguments(format!(
            "'{}' must not be empty",
            field
        )));
    }
    Ok(value)
}

/// Find a paper in the cache, falling back to an arXiv ID lookup.
pub async fn resolve_paper(ctx: &ToolContext, paper_id: &str) -> ToolResult<PaperInfo> {
    if let Some(info) = ctx.papers.find(paper_id).await? {
        debug!("Paper {} found in cache", paper_id);
        return Ok(info);
    }

    match arxiv::fetch_by_id(ctx, paper_id).await? {
        Some(paper) => Ok(paper.info),
        None => Err(ToolError::ResourceNotFound(format!(
            "No information found for paper {}. Try searching first.",
            paper_id
        ))),
    }
}

// ============================================================================
// search_papers
// ============================================================================

/// Parameters for topic search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchPapersParams {
    /// Research topic or keywords.
    #[schemars(description = "The research topic or keywords to search for")]
    pub topic: String,

    #[serde(default = "default_max_results")]
    #[schemars(description = "Maximum number of results to retrieve (default: 5, max: 20)")]
    pub max_results: usize,
}

/// Topic search tool.
pub struct SearchPapersTool;

#[async_trait::async_trait]
impl ToolDefinition for SearchPapersTool {
    type Params = SearchPapersParams;
    type Output = Vec<String>;

    const NAME: &'static str = "search_papers";
    const DESCRIPTION: &'static str = "Search for academic papers on arXiv by topic. \
         Use this to find research papers or scientific articles on any topic. \
         Returns paper IDs that can be used with extract_paper_info.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let topic = require_non_empty(&params.topic, "topic")?;
        let max_results = params.max_results.clamp(1, MAX_TOPIC_RESULTS);

        let papers = arxiv::search(ctx, topic, max_results, SortBy::Relevance).await?;
        let file = ctx.papers.save_topic(topic, &papers).await?;
        info!(
            "Found {} paper(s) for '{}', cached in {}",
            papers.len(),
            topic,
            file.display()
        );

        Ok(papers.into_iter().map(|paper| paper.paper_id).collect())
    }
}

// ============================================================================
// extract_paper_info
// ============================================================================

/// Parameters naming one paper.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PaperIdParams {
    /// arXiv paper ID.
    #[schemars(description = "The arXiv paper ID (e.g., \"2301.12345\")")]
    pub paper_id: String,
}

/// Paper details tool.
pub struct ExtractPaperInfoTool;

#[async_trait::async_trait]
impl ToolDefinition for ExtractPaperInfoTool {
    type Params = PaperIdParams;
    type Output = PaperInfo;

    const NAME: &'static str = "extract_paper_info";
    const DESCRIPTION: &'static str = "Get detailed information about a specific paper: \
         title, authors, abstract, PDF URL, publication date, and categories. \
         Use this after search_papers.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let paper_id = require_non_empty(&params.paper_id, "paper_id")?;
        resolve_paper(ctx, paper_id).await
    }
}

// ============================================================================
// search_papers_by_author
// ============================================================================

/// Parameters for author search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchByAuthorParams {
    /// Full or partial author name.
    #[schemars(description = "Full or partial name of the author")]
    pub author_name: String,

    #[serde(default = "default_max_results")]
    #[schemars(description = "Maximum number of results (default: 5, max: 15)")]
    pub max_results: usize,
}

/// Summary of one paper by an author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorPaper {
    pub paper_id: String,
    pub title: String,
    pub published: String,
    pub authors: Vec<String>,
}

/// Author search tool.
pub struct SearchPapersByAuthorTool;

#[async_trait::async_trait]
impl ToolDefinition for SearchPapersByAuthorTool {
    type Params = SearchByAuthorParams;
    type Output = Vec<AuthorPaper>;

    const NAME: &'static str = "search_papers_by_author";
    const DESCRIPTION: &'static str = "Search for papers by a specific author on arXiv, \
         newest first. Use this to find papers written by a particular researcher.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let author = require_non_empty(&params.author_name, "author_name")?;
        let max_results = params.max_results.clamp(1, MAX_AUTHOR_RESULTS);

        let query = format!("au:{}", author);
        let papers = arxiv::search(ctx, &query, max_results, SortBy::SubmittedDate).await?;
        info!("Found {} paper(s) by '{}'", papers.len(), author);

        Ok(papers
            .into_iter()
            .map(|paper| AuthorPaper {
                paper_id: paper.paper_id,
                title: paper.info.title,
                published: paper.info.published,
                authors: paper.info.authors,
            })
            .collect())
    }
}

// ============================================================================
// get_paper_citation
// ============================================================================

/// Parameters for citation generation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CitationParams {
    /// arXiv paper ID.
    #[schemars(description = "The arXiv paper ID")]
    pub paper_id: String,

    #[serde(default = "default_citation_format")]
    #[schemars(description = "Citation format: \"bibtex\", \"apa\", or \"simple\" (default: bibtex)")]
    pub format: String,
}

/// Citation tool.
pub struct GetPaperCitationTool;

#[async_trait::async_trait]
impl ToolDefinition for GetPaperCitationTool {
    type Params = CitationParams;
    type Output = String;

    const NAME: &'static str = "get_paper_citation";
    const DESCRIPTION: &'static str = "Generate a citation for a paper in BibTeX, APA, \
         or simple format. Use this when you need to cite a paper in your work.";

    async fn execute(params: Self::Params, ctx: &ToolContext) -> ToolResult<Self::Output> {
        let paper_id = require_non_empty(&params.paper_id, "paper_id")?;
        let info = resolve_paper(ctx, paper_id).await?;
        Ok(format_citation(
            paper_id,
            &info,
            CitationFormat::from_name(&params.format),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::arxiv::tests::SAMPLE_FEED;
    use super::*;
    use crate::core::ServerKind;
    use crate::domains::tools::test_context;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMPTY_FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;

    fn context(server: &MockServer, paper_dir: &std::path::Path) -> Arc<ToolContext> {
        let api = format!("{}/api/query", server.uri());
        let dir = paper_dir.to_path_buf();
        test_context(ServerKind::Research, move |config| {
            config.research.arxiv_api_url = api;
            config.research.paper_dir = dir;
        })
    }

    fn feed(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body, "application/atom+xml")
    }

    #[tokio::test]
    async fn test_search_caches_and_resolves() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("search_query", "transformers"))
            .and(query_param("max_results", "20"))
            .respond_with(feed(SAMPLE_FEED))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server, dir.path());
        let ids = SearchPapersTool::execute(
            SearchPapersParams {
                topic: "transformers".to_string(),
                max_results: 500,
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(ids, vec!["2301.00001v2", "1706.99999v1"]);
        assert!(dir.path().join("transformers/papers_info.json").exists());

        // Served from the cache: the mock above only answers once.
        let info = ExtractPaperInfoTool::execute(
            PaperIdParams {
                paper_id: "2301.00001v2".to_string(),
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(info.title, "Attention Is Still All You Need");

        let citation = GetPaperCitationTool::execute(
            CitationParams {
                paper_id: "1706.99999v1".to_string(),
                format: "apa".to_string(),
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(
            citation,
            "Grace Hopper (2017). Solo Work. arXiv preprint arXiv:1706.99999v1."
        );
    }

    #[tokio::test]
    async fn test_extract_falls_back_to_id_lookup() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("id_list", "2301.00001v2"))
            .respond_with(feed(SAMPLE_FEED))
            .mount(&server)
            .await;

        let ctx = context(&server, dir.path());
        let info = ExtractPaperInfoTool::execute(
            PaperIdParams {
                paper_id: "2301.00001v2".to_string(),
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(info.published, "2023-01-02");
    }

    #[tokio::test]
    async fn test_unknown_paper_is_not_found() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .respond_with(feed(EMPTY_FEED))
            .mount(&server)
            .await;

        let ctx = context(&server, dir.path());
        let err = GetPaperCitationTool::execute(
            CitationParams {
                paper_id: "0000.00000".to_string(),
                format: "bibtex".to_string(),
            },
            &ctx,
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No information found for paper 0000.00000. Try searching first."
        );
    }

    #[tokio::test]
    async fn test_author_search() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("search_query", "au:Hopper"))
            .and(query_param("max_results", "1"))
            .and(query_param("sortBy", "submittedDate"))
            .respond_with(feed(SAMPLE_FEED))
            .mount(&server)
            .await;

        let ctx = context(&server, dir.path());
        let papers = SearchPapersByAuthorTool::execute(
            SearchByAuthorParams {
                author_name: "Hopper".to_string(),
                max_results: 0,
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[1].paper_id, "1706.99999v1");
        assert_eq!(papers[1].authors, vec!["Grace Hopper"]);
    }

    #[tokio::test]
    async fn test_empty_topic_rejected() {
        let ctx = test_context(ServerKind::Research, |_| {});
        let result = SearchPapersTool::execute(
            SearchPapersParams {
                topic: "  ".to_string(),
                max_results: 5,
            },
            &ctx,
        )
        .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
