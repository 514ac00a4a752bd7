//! Plain-text analysis tools.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domains::tools::definitions::common::{default_true, dedupe_preserving_order, round_to};
use crate::domains::tools::{ToolContext, ToolDefinition, ToolResult};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static SPECIAL_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^a-zA-Z0-9\s.,;:!?\-'"]"#).expect("valid regex"));

static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

static EMBEDDED_EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});

static EMBEDDED_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("valid regex"));

/// Parameters for tools that take a block of text.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TextParams {
    /// The text to process.
    #[schemars(description = "The text to process")]
    pub text: String,
}

// ============================================================================
// clean_text
// ============================================================================

/// Parameters for text cleaning.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CleanTextParams {
    /// The text to clean.
    #[schemars(description = "The text to clean")]
    pub text: String,

    #[serde(default = "default_true")]
    #[schemars(description = "Collapse repeated whitespace (default: true)")]
    pub remove_extra_spaces: bool,

    #[serde(default)]
    #[schemars(
        description = "Keep only alphanumerics, whitespace and basic punctuation (default: false)"
    )]
    pub remove_special_chars: bool,
}

pub fn clean_text(text: &str, remove_extra_spaces: bool, remove_special_chars: bool) -> String {
    let mut result = text.to_string();

    if remove_extra_spaces {
        result = WHITESPACE_RE.replace_all(&result, " ").into_owned();
        result = result.lines().map(str::trim).collect::<Vec<_>>().join("\n");
    }

    if remove_special_chars {
        result = SPECIAL_CHARS_RE.replace_all(&result, "").into_owned();
    }

    result.trim().to_string()
}

/// Text cleaning tool.
pub struct CleanTextTool;

#[async_trait::async_trait]
impl ToolDefinition for CleanTextTool {
    type Params = CleanTextParams;
    type Output = String;

    const NAME: &'static str = "clean_text";
    const DESCRIPTION: &'static str = "Clean and normalize text by removing extra whitespace \
         and optionally special characters. Use this to prepare text for analysis \
         or remove formatting artifacts.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(clean_text(
            &params.text,
            params.remove_extra_spaces,
            params.remove_special_chars,
        ))
    }
}

// ============================================================================
// count_words
// ============================================================================

/// Text size metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextCounts {
    pub words: usize,
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub sentences: usize,
    pub paragraphs: usize,
    pub avg_word_length: f64,
}

pub fn count_words(text: &str) -> TextCounts {
    let words = text.split_whitespace().count();
    let characters = text.chars().count();
    let characters_no_spaces = text.chars().filter(|c| *c != ' ' && *c != '\n').count();
    let sentences = SENTENCE_END_RE.find_iter(text).count();
    let paragraphs = text
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .count();

    let avg_word_length = if words > 0 {
        round_to(characters_no_spaces as f64 / words as f64, 2)
    } else {
        0.0
    };

    TextCounts {
        words,
        characters,
        characters_no_spaces,
        sentences: sentences.max(1),
        paragraphs: paragraphs.max(1),
        avg_word_length,
    }
}

/// Word counting tool.
pub struct CountWordsTool;

#[async_trait::async_trait]
impl ToolDefinition for CountWordsTool {
    type Params = TextParams;
    type Output = TextCounts;

    const NAME: &'static str = "count_words";
    const DESCRIPTION: &'static str = "Count words, characters, sentences, and paragraphs in text. \
         Use this for document analysis, content metrics, or readability assessment.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(count_words(&params.text))
    }
}

// ============================================================================
// extract_emails_from_text / extract_urls_from_text
// ============================================================================

pub fn extract_emails(text: &str) -> Vec<String> {
    dedupe_preserving_order(
        EMBEDDED_EMAIL_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string()),
    )
}

pub fn extract_urls(text: &str) -> Vec<String> {
    dedupe_preserving_order(EMBEDDED_URL_RE.find_iter(text).map(|m| m.as_str().to_string()))
}

/// Email extraction tool.
pub struct ExtractEmailsTool;

#[async_trait::async_trait]
impl ToolDefinition for ExtractEmailsTool {
    type Params = TextParams;
    type Output = Vec<String>;

    const NAME: &'static str = "extract_emails_from_text";
    const DESCRIPTION: &'static str = "Extract all email addresses from text. \
         Use this to find contact information in documents. \
         Returns unique addresses in the order they first appear.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(extract_emails(&params.text))
    }
}

/// URL extraction tool.
pub struct ExtractUrlsTool;

#[async_trait::async_trait]
impl ToolDefinition for ExtractUrlsTool {
    type Params = TextParams;
    type Output = Vec<String>;

    const NAME: &'static str = "extract_urls_from_text";
    const DESCRIPTION: &'static str = "Extract all http(s) URLs from text. \
         Use this to find links in documents or collect references. \
         Returns unique URLs in the order they first appear.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(extract_urls(&params.text))
    }
}
