//! String cleaning tools.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::tools::definitions::common::default_true;
use crate::domains::tools::{ToolContext, ToolDefinition, ToolResult};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Collapse every whitespace run to one space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

// ============================================================================
// clean_string
// ============================================================================

/// Parameters for string cleaning.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CleanStringParams {
    /// The text to clean.
    #[schemars(description = "The text to clean")]
    pub text: String,

    #[serde(default)]
    #[schemars(description = "Convert to lowercase (default: false)")]
    pub lowercase: bool,

    #[serde(default)]
    #[schemars(description = "Remove punctuation marks (default: false)")]
    pub remove_punctuation: bool,

    #[serde(default)]
    #[schemars(description = "Remove numeric characters (default: false)")]
    pub remove_numbers: bool,

    #[serde(default = "default_true")]
    #[schemars(description = "Remove leading/trailing whitespace (default: true)")]
    pub trim: bool,
}

/// Apply the requested cleaning steps, then normalize whitespace.
pub fn clean_string(params: &CleanStringParams) -> String {
    let mut result = params.text.clone();

    if params.trim {
        result = result.trim().to_string();
    }

    if params.lowercase {
        result = result.to_lowercase();
    }

    if params.remove_punctuation {
        result = PUNCTUATION_RE.replace_all(&result, "").into_owned();
    }

    if params.remove_numbers {
        result = DIGITS_RE.replace_all(&result, "").into_owned();
    }

    normalize_whitespace(&result)
}

/// String cleaning tool.
pub struct CleanStringTool;

#[async_trait::async_trait]
impl ToolDefinition for CleanStringTool {
    type Params = CleanStringParams;
    type Output = String;

    const NAME: &'static str = "clean_string";
    const DESCRIPTION: &'static str = "Clean and normalize string data with various options \
         (lowercase, remove punctuation, remove numbers, trim). \
         Use this to prepare text data for analysis, comparison, or storage.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(clean_string(&params))
    }
}

// ============================================================================
// normalize_whitespace
// ============================================================================

/// Parameters for whitespace normalization.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NormalizeWhitespaceParams {
    /// Text with irregular whitespace.
    #[schemars(description = "Text with irregular whitespace")]
    pub text: String,
}

/// Whitespace normalization tool.
pub struct NormalizeWhitespaceTool;

#[async_trait::async_trait]
impl ToolDefinition for NormalizeWhitespaceTool {
    type Params = NormalizeWhitespaceParams;
    type Output = String;

    const NAME: &'static str = "normalize_whitespace";
    const DESCRIPTION: &'static str = "Normalize all whitespace (spaces, tabs, newlines) in text \
         to single spaces. Use this to clean data from sources with inconsistent spacing.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(normalize_whitespace(&params.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(text: &str) -> CleanStringParams {
        CleanStringParams {
            text: text.to_string(),
            lowercase: false,
            remove_punctuation: false,
            remove_numbers: false,
            trim: true,
        }
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\t\tb \n c  "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_normalize_whitespace_idempotent() {
        for text in ["  x  y ", "\n\n", "already clean", "\u{a0}nbsp\u{2003}em "] {
            let once = normalize_whitespace(text);
            assert_eq!(normalize_whitespace(&once), once);
        }
    }

    #[test]
    fn test_clean_string_defaults_collapse_spaces() {
        assert_eq!(clean_string(&params("  Hello,   World!  ")), "Hello, World!");
    }

    #[test]
    fn test_clean_string_all_options() {
        let mut p = params(" Order #42: SHIPPED, 3 items! ");
        p.lowercase = true;
        p.remove_punctuation = true;
        p.remove_numbers = true;
        assert_eq!(clean_string(&p), "order shipped items");
    }

    #[test]
    fn test_clean_string_keeps_unicode_words() {
        let mut p = params("Café — naïve!");
        p.remove_punctuation = true;
        assert_eq!(clean_string(&p), "Café naïve");
    }

    #[test]
    fn test_clean_string_params_defaults() {
        let p: CleanStringParams = serde_json::from_str(r#"{"text": "x"}"#).unwrap();
        assert!(p.trim);
        assert!(!p.lowercase);
    }
}
