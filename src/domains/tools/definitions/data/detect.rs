//! Data type detection for single string values.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::validate::EMAIL_RE;
use crate::domains::tools::{ToolContext, ToolDefinition, ToolResult};

static URL_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s]+$").expect("valid regex"));

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+$").expect("valid regex"));

// YYYY-MM-DD, MM/DD/YYYY, DD-MM-YYYY (prefix match)
static DATE_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid regex"),
        Regex::new(r"^\d{2}/\d{2}/\d{4}").expect("valid regex"),
        Regex::new(r"^\d{2}-\d{2}-\d{4}").expect("valid regex"),
    ]
});

const BOOLEAN_WORDS: [&str; 6] = ["true", "false", "yes", "no", "0", "1"];

/// Parameters for data type detection.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DetectDataTypeParams {
    /// The string value to analyze.
    #[schemars(description = "The string value to analyze")]
    pub value: String,
}

/// Detected type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Empty,
    Boolean,
    Integer,
    Float,
    Email,
    Url,
    Date,
    String,
}

/// How sure the detector is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

/// Detection result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTypeDetection {
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl DataTypeDetection {
    fn new(data_type: DataType, confidence: Confidence, value: serde_json::Value) -> Self {
        Self {
            data_type,
            confidence,
            value: Some(value),
        }
    }
}

/// JSON number for a string of digits, keeping the exact value when it fits
/// in 64 bits.
fn integer_value(digits: &str) -> serde_json::Value {
    let unsigned = digits.strip_prefix('+').unwrap_or(digits);
    if let Ok(small) = unsigned.parse::<i64>() {
        return small.into();
    }
    if let Ok(large) = unsigned.parse::<u64>() {
        return large.into();
    }
    unsigned
        .parse::<f64>()
        .map(serde_json::Value::from)
        .unwrap_or_else(|_| serde_json::Value::String(digits.to_string()))
}

/// Classify a value.
///
/// Checks run in order: empty, boolean, integer, float, email, URL, date,
/// falling back to string.
pub fn detect_data_type(raw: &str) -> DataTypeDetection {
    let value = raw.trim();

    if value.is_empty() {
        return DataTypeDetection {
            data_type: DataType::Empty,
            confidence: Confidence::High,
            value: None,
        };
    }

    let text = || serde_json::Value::String(value.to_string());

    if BOOLEAN_WORDS.contains(&value.to_lowercase().as_str()) {
        return DataTypeDetection::new(DataType::Boolean, Confidence::Medium, text());
    }

    if INTEGER_RE.is_match(value) {
        return DataTypeDetection::new(DataType::Integer, Confidence::High, integer_value(value));
    }

    // Only spellings with a decimal point count as floats; "1e3" and "inf" do not.
    if value.contains('.') {
        if let Some(float) = value.parse::<f64>().ok().filter(|f| f.is_finite()) {
            return DataTypeDetection::new(DataType::Float, Confidence::High, float.into());
        }
    }

    if EMAIL_RE.is_match(value) {
        return DataTypeDetection::new(DataType::Email, Confidence::High, text());
    }

    if URL_VALUE_RE.is_match(value) {
        return DataTypeDetection::new(DataType::Url, Confidence::High, text());
    }

    if DATE_RES.iter().any(|re| re.is_match(value)) {
        return DataTypeDetection::new(DataType::Date, Confidence::Medium, text());
    }

    DataTypeDetection::new(DataType::String, Confidence::High, text())
}

/// Data type detection tool.
pub struct DetectDataTypeTool;

#[async_trait::async_trait]
impl ToolDefinition for DetectDataTypeTool {
    type Params = DetectDataTypeParams;
    type Output = DataTypeDetection;

    const NAME: &'static str = "detect_data_type";
    const DESCRIPTION: &'static str = "Detect the data type of a string value \
         (empty, boolean, integer, float, email, url, date, or string). \
         Use this to automatically classify and validate data fields.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(detect_data_type(&params.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(value: &str) -> DataType {
        detect_data_type(value).data_type
    }

    #[test]
    fn test_detection_order() {
        assert_eq!(kind("   "), DataType::Empty);
        assert_eq!(kind("Yes"), DataType::Boolean);
        assert_eq!(kind("1"), DataType::Boolean);
        assert_eq!(kind("42"), DataType::Integer);
        assert_eq!(kind("-3.75"), DataType::Float);
        assert_eq!(kind("dev@example.com"), DataType::Email);
        assert_eq!(kind("https://example.com/x"), DataType::Url);
        assert_eq!(kind("2024-01-31"), DataType::Date);
        assert_eq!(kind("01/31/2024"), DataType::Date);
        assert_eq!(kind("31-01-2024"), DataType::Date);
        assert_eq!(kind("hello world"), DataType::String);
    }

    #[test]
    fn test_numeric_spellings() {
        assert_eq!(kind("1e3"), DataType::String);
        assert_eq!(kind("1.5e3"), DataType::Float);
        assert_eq!(kind(".5"), DataType::Float);
        assert_eq!(kind("+12"), DataType::Integer);
        assert_eq!(kind("007"), DataType::Integer);

        let huge = detect_data_type("99999999999999999999");
        assert_eq!(huge.data_type, DataType::Integer);
        assert_eq!(huge.value, Some(serde_json::json!(1e20)));

        let unsigned = detect_data_type("18446744073709551615");
        assert_eq!(unsigned.value, Some(serde_json::json!(u64::MAX)));
    }

    #[test]
    fn test_non_finite_is_string() {
        assert_eq!(kind("inf"), DataType::String);
        assert_eq!(kind("NaN"), DataType::String);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(detect_data_type(" 7 ")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "integer", "confidence": "high", "value": 7})
        );

        let empty = serde_json::to_value(detect_data_type("")).unwrap();
        assert_eq!(empty, serde_json::json!({"type": "empty", "confidence": "high"}));
    }
}
