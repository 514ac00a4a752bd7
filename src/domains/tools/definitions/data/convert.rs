//! CSV <-> JSON conversion tools.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::domains::tools::definitions::common::default_true;
use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolResult};

// ============================================================================
// csv_to_json
// ============================================================================

/// Parameters for CSV to JSON conversion.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CsvToJsonParams {
    /// CSV data as a string.
    #[serde(alias = "data")]
    #[schemars(description = "CSV data as a string")]
    pub csv_data: String,

    /// Whether the first row contains headers.
    #[serde(default = "default_true")]
    #[schemars(description = "Whether the first row contains headers (default: true)")]
    pub has_header: bool,
}

/// Convert CSV text into a list of row objects.
///
/// With a header row, each data row becomes an object keyed by the header;
/// short rows are padded with empty strings and surplus cells are dropped.
/// Without a header, keys are `col_0`, `col_1`, ...
pub fn csv_to_json(csv_data: &str, has_header: bool) -> ToolResult<Vec<Value>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ToolError::parse(format!("Failed to convert CSV: {}", e)))?;

    let Some((first, rest)) = rows.split_first() else {
        return Err(ToolError::invalid_arguments("No data provided"));
    };

    let objects = if has_header {
        let headers: Vec<&str> = first.iter().collect();
        rest.iter()
            .map(|row| {
                let object: Map<String, Value> = headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| {
                        let cell = row.get(i).unwrap_or_default();
                        (header.to_string(), Value::String(cell.to_string()))
                    })
                    .collect();
                Value::Object(object)
            })
            .collect()
    } else {
        rows.iter()
            .map(|row| {
                let object: Map<String, Value> = row
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| (format!("col_{}", i), Value::String(cell.to_string())))
                    .collect();
                Value::Object(object)
            })
            .collect()
    };

    Ok(objects)
}

/// CSV to JSON conversion tool.
pub struct CsvToJsonTool;

#[async_trait::async_trait]
impl ToolDefinition for CsvToJsonTool {
    type Params = CsvToJsonParams;
    type Output = Vec<Value>;

    const NAME: &'static str = "csv_to_json";
    const DESCRIPTION: &'static str = "Convert CSV data to JSON format. \
         Use this to transform CSV data into JSON for API consumption or data processing. \
         Returns an array with one object per row.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        let rows = csv_to_json(&params.csv_data, params.has_header)?;
        info!("Converted {} CSV row(s) to JSON", rows.len());
        Ok(rows)
    }
}

// ============================================================================
// json_to_csv
// ============================================================================

/// Parameters for JSON to CSV conversion.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct JsonToCsvParams {
    /// JSON array of objects, either as JSON text or inline.
    #[serde(alias = "data")]
    #[schemars(description = "JSON array of objects (a JSON string or an inline array)")]
    pub json_data: Value,
}

/// Convert a JSON array of objects into CSV text.
///
/// Columns are the union of all object keys in first-seen order.
pub fn json_to_csv(json_data: &Value) -> ToolResult<String> {
    let parsed;
    let data = match json_data {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text)
                .map_err(|_| ToolError::parse("Invalid JSON format"))?;
            &parsed
        }
        other => other,
    };

    let items = match data {
        Value::Array(items) if !items.is_empty() => items,
        _ => {
            return Err(ToolError::invalid_arguments(
                "JSON must be a non-empty array of objects",
            ));
        }
    };

    let mut objects = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Object(object) => objects.push(object),
            _ => {
                return Err(ToolError::invalid_arguments(format!(
                    "Item {} is not an object",
                    index
                )));
            }
        }
    }

    let mut columns: Vec<&str> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&columns)
        .map_err(|e| ToolError::internal(e.to_string()))?;

    for object in objects {
        let record: Vec<String> = columns
            .iter()
            .map(|column| object.get(*column).map(cell_text).unwrap_or_default())
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| ToolError::internal(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ToolError::internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ToolError::internal(e.to_string()))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON to CSV conversion tool.
pub struct JsonToCsvTool;

#[async_trait::async_trait]
impl ToolDefinition for JsonToCsvTool {
    type Params = JsonToCsvParams;
    type Output = String;

    const NAME: &'static str = "json_to_csv";
    const DESCRIPTION: &'static str = "Convert a JSON array of objects to CSV format. \
         Use this to transform JSON data into CSV for spreadsheet import or reporting. \
         Columns are the union of all keys.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        json_to_csv(&params.json_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_csv_to_json_with_header() {
        let rows = csv_to_json("name,age\nAda,36\nAlan,41\n", true).unwrap();
        assert_eq!(
            rows,
            vec![
                json!({"name": "Ada", "age": "36"}),
                json!({"name": "Alan", "age": "41"})
            ]
        );
    }

    #[test]
    fn test_csv_to_json_pads_short_rows() {
        let rows = csv_to_json("a,b,c\n1\n", true).unwrap();
        assert_eq!(rows, vec![json!({"a": "1", "b": "", "c": ""})]);
    }

    #[test]
    fn test_csv_to_json_without_header() {
        let rows = csv_to_json("x,y\n1,2", false).unwrap();
        assert_eq!(rows[0], json!({"col_0": "x", "col_1": "y"}));
        assert_eq!(rows[1], json!({"col_0": "1", "col_1": "2"}));
    }

    #[test]
    fn test_csv_to_json_empty_input() {
        let result = csv_to_json("", true);
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn test_csv_quoted_fields() {
        let rows = csv_to_json("city,note\n\"Paris, FR\",\"said \"\"hi\"\"\"\n", true).unwrap();
        assert_eq!(rows[0]["city"], "Paris, FR");
        assert_eq!(rows[0]["note"], "said \"hi\"");
    }

    #[test]
    fn test_json_to_csv_union_of_keys() {
        let csv = json_to_csv(&json!([{"b": 1, "a": "x"}, {"c": null, "a": true}])).unwrap();
        assert_eq!(csv, "b,a,c\n1,x,\n,true,\n");
    }

    #[test]
    fn test_json_to_csv_from_text() {
        let csv = json_to_csv(&json!("[{\"k\": \"v\"}]")).unwrap();
        assert_eq!(csv, "k\nv\n");
    }

    #[test]
    fn test_json_to_csv_errors() {
        assert!(matches!(
            json_to_csv(&json!("{not json")),
            Err(ToolError::Parse(_))
        ));
        assert!(matches!(
            json_to_csv(&json!([])),
            Err(ToolError::InvalidArguments(_))
        ));
        assert!(matches!(
            json_to_csv(&json!({"a": 1})),
            Err(ToolError::InvalidArguments(_))
        ));
        assert!(matches!(
            json_to_csv(&json!([1, 2])),
            Err(ToolError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_round_trip_reproduces_rows() {
        let original = "id,name,score\n1,Ada,9.5\n2,\"Lovelace, A\",7\n";
        let rows = csv_to_json(original, true).unwrap();
        let back = json_to_csv(&Value::Array(rows)).unwrap();
        assert_eq!(back, original);
    }
}
