//! Duplicate detection over a list of values.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domains::tools::{ToolContext, ToolDefinition, ToolResult};

/// Parameters for duplicate detection.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FindDuplicatesParams {
    /// Values to check; strings, numbers, booleans or null.
    #[serde(alias = "list")]
    #[schemars(description = "List of values to check for duplicates")]
    pub items: Vec<Value>,
}

/// Duplicate report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub total_items: usize,
    pub unique_items: usize,
    pub duplicate_count: usize,
    /// Text form of each duplicated item mapped to its count.
    pub duplicates: Map<String, Value>,
    /// Each duplicated item once, in first-seen order.
    pub duplicate_values: Vec<Value>,
    pub has_duplicates: bool,
}

fn item_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Hash key for a value: its JSON type plus its serialized form, with object
/// keys sorted so key order does not matter.
fn identity(value: &Value) -> (u8, String) {
    let tag = match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    };
    let text = match value {
        Value::Array(_) | Value::Object(_) => {
            let mut sorted = value.clone();
            sorted.sort_all_objects();
            sorted.to_string()
        }
        scalar => scalar.to_string(),
    };
    (tag, text)
}

/// Count occurrences and report the values seen more than once.
///
/// Items compare by value, so `1` and `"1"` are distinct even though they
/// share the text form `1` in `duplicates`.
pub fn find_duplicates(items: &[Value]) -> DuplicateReport {
    let mut positions: HashMap<(u8, String), usize> = HashMap::with_capacity(items.len());
    let mut counts: Vec<(&Value, usize)> = Vec::new();
    for item in items {
        match positions.entry(identity(item)) {
            Entry::Occupied(slot) => counts[*slot.get()].1 += 1,
            Entry::Vacant(slot) => {
                slot.insert(counts.len());
                counts.push((item, 1));
            }
        }
    }

    let repeated: Vec<(&Value, usize)> = counts
        .iter()
        .filter(|(_, count)| *count > 1)
        .copied()
        .collect();

    let duplicates = repeated
        .iter()
        .map(|(value, count)| (item_key(value), Value::from(*count)))
        .collect();

    DuplicateReport {
        total_items: items.len(),
        unique_items: counts.len(),
        duplicate_count: repeated.len(),
        duplicates,
        duplicate_values: repeated.iter().map(|(value, _)| (*value).clone()).collect(),
        has_duplicates: !repeated.is_empty(),
    }
}

/// Duplicate detection tool.
pub struct FindDuplicatesTool;

#[async_trait::async_trait]
impl ToolDefinition for FindDuplicatesTool {
    type Params = FindDuplicatesParams;
    type Output = DuplicateReport;

    const NAME: &'static str = "find_duplicates";
    const DESCRIPTION: &'static str = "Find duplicate values in a list. \
         Use this to identify repeated entries in data sets or validate uniqueness. \
         Returns the duplicates, their counts, and statistics.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        Ok(find_duplicates(&params.items))
    }
}
