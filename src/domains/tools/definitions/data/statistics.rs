//! Descriptive statistics over a list of numbers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolResult};

/// Parameters for statistics calculation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CalculateStatisticsParams {
    /// Numbers to analyze.
    #[schemars(description = "List of numbers to analyze")]
    pub numbers: Vec<f64>,
}

/// Summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

/// Compute count, sum, mean, median, min, max and range.
pub fn calculate_statistics(numbers: &[f64]) -> ToolResult<Statistics> {
    if numbers.is_empty() {
        return Err(ToolError::invalid_arguments("Empty list provided"));
    }
    if numbers.iter().any(|n| !n.is_finite()) {
        return Err(ToolError::invalid_arguments("Numbers must be finite"));
    }

    let mut sorted = numbers.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let sum: f64 = sorted.iter().sum();
    let min = sorted[0];
    let max = sorted[count - 1];
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    Ok(Statistics {
        count,
        sum,
        mean: sum / count as f64,
        median,
        min,
        max,
        range: max - min,
    })
}

/// Statistics tool.
pub struct CalculateStatisticsTool;

#[async_trait::async_trait]
impl ToolDefinition for CalculateStatisticsTool {
    type Params = CalculateStatisticsParams;
    type Output = Statistics;

    const NAME: &'static str = "calculate_statistics";
    const DESCRIPTION: &'static str = "Calculate basic statistics for a list of numbers: \
         count, sum, mean, median, min, max, and range. \
         Use this for quick data analysis and numerical summaries.";

    async fn execute(params: Self::Params, _ctx: &ToolContext) -> ToolResult<Self::Output> {
        calculate_statistics(&params.numbers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_count() {
        let stats = calculate_statistics(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.sum, 10.0);
        assert_eq!(stats.range, 3.0);
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn test_odd_count_unsorted() {
        let stats = calculate_statistics(&[9.0, -1.0, 4.0]).unwrap();
        assert_eq!(stats.median, 4.0);
        assert_eq!(stats.min, -1.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(
            calculate_statistics(&[]),
            Err(ToolError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_integers_deserialize_as_floats() {
        let params: CalculateStatisticsParams =
            serde_json::from_str(r#"{"numbers": [1, 2.5, 3]}"#).unwrap();
        assert_eq!(params.numbers, vec![1.0, 2.5, 3.0]);
    }
}
