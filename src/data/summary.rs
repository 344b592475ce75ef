use std::collections::HashSet;

use super::aggregate::value_counts;
use super::model::{Column, Dataset, Value};

/// Descriptive statistics for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: Column,
    /// Non-null values.
    pub count: usize,
    /// Distinct non-null values.
    pub unique: usize,
    /// Most common value and its frequency; `None` when there is no data.
    pub top: Option<(Value, usize)>,
    /// Smallest and largest value, for integer and date columns only.
    pub min: Option<Value>,
    pub max: Option<Value>,
    /// Arithmetic mean, for integer columns only.
    pub mean: Option<f64>,
}

/// Summarize every source column plus the derived fields.
pub fn summarize(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset
        .schema()
        .display_columns()
        .into_iter()
        .map(|col| summarize_column(dataset, col))
        .collect()
}

pub fn summarize_column(dataset: &Dataset, column: Column) -> ColumnSummary {
    let values: Vec<Value> = dataset
        .records()
        .filter_map(|r| dataset.value(r, &column))
        .filter(|v| !v.is_null())
        .collect();

    let unique = values.iter().collect::<HashSet<_>>().len();
    let top = value_counts(dataset, &column, false)
        .into_iter()
        .next()
        .and_then(|g| g.key.into_iter().next().map(|v| (v, g.count)));

    let numbers: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
    let mean = (!numbers.is_empty() && numbers.len() == values.len())
        .then(|| numbers.iter().sum::<f64>() / numbers.len() as f64);

    let ordinal = || values.iter().filter(|v| v.is_ordinal());

    ColumnSummary {
        count: values.len(),
        unique,
        top,
        min: ordinal().min().cloned(),
        max: ordinal().max().cloned(),
        mean,
        column,
    }
}
