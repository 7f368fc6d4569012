use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::domain::record::CellValue;

pub trait ValueRangeFactory {
    fn from_row(cells: &[CellValue]) -> Self;
}

fn wrap_value(cell: &CellValue) -> Value {
    Value::from(cell)
}

impl ValueRangeFactory for ValueRange {
    fn from_row(cells: &[CellValue]) -> Self {
        ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(vec![cells.iter().map(wrap_value).collect()]),
        }
    }
}

/// Flattens the first returned row into display strings.
pub fn first_row_strings(values: Option<Vec<Vec<Value>>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|value| match value {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect()
}
