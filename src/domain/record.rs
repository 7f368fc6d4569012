use std::fmt::Formatter;

use thiserror::Error;

use super::clock::SubmissionTimestamp;

/// Name of the column the appender stamps on every record.
pub const TIMESTAMP_FIELD: &str = "Timestamp";

/// A single cell as it is sent to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Integer(i64),
    Text(String),
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Integer(value) => write!(f, "{}", value),
            CellValue::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&CellValue> for serde_json::Value {
    fn from(cell: &CellValue) -> Self {
        match cell {
            CellValue::Integer(value) => serde_json::Value::Number((*value).into()),
            CellValue::Text(value) => serde_json::Value::String(value.clone()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("A record needs at least one field")]
    Empty,
    #[error("Field name at position {0} is blank")]
    BlankFieldName(usize),
}

/// One submission: field names mapped to values, kept in insertion order.
///
/// Inserting a name twice keeps the first position and the last value, so the
/// column order of a record is always the order its names first appeared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn from_fields<K, V, I>(fields: I) -> Result<Self, RecordError>
    where
        K: Into<String>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Record { fields: Vec::new() };
        for (position, (name, value)) in fields.into_iter().enumerate() {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(RecordError::BlankFieldName(position));
            }
            record.insert(name, value.into());
        }

        if record.fields.is_empty() {
            return Err(RecordError::Empty);
        }

        Ok(record)
    }

    fn insert(&mut self, name: String, value: CellValue) {
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns a copy of the record carrying `Timestamp` as its submission time.
    pub fn stamped(&self, timestamp: &SubmissionTimestamp) -> Record {
        let mut stamped = self.clone();
        stamped.insert(TIMESTAMP_FIELD.to_owned(), timestamp.to_string().into());
        stamped
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn values(&self) -> Vec<CellValue> {
        self.fields.iter().map(|(_, value)| value.clone()).collect()
    }

    /// Header cells for this record, in the same order as [`Record::values`].
    pub fn header_cells(&self) -> Vec<CellValue> {
        self.fields
            .iter()
            .map(|(name, _)| CellValue::Text(name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
