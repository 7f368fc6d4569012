use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(pub String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub trait ToA1Notation {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation;
}

/// Quotes a sheet title for use in a range, doubling embedded single quotes.
pub fn quote_sheet_title(sheet_title: &str) -> String {
    format!("'{}'", sheet_title.replace('\'', "''"))
}

/// A whole row of a sheet, e.g. `'Sheet1'!1:1`. Rows are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WholeRow(pub u32);

impl WholeRow {
    pub const HEADER: WholeRow = WholeRow(1);
}

impl ToA1Notation for WholeRow {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        match sheet_name {
            Some(sheet_name) => A1Notation(format!(
                "{}!{}:{}",
                quote_sheet_title(sheet_name),
                self.0,
                self.0
            )),
            None => A1Notation(format!("{}:{}", self.0, self.0)),
        }
    }
}

/// Top-left cell of a sheet, used as the table anchor for appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableAnchor;

impl ToA1Notation for TableAnchor {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        match sheet_name {
            Some(sheet_name) => A1Notation(format!("{}!A1", quote_sheet_title(sheet_name))),
            None => A1Notation("A1".to_string()),
        }
    }
}
