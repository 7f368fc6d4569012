use std::{fmt::Debug, sync::Arc};

use error_stack::{report, ResultExt};
use google_sheets4::{
    api::{Scope, Sheet},
    Sheets,
};
use tracing::{debug, instrument};

use crate::{
    domain::record::CellValue,
    ports::record_store::{RecordStoreError, StoreTable},
};

use super::{
    error_kind::{sheets_report, StorePhase},
    http_client::HttpsConnector,
    spreadsheet_read::SpreadsheetRead,
    spreadsheet_write::SpreadsheetWrite,
};

/// Handle on the first sheet of one spreadsheet.
pub struct SpreadsheetManager {
    pub(super) hub: Arc<Sheets<HttpsConnector>>,
    pub spreadsheet_id: String,
    pub sheet_title: String,
    pub value_input_option: String,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SpreadsheetManager {{ spreadsheet_id: {:?}, sheet_title: {:?} }}",
            self.spreadsheet_id, self.sheet_title
        )
    }
}

impl SpreadsheetManager {
    /// Looks up the spreadsheet's sheets and binds to the one with the lowest
    /// index, whatever its title.
    #[instrument(name = "SpreadsheetManager::open_first_sheet", skip(hub, value_input_option))]
    pub async fn open_first_sheet(
        hub: Arc<Sheets<HttpsConnector>>,
        spreadsheet_id: String,
        value_input_option: String,
    ) -> error_stack::Result<Self, RecordStoreError> {
        let response = hub
            .spreadsheets()
            .get(&spreadsheet_id)
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .map_err(|error| sheets_report(error, StorePhase::Open))
            .attach_printable_lazy(|| format!("Failed to fetch spreadsheet {}", spreadsheet_id))?;

        let sheet_title = response
            .1
            .sheets
            .and_then(first_sheet_title)
            .ok_or_else(|| {
                report!(RecordStoreError::NotFound)
                    .attach_printable("Spreadsheet response did not list any sheet")
            })?;

        debug!("Bound to sheet '{}'", sheet_title);

        Ok(SpreadsheetManager {
            hub,
            spreadsheet_id,
            sheet_title,
            value_input_option,
        })
    }
}

/// Title of the sheet with the lowest index.
pub fn first_sheet_title(sheets: Vec<Sheet>) -> Option<String> {
    sheets
        .into_iter()
        .filter_map(|sheet| sheet.properties)
        .filter(|properties| properties.title.is_some())
        .min_by_key(|properties| properties.index.unwrap_or(i32::MAX))
        .and_then(|properties| properties.title)
}

#[async_trait::async_trait]
impl StoreTable for SpreadsheetManager {
    async fn header_row(&self) -> error_stack::Result<Vec<String>, RecordStoreError> {
        self.read_header_row().await
    }

    async fn append_row(
        &self,
        values: &[CellValue],
    ) -> error_stack::Result<(), RecordStoreError> {
        self.append_values(values).await
    }
}

#[cfg(test)]
mod tests {
    use google_sheets4::api::SheetProperties;

    use super::*;

    fn sheet(title: &str, index: i32) -> Sheet {
        Sheet {
            properties: Some(SheetProperties {
                title: Some(title.to_string()),
                index: Some(index),
                ..SheetProperties::default()
            }),
            ..Sheet::default()
        }
    }

    #[test]
    fn test_lowest_index_wins() {
        let sheets = vec![sheet("Archive", 2), sheet("Entries", 0), sheet("Notes", 1)];
        assert_eq!(first_sheet_title(sheets), Some("Entries".to_string()));
    }

    #[test]
    fn test_sheet_without_properties_is_skipped() {
        let sheets = vec![Sheet::default(), sheet("Only", 3)];
        assert_eq!(first_sheet_title(sheets), Some("Only".to_string()));
    }

    #[test]
    fn test_no_sheets() {
        assert_eq!(first_sheet_title(vec![]), None);
    }
}
