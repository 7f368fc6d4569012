use error_stack::ResultExt;
use google_sheets4::api::Scope;
use tracing::instrument;

use crate::{
    domain::sheets::a1_notation::{ToA1Notation, WholeRow},
    ports::record_store::RecordStoreError,
};

use super::{
    error_kind::{sheets_report, StorePhase},
    spreadsheet_manager::SpreadsheetManager,
    value_range_factory::first_row_strings,
};

pub trait SpreadsheetRead {
    fn read_header_row(
        &self,
    ) -> impl std::future::Future<Output = error_stack::Result<Vec<String>, RecordStoreError>> + Send;
}

impl SpreadsheetRead for SpreadsheetManager {
    #[instrument]
    async fn read_header_row(&self) -> error_stack::Result<Vec<String>, RecordStoreError> {
        let range = WholeRow::HEADER.to_a1_notation(Some(self.sheet_title.as_str()));

        let response = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, range.as_ref())
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .map_err(|error| sheets_report(error, StorePhase::ReadWrite))
            .attach_printable_lazy(|| format!("Failed to read range {}", range))?;

        Ok(first_row_strings(response.1.values))
    }
}
