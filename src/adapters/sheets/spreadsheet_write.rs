use error_stack::ResultExt;
use google_sheets4::api::{Scope, ValueRange};
use tracing::instrument;

use crate::{
    domain::{
        record::CellValue,
        sheets::a1_notation::{TableAnchor, ToA1Notation},
    },
    ports::record_store::RecordStoreError,
};

use super::{
    error_kind::{sheets_report, StorePhase},
    spreadsheet_manager::SpreadsheetManager,
    value_range_factory::ValueRangeFactory,
};

const INSERT_ROWS: &str = "INSERT_ROWS";

pub trait SpreadsheetWrite {
    fn append_values(
        &self,
        values: &[CellValue],
    ) -> impl std::future::Future<Output = error_stack::Result<(), RecordStoreError>> + Send;
}

impl SpreadsheetWrite for SpreadsheetManager {
    #[instrument(skip(values), fields(cells = values.len()))]
    async fn append_values(&self, values: &[CellValue]) -> error_stack::Result<(), RecordStoreError> {
        let range = TableAnchor.to_a1_notation(Some(self.sheet_title.as_str()));

        self.hub
            .spreadsheets()
            .values_append(
                ValueRange::from_row(values),
                &self.spreadsheet_id,
                range.as_ref(),
            )
            .value_input_option(&self.value_input_option)
            .insert_data_option(INSERT_ROWS)
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .map(|_| ())
            .map_err(|error| sheets_report(error, StorePhase::ReadWrite))
            .attach_printable_lazy(|| format!("Failed to append a row after {}", range))
    }
}
