use std::{fmt::Debug, sync::Arc};

use error_stack::ResultExt;
use tracing::{error, info, instrument, warn};

use crate::{
    domain::{
        clock::{Clock, SubmissionTimestamp, SystemClock},
        record::Record,
    },
    ports::record_store::{ConnectionProvider, RecordStoreError, StoreTable},
};

/// What a successful append did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendReceipt {
    /// The store was empty and the record's field names became its header.
    pub header_written: bool,
    /// The existing header differs from the record's field names. The row
    /// was still appended under the existing header.
    pub schema_mismatch: bool,
    pub timestamp: SubmissionTimestamp,
}

/// Appends timestamped records to a named store, writing the header row on
/// first use.
pub struct RecordAppender {
    provider: Arc<dyn ConnectionProvider>,
    clock: Arc<dyn Clock>,
}

impl Debug for RecordAppender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordAppender")
            .field("provider", &"<ConnectionProvider>")
            .finish()
    }
}

impl RecordAppender {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self::with_clock(provider, Arc::new(SystemClock))
    }

    pub fn with_clock(provider: Arc<dyn ConnectionProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { provider, clock }
    }

    #[instrument(skip(self, record), fields(field_count = record.len()))]
    pub async fn append(
        &self,
        record: &Record,
        store_name: &str,
    ) -> error_stack::Result<AppendReceipt, RecordStoreError> {
        let result = self.try_append(record, store_name).await;

        match &result {
            Ok(receipt) => info!(
                header_written = receipt.header_written,
                timestamp = %receipt.timestamp,
                "Record appended to '{}'",
                store_name
            ),
            Err(report) if report.current_context().is_connection_failure() => {
                error!("Error connecting to Google Sheets: {:?}", report)
            }
            Err(report) => error!("Error writing to Google Sheets: {:?}", report),
        }

        result
    }

    async fn try_append(
        &self,
        record: &Record,
        store_name: &str,
    ) -> error_stack::Result<AppendReceipt, RecordStoreError> {
        let connection = self.provider.connect().await?;

        let table = connection
            .open(store_name)
            .await
            .attach_printable_lazy(|| format!("Could not open store '{}'", store_name))?;

        let timestamp = self.clock.now();
        let record = record.stamped(&timestamp);

        let header = table.header_row().await?;
        let header_written = header.is_empty();
        let schema_mismatch = !header_written && header != record.field_names();

        if header_written {
            table.append_row(&record.header_cells()).await?;
        } else if schema_mismatch {
            warn!(
                existing_header = ?header,
                record_fields = ?record.field_names(),
                "Store header does not match the record's fields; values are appended in record order"
            );
        }

        append_values(table.as_ref(), &record, header_written).await?;

        Ok(AppendReceipt {
            header_written,
            schema_mismatch,
            timestamp,
        })
    }
}

async fn append_values(
    table: &dyn StoreTable,
    record: &Record,
    header_written: bool,
) -> error_stack::Result<(), RecordStoreError> {
    let result = table.append_row(&record.values()).await;

    if header_written {
        result.attach_printable("The header row was written before the data row failed")
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        adapters::memory::{InMemoryStore, StoreCalls},
        domain::{
            clock::FixedClock,
            patient::PatientRecord,
            record::{CellValue, TIMESTAMP_FIELD},
        },
    };

    const STORE: &str = "AMR_Data";

    fn fixed_clock() -> Arc<FixedClock> {
        let timestamp = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_opt(9, 5, 0))
            .unwrap()
            .into();
        Arc::new(FixedClock(timestamp))
    }

    async fn appender_with_store() -> (RecordAppender, InMemoryStore) {
        let store = InMemoryStore::new();
        store.create_store(STORE).await;
        let appender = RecordAppender::with_clock(Arc::new(store.clone()), fixed_clock());
        (appender, store)
    }

    fn patient(age: i64) -> Record {
        PatientRecord {
            age,
            ..PatientRecord::default()
        }
        .to_record()
        .unwrap()
    }

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    #[tokio::test]
    async fn test_fresh_store_gets_header_and_one_row() {
        let (appender, store) = appender_with_store().await;
        let record = patient(65);

        let receipt = appender.append(&record, STORE).await.unwrap();
        assert!(receipt.header_written);
        assert!(!receipt.schema_mismatch);

        let rows = store.rows(STORE).await.unwrap();
        assert_eq!(rows.len(), 2);

        let mut expected_header = record.header_cells();
        expected_header.push(text(TIMESTAMP_FIELD));
        assert_eq!(rows[0], expected_header);

        let mut expected_values = record.values();
        expected_values.push(text("2024-03-01 09:05:00"));
        assert_eq!(rows[1], expected_values);
    }

    #[tokio::test]
    async fn test_existing_header_gets_one_row_and_stays_unchanged() {
        let (appender, store) = appender_with_store().await;
        let header = vec![text("Patient"), text("Timestamp")];
        store
            .create_store_with_rows(STORE, vec![header.clone()])
            .await;

        let receipt = appender.append(&patient(40), STORE).await.unwrap();
        assert!(!receipt.header_written);
        assert!(receipt.schema_mismatch);

        let rows = store.rows(STORE).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], header);
        assert_eq!(rows[1][0], CellValue::Integer(40));
        assert_eq!(store.calls().await.appends, 1);
    }

    #[tokio::test]
    async fn test_matching_header_is_not_flagged() {
        let (appender, _store) = appender_with_store().await;

        appender.append(&patient(30), STORE).await.unwrap();
        let receipt = appender.append(&patient(31), STORE).await.unwrap();

        assert!(!receipt.header_written);
        assert!(!receipt.schema_mismatch);
    }

    #[tokio::test]
    async fn test_sequential_appends_keep_submission_order() {
        let (appender, store) = appender_with_store().await;
        let ages = [18, 42, 77, 120];

        for age in ages {
            appender.append(&patient(age), STORE).await.unwrap();
        }

        let rows = store.rows(STORE).await.unwrap();
        assert_eq!(rows.len(), ages.len() + 1);
        let written_ages = rows[1..].iter().map(|row| row[0].clone()).collect::<Vec<_>>();
        assert_eq!(
            written_ages,
            ages.iter().map(|age| CellValue::Integer(*age)).collect::<Vec<_>>()
        );
        // header is written exactly once
        assert_eq!(rows.iter().filter(|row| row[0] == text("Age")).count(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_makes_no_store_calls() {
        let (appender, store) = appender_with_store().await;
        store
            .fail_connections_with(RecordStoreError::Authorization)
            .await;

        let report = appender.append(&patient(65), STORE).await.unwrap_err();
        assert_eq!(*report.current_context(), RecordStoreError::Authorization);
        assert_eq!(
            store.calls().await,
            StoreCalls {
                connects: 1,
                opens: 0,
                header_reads: 0,
                appends: 0,
            }
        );
        assert!(store.rows(STORE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_store_fails_without_writing() {
        let (appender, store) = appender_with_store().await;

        let report = appender.append(&patient(65), "NoSuchSheet").await.unwrap_err();
        assert_eq!(*report.current_context(), RecordStoreError::NotFound);

        let calls = store.calls().await;
        assert_eq!(calls.header_reads, 0);
        assert_eq!(calls.appends, 0);
        assert!(store.rows("NoSuchSheet").await.is_none());
        assert!(store.rows(STORE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_header_written_but_data_row_failed_is_a_failure() {
        let (appender, store) = appender_with_store().await;
        store.fail_appends_after(1).await;

        let report = appender.append(&patient(65), STORE).await.unwrap_err();
        assert_eq!(*report.current_context(), RecordStoreError::TransientIo);
        assert!(format!("{:?}", report).contains("header row was written"));

        let rows = store.rows(STORE).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], text("Age"));
    }

    #[tokio::test]
    async fn test_header_read_failure_writes_nothing() {
        let (appender, store) = appender_with_store().await;
        store
            .fail_header_reads_with(RecordStoreError::TransientIo)
            .await;

        let report = appender.append(&patient(65), STORE).await.unwrap_err();
        assert_eq!(*report.current_context(), RecordStoreError::TransientIo);

        let calls = store.calls().await;
        assert_eq!(calls.header_reads, 1);
        assert_eq!(calls.appends, 0);
        assert!(store.rows(STORE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timestamp_uses_column_format() {
        let (appender, store) = appender_with_store().await;

        let receipt = appender.append(&patient(65), STORE).await.unwrap();
        assert_eq!(receipt.timestamp.to_string(), "2024-03-01 09:05:00");

        let rows = store.rows(STORE).await.unwrap();
        assert_eq!(rows[1].last(), Some(&text("2024-03-01 09:05:00")));
    }

    #[tokio::test]
    async fn test_caller_record_is_not_modified() {
        let (appender, _store) = appender_with_store().await;
        let record = patient(65);

        appender.append(&record, STORE).await.unwrap();
        assert!(record.get(TIMESTAMP_FIELD).is_none());
    }
}
