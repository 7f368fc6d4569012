//! Process-local stand-in for the spreadsheet service.
//!
//! Backs `submit --dry-run` and the appender tests. Every call through the
//! port traits is counted so callers can check which remote calls would have
//! been made.

use std::{collections::HashMap, sync::Arc};

use error_stack::report;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::{
    domain::record::CellValue,
    ports::record_store::{ConnectionProvider, RecordStoreError, StoreConnection, StoreTable},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreCalls {
    pub connects: usize,
    pub opens: usize,
    pub header_reads: usize,
    pub appends: usize,
}

#[derive(Debug, Default)]
struct State {
    stores: HashMap<String, Vec<Vec<CellValue>>>,
    calls: StoreCalls,
    connect_failure: Option<RecordStoreError>,
    header_read_failure: Option<RecordStoreError>,
    appends_before_failure: Option<usize>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store, as if a blank spreadsheet had been shared.
    pub async fn create_store(&self, name: &str) {
        self.state
            .write()
            .await
            .stores
            .entry(name.to_string())
            .or_default();
    }

    pub async fn create_store_with_rows(&self, name: &str, rows: Vec<Vec<CellValue>>) {
        self.state
            .write()
            .await
            .stores
            .insert(name.to_string(), rows);
    }

    pub async fn rows(&self, name: &str) -> Option<Vec<Vec<CellValue>>> {
        self.state.read().await.stores.get(name).cloned()
    }

    pub async fn calls(&self) -> StoreCalls {
        self.state.read().await.calls
    }

    /// Makes every following `connect` fail with `kind`.
    pub async fn fail_connections_with(&self, kind: RecordStoreError) {
        self.state.write().await.connect_failure = Some(kind);
    }

    /// Makes every following header read fail with `kind`.
    pub async fn fail_header_reads_with(&self, kind: RecordStoreError) {
        self.state.write().await.header_read_failure = Some(kind);
    }

    /// Lets `successful` more appends through, then fails the rest.
    pub async fn fail_appends_after(&self, successful: usize) {
        self.state.write().await.appends_before_failure = Some(successful);
    }
}

#[async_trait::async_trait]
impl ConnectionProvider for InMemoryStore {
    #[instrument(name = "InMemoryStore::connect", skip(self))]
    async fn connect(&self) -> error_stack::Result<Box<dyn StoreConnection>, RecordStoreError> {
        let mut state = self.state.write().await;
        state.calls.connects += 1;

        if let Some(kind) = state.connect_failure {
            return Err(report!(kind).attach_printable("Simulated connection failure"));
        }

        Ok(Box::new(InMemoryConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct InMemoryConnection {
    state: Arc<RwLock<State>>,
}

#[async_trait::async_trait]
impl StoreConnection for InMemoryConnection {
    async fn open(
        &self,
        store_name: &str,
    ) -> error_stack::Result<Box<dyn StoreTable>, RecordStoreError> {
        let mut state = self.state.write().await;
        state.calls.opens += 1;

        if !state.stores.contains_key(store_name) {
            return Err(report!(RecordStoreError::NotFound)
                .attach_printable(format!("No store named '{}'", store_name)));
        }

        Ok(Box::new(InMemoryTable {
            state: Arc::clone(&self.state),
            name: store_name.to_string(),
        }))
    }
}

struct InMemoryTable {
    state: Arc<RwLock<State>>,
    name: String,
}

#[async_trait::async_trait]
impl StoreTable for InMemoryTable {
    async fn header_row(&self) -> error_stack::Result<Vec<String>, RecordStoreError> {
        let mut state = self.state.write().await;
        state.calls.header_reads += 1;

        if let Some(kind) = state.header_read_failure {
            return Err(report!(kind).attach_printable("Simulated header read failure"));
        }

        let header = state
            .stores
            .get(&self.name)
            .ok_or_else(|| report!(RecordStoreError::NotFound))?
            .first()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .unwrap_or_default();

        Ok(header)
    }

    async fn append_row(
        &self,
        values: &[CellValue],
    ) -> error_stack::Result<(), RecordStoreError> {
        let mut state = self.state.write().await;
        state.calls.appends += 1;

        if let Some(remaining) = state.appends_before_failure {
            if remaining == 0 {
                return Err(report!(RecordStoreError::TransientIo)
                    .attach_printable("Simulated append failure"));
            }
            state.appends_before_failure = Some(remaining - 1);
        }

        state
            .stores
            .get_mut(&self.name)
            .ok_or_else(|| report!(RecordStoreError::NotFound))?
            .push(values.to_vec());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_unknown_store_is_not_found() {
        let store = InMemoryStore::new();
        let connection = store.connect().await.unwrap();
        let report = connection.open("NoSuchSheet").await.err().unwrap();
        assert_eq!(*report.current_context(), RecordStoreError::NotFound);
    }

    #[tokio::test]
    async fn test_header_of_empty_store_is_empty() {
        let store = InMemoryStore::new();
        store.create_store("AMR_Data").await;
        let table = store.connect().await.unwrap().open("AMR_Data").await.unwrap();
        assert!(table.header_row().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_and_read_header() {
        let store = InMemoryStore::new();
        store.create_store("AMR_Data").await;
        let table = store.connect().await.unwrap().open("AMR_Data").await.unwrap();

        table
            .append_row(&[CellValue::from("Age"), CellValue::from("Gender")])
            .await
            .unwrap();
        table
            .append_row(&[CellValue::Integer(65), CellValue::from("Male")])
            .await
            .unwrap();

        assert_eq!(table.header_row().await.unwrap(), vec!["Age", "Gender"]);
        assert_eq!(store.rows("AMR_Data").await.unwrap().len(), 2);
        assert_eq!(
            store.calls().await,
            StoreCalls {
                connects: 1,
                opens: 1,
                header_reads: 1,
                appends: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_append_failure_plan() {
        let store = InMemoryStore::new();
        store.create_store("AMR_Data").await;
        store.fail_appends_after(1).await;
        let table = store.connect().await.unwrap().open("AMR_Data").await.unwrap();

        assert!(table.append_row(&[CellValue::from("Age")]).await.is_ok());
        let report = table.append_row(&[CellValue::Integer(65)]).await.unwrap_err();
        assert_eq!(*report.current_context(), RecordStoreError::TransientIo);
        assert_eq!(store.rows("AMR_Data").await.unwrap().len(), 1);
    }
}
