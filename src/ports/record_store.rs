use thiserror::Error;

use crate::domain::record::CellValue;

/// Kinds of failure a store interaction can end in.
///
/// Used as the `error_stack` context so callers can tell a bad credential from
/// a flaky network via `Report::current_context`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStoreError {
    #[error("Credential configuration is missing or malformed")]
    Configuration,
    #[error("The remote service rejected the credential")]
    Authorization,
    #[error("The store could not be opened (missing or not shared)")]
    NotFound,
    #[error("The remote service failed while reading or appending")]
    TransientIo,
}

impl RecordStoreError {
    /// Whether the failure happened before any store was reached.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            RecordStoreError::Configuration | RecordStoreError::Authorization
        )
    }
}

#[async_trait::async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Produces an authorized handle. Called once per append.
    async fn connect(
        &self,
    ) -> error_stack::Result<Box<dyn StoreConnection>, RecordStoreError>;
}

#[async_trait::async_trait]
pub trait StoreConnection: Send + Sync {
    /// Opens the first sheet of the store called `store_name`.
    async fn open(
        &self,
        store_name: &str,
    ) -> error_stack::Result<Box<dyn StoreTable>, RecordStoreError>;
}

#[async_trait::async_trait]
pub trait StoreTable: Send + Sync {
    /// Cells of the first row, empty when nothing was ever written.
    async fn header_row(&self) -> error_stack::Result<Vec<String>, RecordStoreError>;

    /// Appends `values` as a new trailing row.
    async fn append_row(&self, values: &[CellValue])
        -> error_stack::Result<(), RecordStoreError>;
}
