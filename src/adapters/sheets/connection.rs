use std::{fmt::Debug, sync::Arc};

use google_sheets4::Sheets;
use tracing::{info, instrument};

use crate::{
    config::{service_account_config::ServiceAccountConfig, sheets_config::SheetsConfig},
    ports::record_store::{ConnectionProvider, RecordStoreError, StoreConnection, StoreTable},
};

use super::{
    auth::{self, SheetsAuthenticator},
    drive_files::DriveFiles,
    http_client::{self, HttpsConnector},
    spreadsheet_manager::SpreadsheetManager,
};

/// Connects to Google Sheets with a service account credential.
#[derive(Clone)]
pub struct SheetsConnectionProvider {
    credential: Option<ServiceAccountConfig>,
    value_input_option: String,
}

impl Debug for SheetsConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConnectionProvider")
            .field(
                "client_email",
                &self.credential.as_ref().map(|c| c.client_email.as_str()),
            )
            .field("value_input_option", &self.value_input_option)
            .finish()
    }
}

impl SheetsConnectionProvider {
    pub fn new(credential: Option<ServiceAccountConfig>, sheets: &SheetsConfig) -> Self {
        Self {
            credential,
            value_input_option: sheets.value_input_option.clone(),
        }
    }
}

#[async_trait::async_trait]
impl ConnectionProvider for SheetsConnectionProvider {
    #[instrument(name = "SheetsConnectionProvider::connect", skip(self))]
    async fn connect(
        &self,
    ) -> error_stack::Result<Box<dyn StoreConnection>, RecordStoreError> {
        let key = auth::service_account_key(self.credential.as_ref())?;
        let client = http_client::http_client();
        let authenticator = auth::auth(key, client.clone()).await?;

        // Rejected credentials surface here rather than on the first read.
        auth::access_token(&authenticator).await?;
        info!("Authorized against Google Sheets");

        let hub = Sheets::new(client, authenticator.clone());

        Ok(Box::new(SheetsConnection {
            hub: Arc::new(hub),
            authenticator,
            drive: DriveFiles::new(),
            value_input_option: self.value_input_option.clone(),
        }))
    }
}

struct SheetsConnection {
    hub: Arc<Sheets<HttpsConnector>>,
    authenticator: SheetsAuthenticator,
    drive: DriveFiles,
    value_input_option: String,
}

#[async_trait::async_trait]
impl StoreConnection for SheetsConnection {
    #[instrument(name = "SheetsConnection::open", skip(self))]
    async fn open(
        &self,
        store_name: &str,
    ) -> error_stack::Result<Box<dyn StoreTable>, RecordStoreError> {
        let token = auth::access_token(&self.authenticator).await?;
        let spreadsheet_id = self.drive.find_spreadsheet_id(&token, store_name).await?;

        let manager = SpreadsheetManager::open_first_sheet(
            Arc::clone(&self.hub),
            spreadsheet_id,
            self.value_input_option.clone(),
        )
        .await?;

        Ok(Box::new(manager))
    }
}
