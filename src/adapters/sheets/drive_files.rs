use error_stack::{report, Report, ResultExt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::ports::record_store::RecordStoreError;

use super::error_kind::{kind_for_status, StorePhase};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

/// Escapes a value for use inside a single-quoted Drive query string.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn spreadsheet_query(name: &str) -> String {
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escape_query_value(name),
        SPREADSHEET_MIME_TYPE
    )
}

/// Resolves spreadsheet titles to ids through the Drive files listing.
#[derive(Debug, Clone, Default)]
pub struct DriveFiles {
    client: Client,
}

impl DriveFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the first spreadsheet titled `name` visible to the credential.
    #[instrument(skip(self, access_token))]
    pub async fn find_spreadsheet_id(
        &self,
        access_token: &str,
        name: &str,
    ) -> error_stack::Result<String, RecordStoreError> {
        let query = spreadsheet_query(name);
        let response = self
            .client
            .get(DRIVE_FILES_URL)
            .bearer_auth(access_token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("includeItemsFromAllDrives", "true"),
                ("supportsAllDrives", "true"),
                ("pageSize", "10"),
            ])
            .send()
            .await
            .change_context(RecordStoreError::TransientIo)
            .attach_printable("Drive files listing request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_report(status, response.text().await));
        }

        let list: DriveFileList = response
            .json()
            .await
            .change_context(RecordStoreError::TransientIo)
            .attach_printable("Drive files listing returned an unexpected body")?;

        debug!(matches = list.files.len(), "Drive lookup for '{}'", name);

        pick_first(list, name)
    }
}

/// Report for a non-success listing, keeping the body or the reason it could
/// not be read.
fn status_report<E: std::fmt::Display>(
    status: StatusCode,
    body: Result<String, E>,
) -> Report<RecordStoreError> {
    let report = report!(kind_for_status(status.as_u16(), StorePhase::Open))
        .attach_printable(format!("Drive files listing answered {}", status));

    match body {
        Ok(body) => report.attach_printable(format!("Response body: {}", body)),
        Err(error) => {
            report.attach_printable(format!("Response body could not be read: {}", error))
        }
    }
}

fn pick_first(list: DriveFileList, name: &str) -> error_stack::Result<String, RecordStoreError> {
    list.files
        .into_iter()
        .next()
        .map(|file| {
            debug!("Using spreadsheet '{}' ({})", file.name, file.id);
            file.id
        })
        .ok_or_else(|| {
            report!(RecordStoreError::NotFound).attach_printable(format!(
                "No spreadsheet named '{}' is shared with the service account",
                name
            ))
        })
}
