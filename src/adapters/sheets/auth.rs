use error_stack::{report, Report, ResultExt};
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use tracing::instrument;

use crate::{
    config::service_account_config::ServiceAccountConfig,
    ports::record_store::RecordStoreError,
};

use super::{
    error_kind,
    http_client::{HttpClient, HttpsConnector},
};

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Everything the credential is allowed to do: read/write sheets, find files.
pub const SCOPES: [&str; 2] = [SPREADSHEETS_SCOPE, DRIVE_SCOPE];

const SERVICE_ACCOUNT_KEY_TYPE: &str = "service_account";

pub type SheetsAuthenticator = Authenticator<HttpsConnector>;

/// Turns the configured credential into the key format the authenticator
/// expects.
pub fn service_account_key(
    config: Option<&ServiceAccountConfig>,
) -> error_stack::Result<oauth2::ServiceAccountKey, RecordStoreError> {
    let config = config.ok_or_else(|| {
        report!(RecordStoreError::Configuration)
            .attach_printable("No [gcp_service_account] section in the configuration")
    })?;

    let missing = config.missing_fields();
    if !missing.is_empty() {
        return Err(report!(RecordStoreError::Configuration)).attach_printable_lazy(|| {
            format!(
                "Service account fields are blank: {}",
                missing.join(", ")
            )
        });
    }

    if let Some(key_type) = config.key_type.as_deref() {
        if key_type != SERVICE_ACCOUNT_KEY_TYPE {
            return Err(report!(RecordStoreError::Configuration)).attach_printable_lazy(|| {
                format!(
                    "Credential type is '{}', expected '{}'",
                    key_type, SERVICE_ACCOUNT_KEY_TYPE
                )
            });
        }
    }

    let value = serde_json::to_value(config).change_context(RecordStoreError::Configuration)?;
    serde_json::from_value(value)
        .change_context(RecordStoreError::Configuration)
        .attach_printable("Service account credential has an unexpected shape")
}

#[instrument(skip_all, fields(client_email = %key.client_email))]
pub async fn auth(
    key: oauth2::ServiceAccountKey,
    client: HttpClient,
) -> error_stack::Result<SheetsAuthenticator, RecordStoreError> {
    oauth2::ServiceAccountAuthenticator::with_client(key, client)
        .build()
        .await
        .change_context(RecordStoreError::Configuration)
        .attach_printable("Could not create an authenticator, is the private key a valid PEM key?")
}

/// Fetches a token for [`SCOPES`], so a revoked or invalid credential fails
/// here instead of on the first store call.
#[instrument(skip_all)]
pub async fn access_token(
    authenticator: &SheetsAuthenticator,
) -> error_stack::Result<String, RecordStoreError> {
    let token = authenticator
        .token(&SCOPES)
        .await
        .map_err(error_kind::token_report)?;

    token.token().map(str::to_owned).ok_or_else(|| {
        Report::new(RecordStoreError::Authorization)
            .attach_printable("Token endpoint answered without an access token")
    })
}
