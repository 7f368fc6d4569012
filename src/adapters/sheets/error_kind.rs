use error_stack::Report;
use google_sheets4::{oauth2, Error as Sheets4Error};

use crate::ports::record_store::RecordStoreError;

/// Which step of an append a remote failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    /// Locating the spreadsheet and its first sheet.
    Open,
    /// Reading the header or appending a row.
    ReadWrite,
}

pub fn kind_for_status(status: u16, phase: StorePhase) -> RecordStoreError {
    match (status, phase) {
        (401, _) => RecordStoreError::Authorization,
        (403 | 404, StorePhase::Open) => RecordStoreError::NotFound,
        (403, StorePhase::ReadWrite) => RecordStoreError::Authorization,
        (404, StorePhase::ReadWrite) => RecordStoreError::NotFound,
        _ => RecordStoreError::TransientIo,
    }
}

pub fn classify_sheets_error(error: &Sheets4Error, phase: StorePhase) -> RecordStoreError {
    match error {
        Sheets4Error::Failure(response) => kind_for_status(response.status().as_u16(), phase),
        Sheets4Error::BadRequest(body) => body
            .get("error")
            .and_then(|error| error.get("code"))
            .and_then(serde_json::Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .map(|code| kind_for_status(code, phase))
            .unwrap_or(RecordStoreError::TransientIo),
        Sheets4Error::MissingToken(_) | Sheets4Error::MissingAPIKey => {
            RecordStoreError::Authorization
        }
        _ => RecordStoreError::TransientIo,
    }
}

pub fn sheets_report(error: Sheets4Error, phase: StorePhase) -> Report<RecordStoreError> {
    let kind = classify_sheets_error(&error, phase);
    Report::new(error).change_context(kind)
}

/// Token endpoint failures: transport problems are transient, anything the
/// endpoint answered is a rejected credential.
pub fn classify_token_error(error: &oauth2::Error) -> RecordStoreError {
    match error {
        oauth2::Error::HttpError(_) | oauth2::Error::LowLevelError(_) => {
            RecordStoreError::TransientIo
        }
        _ => RecordStoreError::Authorization,
    }
}

pub fn token_report(error: oauth2::Error) -> Report<RecordStoreError> {
    let kind = classify_token_error(&error);
    Report::new(error).change_context(kind)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_mapping_while_opening() {
        assert_eq!(
            kind_for_status(404, StorePhase::Open),
            RecordStoreError::NotFound
        );
        assert_eq!(
            kind_for_status(403, StorePhase::Open),
            RecordStoreError::NotFound
        );
        assert_eq!(
            kind_for_status(401, StorePhase::Open),
            RecordStoreError::Authorization
        );
        assert_eq!(
            kind_for_status(503, StorePhase::Open),
            RecordStoreError::TransientIo
        );
    }

    #[test]
    fn test_status_mapping_while_writing() {
        assert_eq!(
            kind_for_status(403, StorePhase::ReadWrite),
            RecordStoreError::Authorization
        );
        assert_eq!(
            kind_for_status(429, StorePhase::ReadWrite),
            RecordStoreError::TransientIo
        );
        assert_eq!(
            kind_for_status(500, StorePhase::ReadWrite),
            RecordStoreError::TransientIo
        );
    }

    #[test]
    fn test_bad_request_uses_error_code() {
        let error = Sheets4Error::BadRequest(json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "status": "NOT_FOUND"
            }
        }));
        assert_eq!(
            classify_sheets_error(&error, StorePhase::Open),
            RecordStoreError::NotFound
        );
    }

    #[test]
    fn test_bad_request_without_code_is_transient() {
        let error = Sheets4Error::BadRequest(json!({ "unexpected": true }));
        assert_eq!(
            classify_sheets_error(&error, StorePhase::ReadWrite),
            RecordStoreError::TransientIo
        );
    }

    #[test]
    fn test_missing_token_is_authorization() {
        let error = Sheets4Error::MissingToken("no token".into());
        assert_eq!(
            classify_sheets_error(&error, StorePhase::ReadWrite),
            RecordStoreError::Authorization
        );
    }

    #[test]
    fn test_report_keeps_kind() {
        let report = sheets_report(Sheets4Error::Cancelled, StorePhase::ReadWrite);
        assert_eq!(*report.current_context(), RecordStoreError::TransientIo);
    }
}
