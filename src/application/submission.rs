use tracing::{instrument, warn};

use crate::{
    domain::patient::PatientRecord,
    ports::record_store::RecordStoreError,
};

use super::record_appender::{AppendReceipt, RecordAppender};

pub const SUCCESS_MESSAGE: &str = "✅ Data successfully submitted to Google Sheets!";
pub const FAILURE_MESSAGE: &str =
    "❌ Failed to submit data. Please check your Google Sheets configuration.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFeedback {
    Submitted {
        message: &'static str,
        receipt: AppendReceipt,
    },
    Failed {
        message: &'static str,
        detail: String,
        /// `None` when the form was rejected before reaching the store.
        kind: Option<RecordStoreError>,
    },
}

impl SubmissionFeedback {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionFeedback::Submitted { .. })
    }
}

impl std::fmt::Display for SubmissionFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionFeedback::Submitted { message, receipt } => {
                write!(f, "{}\nTimestamp: {}", message, receipt.timestamp)?;
                if receipt.schema_mismatch {
                    write!(
                        f,
                        "\nWarning: the sheet's header does not match the form fields"
                    )?;
                }
                Ok(())
            }
            SubmissionFeedback::Failed {
                message, detail, ..
            } => write!(f, "{}\n{}", message, detail),
        }
    }
}

/// One form on screen: submits patients to the configured store and remembers
/// whether a submission went through.
#[derive(Debug)]
pub struct FormSession {
    appender: RecordAppender,
    store_name: String,
    submitted: bool,
}

impl FormSession {
    pub fn new(appender: RecordAppender, store_name: impl Into<String>) -> Self {
        Self {
            appender,
            store_name: store_name.into(),
            submitted: false,
        }
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[instrument(name = "Submitting data to Google Sheets", skip_all, fields(store = %self.store_name))]
    pub async fn submit(&mut self, patient: &PatientRecord) -> SubmissionFeedback {
        let record = match patient.to_record() {
            Ok(record) => record,
            Err(error) => {
                warn!("Form rejected: {}", error);
                return SubmissionFeedback::Failed {
                    message: FAILURE_MESSAGE,
                    detail: format!("Invalid form input: {}", error),
                    kind: None,
                };
            }
        };

        match self.appender.append(&record, &self.store_name).await {
            Ok(receipt) => {
                self.submitted = true;
                SubmissionFeedback::Submitted {
                    message: SUCCESS_MESSAGE,
                    receipt,
                }
            }
            Err(report) => {
                let kind = *report.current_context();
                let detail = if kind.is_connection_failure() {
                    format!("Error connecting to Google Sheets: {}", report)
                } else {
                    format!("Error writing to Google Sheets: {}", report)
                };

                SubmissionFeedback::Failed {
                    message: FAILURE_MESSAGE,
                    detail,
                    kind: Some(kind),
                }
            }
        }
    }
}
