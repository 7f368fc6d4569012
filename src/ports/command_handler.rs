use thiserror::Error;

use crate::domain::patient::PatientRecord;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command execution failed: {details}")]
    ExecutionFailed { details: String },
}

#[derive(Debug, Clone)]
pub enum Command {
    Submit {
        patient: PatientRecord,
        store_name: Option<String>,
        dry_run: bool,
    },
    CheckStore {
        store_name: Option<String>,
    },
    ListFields,
}

#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError>;
}
