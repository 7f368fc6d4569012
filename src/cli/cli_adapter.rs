use std::sync::Arc;

use amr_data_entry::{
    adapters::{memory::InMemoryStore, sheets::connection::SheetsConnectionProvider},
    application::{
        record_appender::RecordAppender,
        submission::{FormSession, SubmissionFeedback},
    },
    config::app_config::AppConfig,
    domain::{
        patient::{form_schema, PatientRecord},
        record::CellValue,
    },
    ports::{
        command_handler::{Command, CommandError, CommandHandler},
        record_store::ConnectionProvider,
    },
};
use error_stack::report;
use tracing::{error, info, instrument};

pub struct CliAdapter {
    config: AppConfig,
    provider: Arc<dyn ConnectionProvider>,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("store_name", &self.config.sheets.store_name)
            .field("provider", &"<ConnectionProvider>")
            .finish()
    }
}

impl CliAdapter {
    pub fn new(config: AppConfig) -> Self {
        let provider = Arc::new(SheetsConnectionProvider::new(
            config.gcp_service_account.clone(),
            &config.sheets,
        ));
        Self::with_provider(config, provider)
    }

    pub fn with_provider(config: AppConfig, provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { config, provider }
    }

    #[instrument]
    pub async fn run(&self, command: Command) -> Result<(), Box<dyn std::error::Error>> {
        match self.handle(command).await {
            Ok(result) => {
                info!("{}", result);
                Ok(())
            }
            Err(report) => {
                error!("Command failed: {:?}", report);
                Err(format!("Command failed: {}", report).into())
            }
        }
    }

    fn store_name(&self, store_name: Option<String>) -> String {
        store_name.unwrap_or_else(|| self.config.sheets.store_name.clone())
    }

    async fn submit(
        &self,
        patient: PatientRecord,
        store_name: String,
        dry_run: bool,
    ) -> error_stack::Result<String, CommandError> {
        if dry_run {
            return self.submit_dry_run(patient, store_name).await;
        }

        let appender = RecordAppender::new(Arc::clone(&self.provider));
        let mut session = FormSession::new(appender, store_name);
        feedback_result(session.submit(&patient).await)
    }

    async fn submit_dry_run(
        &self,
        patient: PatientRecord,
        store_name: String,
    ) -> error_stack::Result<String, CommandError> {
        let store = InMemoryStore::new();
        store.create_store(&store_name).await;

        let appender = RecordAppender::new(Arc::new(store.clone()));
        let mut session = FormSession::new(appender, store_name.as_str());
        let mut output = feedback_result(session.submit(&patient).await)?;

        output.push_str(&format!("\n\nDry run, '{}' would contain:", store_name));
        for row in store.rows(&store_name).await.unwrap_or_default() {
            output.push('\n');
            output.push_str(&format_row(&row));
        }

        Ok(output)
    }

    async fn check_store(&self, store_name: String) -> error_stack::Result<String, CommandError> {
        let failed = |step: &str| CommandError::ExecutionFailed {
            details: format!("{} '{}'", step, store_name),
        };

        let connection = self
            .provider
            .connect()
            .await
            .map_err(|report| report.change_context(failed("Could not connect for")))?;
        let table = connection
            .open(&store_name)
            .await
            .map_err(|report| report.change_context(failed("Could not open")))?;
        let header = table
            .header_row()
            .await
            .map_err(|report| report.change_context(failed("Could not read the header of")))?;

        if header.is_empty() {
            Ok(format!("✅ '{}' is reachable and empty", store_name))
        } else {
            Ok(format!(
                "✅ '{}' is reachable, header: {}",
                store_name,
                header.join(" | ")
            ))
        }
    }
}

fn feedback_result(feedback: SubmissionFeedback) -> error_stack::Result<String, CommandError> {
    if feedback.is_success() {
        Ok(feedback.to_string())
    } else {
        Err(report!(CommandError::ExecutionFailed {
            details: feedback.to_string(),
        }))
    }
}

fn format_row(row: &[CellValue]) -> String {
    row.iter()
        .map(CellValue::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

fn format_fields() -> String {
    let mut output = "Form fields:".to_string();
    for field in form_schema() {
        output.push_str(&format!(
            "\n{:<18} {:<34} default: {:<10} allowed: {}",
            field.column,
            field.label,
            field.default,
            field.allowed.join(", ")
        ));
    }
    output
}

#[async_trait::async_trait]
impl CommandHandler for CliAdapter {
    #[instrument]
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError> {
        match command {
            Command::Submit {
                patient,
                store_name,
                dry_run,
            } => {
                let store_name = self.store_name(store_name);
                self.submit(patient, store_name, dry_run).await
            }
            Command::CheckStore { store_name } => {
                let store_name = self.store_name(store_name);
                self.check_store(store_name).await
            }
            Command::ListFields => Ok(format_fields()),
        }
    }
}
