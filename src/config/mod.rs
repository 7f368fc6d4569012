pub mod app_config;
pub mod service_account_config;
pub mod sheets_config;
pub mod telemetry_config;
