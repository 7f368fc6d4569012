pub mod record_appender;
pub mod submission;
