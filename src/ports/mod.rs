pub mod command_handler;
pub mod record_store;
