pub mod clock;
pub mod patient;
pub mod record;
pub mod sheets;
