//! Command handlers. Each translates parsed arguments into one core service
//! call and reports the outcome; no business logic lives here.

pub mod dump;
pub mod init;
pub mod update;
