pub mod config;
pub mod console;
pub mod context;
pub mod errors;
pub mod redact;
