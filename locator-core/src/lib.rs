pub mod config;
pub mod error;
pub mod location;
pub mod log_entry;
pub mod session;
pub mod state;
pub mod validation;

pub use config::LocatorConfig;
pub use error::LocatorError;
pub use location::{Location, ValidationResult};
pub use log_entry::{LogEntry, LogKind, LogRecord};
pub use state::AustralianState;
