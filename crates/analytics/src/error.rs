use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid sweep for '{field}': {reason}")]
    InvalidSweep { field: String, reason: String },
}
