use crate::types::Usecs;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Malformed timestamp: {0} usecs")]
    MalformedTimestamp(Usecs),

    #[error("Invalid job filter '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}
