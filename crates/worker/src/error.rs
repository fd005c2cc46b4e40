//! Worker error type and user-facing terminal messages.

use retention_core::CoreError;
use retention_platform::PlatformError;

/// Printed, logged and mailed when no job name matches the filters.
pub const NO_MATCHING_JOBS_MESSAGE: &str = "No Jobs Match Search Criteria";

/// Printed and logged when a mail server is given without both addresses.
pub const MAIL_ADDRESSES_REQUIRED_MESSAGE: &str = "sendto and sendfrom parameters are required!";

#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    /// Invalid or incomplete configuration; nothing was contacted.
    #[error("{0}")]
    Configuration(String),

    #[error("{}", NO_MATCHING_JOBS_MESSAGE)]
    NoMatchingJobs,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("Run log error: {0}")]
    Io(#[from] std::io::Error),
}
