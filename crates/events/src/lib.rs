//! Run reporting outside the process.
//!
//! - [`delivery`] -- the [`SummaryNotifier`] seam and its SMTP
//!   implementation [`EmailDelivery`].
//! - [`run_log`] -- the append-only [`RunLog`] mirrored to stdout.

pub mod delivery;
pub mod run_log;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use delivery::SummaryNotifier;
pub use run_log::RunLog;
