//! Retention-decision engine.
//!
//! Pure logic shared by the worker binary and its tests. Nothing in this
//! crate performs I/O:
//!
//! - [`time`] -- epoch-microsecond conversions and whole-day arithmetic.
//! - [`selection`] -- glob-style job name filters.
//! - [`cadence`] -- yearly/monthly/weekly run classification.
//! - [`extension`] -- new-expiration and day-delta planning.
//! - [`summary`] -- grouped change log rendered for the run report.

pub mod cadence;
pub mod error;
pub mod extension;
pub mod selection;
pub mod summary;
pub mod time;
pub mod types;

pub use cadence::{Cadence, CadenceMatch, CadencePolicy, CadenceRule};
pub use error::CoreError;
pub use extension::ExtensionDecision;
pub use selection::JobFilter;
pub use summary::{ChangeLogEntry, RunFailure, RunSummary};
pub use types::{Job, JobId, Run, Usecs};
