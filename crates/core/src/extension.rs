//! Extend-only retention planning.
//!
//! Given a run and a retention target, [`ExtensionDecision::plan`] computes
//! the new expiration and the whole-day increment to request. The increment
//! must exceed [`MIN_EXTENSION_DAYS`]; anything smaller (including every
//! reduction) is a no-op, which also keeps a second invocation from
//! re-extending a run that was already updated.

use crate::error::CoreError;
use crate::time;
use crate::types::{Run, Usecs};

/// Extensions of this many days or fewer are not submitted.
pub const MIN_EXTENSION_DAYS: i64 = 1;

/// An actionable retention extension for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionDecision {
    pub start_time_usecs: Usecs,
    pub current_expiry_usecs: Usecs,
    pub retention_days: u32,
    pub new_expiry_usecs: Usecs,
    /// Days to add to the current expiration (`daysToKeep` on the wire).
    pub delta_days: i64,
}

impl ExtensionDecision {
    /// Plan an extension of `run` to `retention_days` after its start.
    ///
    /// Returns `Ok(None)` when the new expiration is not later than the
    /// current one by more than [`MIN_EXTENSION_DAYS`]. A negative current
    /// expiration is [`CoreError::MalformedTimestamp`].
    pub fn plan(run: &Run, retention_days: u32) -> Result<Option<Self>, CoreError> {
        if run.expiry_time_usecs < 0 {
            return Err(CoreError::MalformedTimestamp(run.expiry_time_usecs));
        }
        let new_expiry_usecs = time::add_days(run.start_time_usecs, retention_days)?;
        let delta_days = time::day_delta(new_expiry_usecs, run.expiry_time_usecs)?;

        if delta_days <= MIN_EXTENSION_DAYS {
            return Ok(None);
        }

        Ok(Some(Self {
            start_time_usecs: run.start_time_usecs,
            current_expiry_usecs: run.expiry_time_usecs,
            retention_days,
            new_expiry_usecs,
            delta_days,
        }))
    }

    /// The run's expiration once the platform has applied `delta_days`.
    pub fn applied_expiry_usecs(&self) -> Usecs {
        self.current_expiry_usecs + self.delta_days * time::DAY_USECS
    }
}
