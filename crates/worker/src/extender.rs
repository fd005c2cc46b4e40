//! Retention extension of a single run.
//!
//! [`RetentionExtender::extend`] plans the extension, and only for an
//! actionable plan resolves the run's identity and submits the update.
//! Nothing is sent for runs already within a day of the target.

use retention_core::{ChangeLogEntry, ExtensionDecision, Job, Run};
use retention_platform::{BackupPlatform, RetentionUpdate};

use crate::error::RetentionError;

/// Issues retention updates against a backup platform.
pub struct RetentionExtender<'a> {
    platform: &'a dyn BackupPlatform,
}

impl<'a> RetentionExtender<'a> {
    pub fn new(platform: &'a dyn BackupPlatform) -> Self {
        Self { platform }
    }

    /// Extend `run` of `job` to `retention_days` after its start.
    ///
    /// Returns the change log entry for a submitted update, `None` when the
    /// run needs no extension.
    pub async fn extend(
        &self,
        job: &Job,
        run: &Run,
        retention_days: u32,
    ) -> Result<Option<ChangeLogEntry>, RetentionError> {
        let Some(decision) = ExtensionDecision::plan(run, retention_days)? else {
            tracing::debug!(
                job_id = job.id,
                start_time_usecs = run.start_time_usecs,
                retention_days,
                "Run already retained long enough",
            );
            return Ok(None);
        };

        let identity = self
            .platform
            .resolve_run(job, decision.start_time_usecs)
            .await?;

        self.platform
            .update_retention(&RetentionUpdate {
                identity,
                start_time_usecs: decision.start_time_usecs,
                days_to_keep: decision.delta_days,
            })
            .await?;

        tracing::info!(
            job_id = job.id,
            job_name = %job.name,
            start_time_usecs = decision.start_time_usecs,
            days_to_keep = decision.delta_days,
            "Extended run retention",
        );

        Ok(Some(ChangeLogEntry {
            job_name: job.name.clone(),
            start_time_usecs: decision.start_time_usecs,
            new_expiry_usecs: decision.new_expiry_usecs,
        }))
    }
}
