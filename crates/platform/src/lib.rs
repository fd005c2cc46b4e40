//! Backup platform REST client.
//!
//! Provides the [`BackupPlatform`] trait the scan loop is written against,
//! the reqwest-backed [`ClusterApi`] implementing it, the JSON wire
//! models, and the backoff policy used for read-only calls.

pub mod client;
pub mod models;
pub mod retry;

use async_trait::async_trait;
use retention_core::{Job, Run, Usecs};

pub use client::{ClusterApi, ClusterSettings, PlatformError};
pub use models::{RetentionUpdate, RunIdentity};
pub use retry::RetryConfig;

/// Operations the retention scan needs from the backup platform.
///
/// Calls are issued one at a time; implementations need not support
/// concurrent use beyond `Sync` access from a single task.
#[async_trait]
pub trait BackupPlatform: Send + Sync {
    /// All protection jobs, in platform order.
    async fn list_jobs(&self) -> Result<Vec<Job>, PlatformError>;

    /// Restorable runs of `job`, in platform order.
    async fn list_runs(&self, job: &Job) -> Result<Vec<Run>, PlatformError>;

    /// Resolve the cluster/object identity of the run of `job` that started
    /// at `start_time_usecs`. Exactly one match is required.
    async fn resolve_run(
        &self,
        job: &Job,
        start_time_usecs: Usecs,
    ) -> Result<RunIdentity, PlatformError>;

    /// Extend a run's local-copy retention by `update.days_to_keep` days.
    async fn update_retention(&self, update: &RetentionUpdate) -> Result<(), PlatformError>;
}
