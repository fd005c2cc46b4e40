/// Protection job identifiers are integers on the platform.
pub type JobId = i64;

/// All platform timestamps are microseconds since the Unix epoch.
pub type Usecs = i64;

/// A protection job as listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub name: String,
}

impl Job {
    pub fn new(id: JobId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One backup run of a job.
///
/// The owning job id together with `start_time_usecs` is what the platform
/// uses to resolve the run's cluster/object identity for updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub start_time_usecs: Usecs,
    pub expiry_time_usecs: Usecs,
    /// Set once the run's snapshots have been purged.
    pub snapshots_deleted: bool,
}
