//! JSON wire models for the cluster REST API (`/irisservices/api/v1`).

use retention_core::{Job, JobId, Run, Usecs};
use serde::{Deserialize, Serialize};

/// Copy-run target type of the local snapshot copy.
pub const LOCAL_TARGET_TYPE: &str = "kLocal";

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AccessTokenRequest<'a> {
    pub domain: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Protection jobs and runs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProtectionJobRecord {
    pub id: JobId,
    pub name: String,
}

impl From<ProtectionJobRecord> for Job {
    fn from(record: ProtectionJobRecord) -> Self {
        Job::new(record.id, record.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionRunRecord {
    #[serde(default)]
    pub backup_run: Option<BackupRunRecord>,
    #[serde(default)]
    pub copy_run: Vec<CopyRunRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRunRecord {
    #[serde(default)]
    pub snapshots_deleted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRunRecord {
    pub run_start_time_usecs: Usecs,
    #[serde(default)]
    pub expiry_time_usecs: Option<Usecs>,
    #[serde(default)]
    pub target: Option<CopyTarget>,
}

#[derive(Debug, Deserialize)]
pub struct CopyTarget {
    #[serde(rename = "type")]
    pub target_type: String,
}

impl ProtectionRunRecord {
    /// The local copy run, or the first copy run when none is tagged local.
    fn local_copy(&self) -> Option<&CopyRunRecord> {
        self.copy_run
            .iter()
            .find(|c| {
                c.target
                    .as_ref()
                    .is_some_and(|t| t.target_type == LOCAL_TARGET_TYPE)
            })
            .or_else(|| self.copy_run.first())
    }

    /// Convert to a core [`Run`]. `None` when no copy run carries an
    /// expiration.
    pub fn into_run(self) -> Option<Run> {
        let snapshots_deleted = self
            .backup_run
            .as_ref()
            .is_some_and(|b| b.snapshots_deleted);
        let copy = self.local_copy()?;
        Some(Run {
            start_time_usecs: copy.run_start_time_usecs,
            expiry_time_usecs: copy.expiry_time_usecs?,
            snapshots_deleted,
        })
    }
}

// ---------------------------------------------------------------------------
// Run resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupJobRunsRecord {
    #[serde(default)]
    pub backup_job_runs: Option<BackupJobRuns>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupJobRuns {
    #[serde(default)]
    pub job_description: Option<JobDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    #[serde(default)]
    pub primary_job_uid: Option<RunIdentity>,
}

impl BackupJobRunsRecord {
    pub fn primary_job_uid(&self) -> Option<RunIdentity> {
        self.backup_job_runs
            .as_ref()?
            .job_description
            .as_ref()?
            .primary_job_uid
    }
}

/// Cluster-wide identity of the job that owns a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunIdentity {
    pub cluster_id: i64,
    pub cluster_incarnation_id: i64,
    pub object_id: i64,
}

// ---------------------------------------------------------------------------
// Retention update
// ---------------------------------------------------------------------------

/// A request to extend one run's local-copy retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionUpdate {
    pub identity: RunIdentity,
    pub start_time_usecs: Usecs,
    pub days_to_keep: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProtectionRunsRequest {
    pub job_runs: Vec<JobRunUpdate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRunUpdate {
    pub job_uid: UniversalId,
    pub run_start_time_usecs: Usecs,
    pub copy_run_targets: Vec<CopyRunTargetUpdate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalId {
    pub cluster_id: i64,
    pub cluster_incarnation_id: i64,
    pub id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRunTargetUpdate {
    pub days_to_keep: i64,
    #[serde(rename = "type")]
    pub target_type: &'static str,
}

impl From<&RetentionUpdate> for UpdateProtectionRunsRequest {
    fn from(update: &RetentionUpdate) -> Self {
        Self {
            job_runs: vec![JobRunUpdate {
                job_uid: UniversalId {
                    cluster_id: update.identity.cluster_id,
                    cluster_incarnation_id: update.identity.cluster_incarnation_id,
                    id: update.identity.object_id,
                },
                run_start_time_usecs: update.start_time_usecs,
                copy_run_targets: vec![CopyRunTargetUpdate {
                    days_to_keep: update.days_to_keep,
                    target_type: LOCAL_TARGET_TYPE,
                }],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_record_uses_local_copy() {
        let record: ProtectionRunRecord = serde_json::from_value(serde_json::json!({
            "backupRun": { "snapshotsDeleted": false },
            "copyRun": [
                { "runStartTimeUsecs": 10, "expiryTimeUsecs": 99, "target": { "type": "kArchival" } },
                { "runStartTimeUsecs": 10, "expiryTimeUsecs": 20, "target": { "type": "kLocal" } }
            ]
        }))
        .unwrap();

        let run = record.into_run().unwrap();
        assert_eq!(run.start_time_usecs, 10);
        assert_eq!(run.expiry_time_usecs, 20);
        assert!(!run.snapshots_deleted);
    }

    #[test]
    fn run_record_falls_back_to_first_copy() {
        let record: ProtectionRunRecord = serde_json::from_value(serde_json::json!({
            "backupRun": { "snapshotsDeleted": true },
            "copyRun": [{ "runStartTimeUsecs": 10, "expiryTimeUsecs": 30 }]
        }))
        .unwrap();

        let run = record.into_run().unwrap();
        assert_eq!(run.expiry_time_usecs, 30);
        assert!(run.snapshots_deleted);
    }

    #[test]
    fn run_record_without_expiry_is_unusable() {
        let record: ProtectionRunRecord = serde_json::from_value(serde_json::json!({
            "backupRun": {},
            "copyRun": [{ "runStartTimeUsecs": 10 }]
        }))
        .unwrap();
        assert!(record.into_run().is_none());

        let empty: ProtectionRunRecord =
            serde_json::from_value(serde_json::json!({ "backupRun": {} })).unwrap();
        assert!(empty.into_run().is_none());
    }

    #[test]
    fn primary_job_uid_is_extracted() {
        let record: BackupJobRunsRecord = serde_json::from_value(serde_json::json!({
            "backupJobRuns": { "jobDescription": { "primaryJobUid": {
                "clusterId": 1, "clusterIncarnationId": 2, "objectId": 3
            }}}
        }))
        .unwrap();
        assert_eq!(
            record.primary_job_uid(),
            Some(RunIdentity {
                cluster_id: 1,
                cluster_incarnation_id: 2,
                object_id: 3
            })
        );
    }

    #[test]
    fn update_request_serializes_to_wire_shape() {
        let update = RetentionUpdate {
            identity: RunIdentity {
                cluster_id: 1,
                cluster_incarnation_id: 2,
                object_id: 3,
            },
            start_time_usecs: 1_704_585_600_000_000,
            days_to_keep: 5,
        };
        let json = serde_json::to_value(UpdateProtectionRunsRequest::from(&update)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "jobRuns": [{
                    "jobUid": { "clusterId": 1, "clusterIncarnationId": 2, "id": 3 },
                    "runStartTimeUsecs": 1_704_585_600_000_000i64,
                    "copyRunTargets": [{ "daysToKeep": 5, "type": "kLocal" }]
                }]
            })
        );
    }
}
