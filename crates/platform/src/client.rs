//! REST client for the cluster's `/irisservices/api/v1` endpoints.
//!
//! [`ClusterApi::connect`] authenticates once and keeps the access token
//! for every later call. Read-only calls are retried on transient failures
//! (see [`crate::retry`]); the retention update is sent once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use retention_core::{Job, JobId, Run, Usecs};
use serde::de::DeserializeOwned;

use crate::models::{
    AccessTokenRequest, AccessTokenResponse, BackupJobRunsRecord, ProtectionJobRecord,
    ProtectionRunRecord, RetentionUpdate, RunIdentity, UpdateProtectionRunsRequest,
};
use crate::retry::{self, RetryConfig};
use crate::BackupPlatform;

/// Path prefix shared by every endpoint.
const API_ROOT: &str = "/irisservices/api/v1";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Token type used when the cluster omits one.
const DEFAULT_TOKEN_TYPE: &str = "Bearer";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from the cluster REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The HTTP request itself failed (network, DNS, TLS, decode, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The cluster returned a non-2xx status code.
    #[error("Cluster API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The cluster accepted the credentials but returned no usable token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The run to update could not be resolved to exactly one job identity.
    #[error("Run starting at {start_time_usecs} of job {job_id} resolved to {matches} identities, expected 1")]
    RunResolution {
        job_id: JobId,
        start_time_usecs: Usecs,
        matches: usize,
    },
}

impl PlatformError {
    /// Whether replaying the request may succeed: connection failures,
    /// timeouts, throttling and server errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Authentication(_) | Self::RunResolution { .. } => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Connection parameters for one cluster.
#[derive(Clone)]
pub struct ClusterSettings {
    /// Hostname/VIP, or a full base URL including the scheme.
    pub server: String,
    pub username: String,
    /// Authentication domain (`local` for cluster-local users).
    pub domain: String,
    pub password: String,
    /// Verify the cluster's TLS certificate. Clusters commonly present
    /// self-signed certificates, so this is off unless requested.
    pub verify_certs: bool,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

impl std::fmt::Debug for ClusterSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterSettings")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("password", &"<redacted>")
            .field("verify_certs", &self.verify_certs)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ClusterSettings {
    /// Base URL: `server` as given when it has a scheme, `https://server`
    /// otherwise. A trailing slash is dropped.
    pub fn base_url(&self) -> String {
        let server = self.server.trim_end_matches('/');
        if server.contains("://") {
            server.to_string()
        } else {
            format!("https://{server}")
        }
    }
}

// ---------------------------------------------------------------------------
// ClusterApi
// ---------------------------------------------------------------------------

/// Authenticated HTTP client for a single cluster.
pub struct ClusterApi {
    client: reqwest::Client,
    base_url: String,
    authorization: String,
    retry: RetryConfig,
}

impl std::fmt::Debug for ClusterApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterApi")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ClusterApi {
    /// Build the HTTP client and obtain an access token.
    pub async fn connect(settings: &ClusterSettings) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .danger_accept_invalid_certs(!settings.verify_certs)
            .build()?;
        let base_url = settings.base_url();

        let body = AccessTokenRequest {
            domain: &settings.domain,
            username: &settings.username,
            password: &settings.password,
        };

        let response = client
            .post(format!("{base_url}{API_ROOT}/public/accessTokens"))
            .json(&body)
            .send()
            .await?;
        let token: AccessTokenResponse = Self::parse_response(response).await?;

        if token.access_token.is_empty() {
            return Err(PlatformError::Authentication(
                "cluster returned an empty access token".into(),
            ));
        }

        let token_type = token
            .token_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());

        tracing::info!(
            server = %base_url,
            username = %settings.username,
            domain = %settings.domain,
            "Authenticated to cluster",
        );

        Ok(Self {
            client,
            base_url,
            authorization: format!("{token_type} {}", token.access_token),
            retry: settings.retry.clone(),
        })
    }

    /// URL of a public (documented) endpoint.
    fn public_url(&self, path: &str) -> String {
        format!("{}{API_ROOT}/public/{path}", self.base_url)
    }

    /// URL of an internal endpoint.
    fn internal_url(&self, path: &str) -> String {
        format!("{}{API_ROOT}/{path}", self.base_url)
    }

    /// Authenticated GET with retry. A `null` body decodes as `T::default()`.
    async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T, PlatformError>
    where
        T: DeserializeOwned + Default,
    {
        retry::with_retry(&self.retry, url, move || async move {
            let response = self
                .client
                .get(url)
                .header(AUTHORIZATION, &self.authorization)
                .query(query)
                .send()
                .await?;
            let body: Option<T> = Self::parse_response(response).await?;
            Ok(body.unwrap_or_default())
        })
        .await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`PlatformError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, PlatformError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PlatformError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PlatformError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl BackupPlatform for ClusterApi {
    async fn list_jobs(&self) -> Result<Vec<Job>, PlatformError> {
        let records: Vec<ProtectionJobRecord> =
            self.get_json(&self.public_url("protectionJobs"), &[]).await?;
        Ok(records.into_iter().map(Job::from).collect())
    }

    async fn list_runs(&self, job: &Job) -> Result<Vec<Run>, PlatformError> {
        let records: Vec<ProtectionRunRecord> = self
            .get_json(
                &self.public_url("protectionRuns"),
                &[
                    ("jobId", job.id.to_string()),
                    ("excludeNonRestoreableRuns", "true".to_string()),
                ],
            )
            .await?;

        let total = records.len();
        let runs: Vec<Run> = records
            .into_iter()
            .filter_map(ProtectionRunRecord::into_run)
            .collect();

        if runs.len() < total {
            tracing::warn!(
                job_id = job.id,
                job_name = %job.name,
                skipped = total - runs.len(),
                "Skipped run records without a usable copy run",
            );
        }

        Ok(runs)
    }

    async fn resolve_run(
        &self,
        job: &Job,
        start_time_usecs: Usecs,
    ) -> Result<RunIdentity, PlatformError> {
        let records: Vec<BackupJobRunsRecord> = self
            .get_json(
                &self.internal_url("backupjobruns"),
                &[
                    ("allUnderHierarchy", "true".to_string()),
                    ("exactMatchStartTimeUsecs", start_time_usecs.to_string()),
                    ("id", job.id.to_string()),
                ],
            )
            .await?;

        let identities: Vec<RunIdentity> = records
            .iter()
            .filter_map(BackupJobRunsRecord::primary_job_uid)
            .collect();

        match identities.as_slice() {
            [identity] => Ok(*identity),
            _ => Err(PlatformError::RunResolution {
                job_id: job.id,
                start_time_usecs,
                matches: identities.len(),
            }),
        }
    }

    async fn update_retention(&self, update: &RetentionUpdate) -> Result<(), PlatformError> {
        let body = UpdateProtectionRunsRequest::from(update);

        let response = self
            .client
            .put(self.public_url("protectionRuns"))
            .header(AUTHORIZATION, &self.authorization)
            .json(&body)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        tracing::debug!(
            start_time_usecs = update.start_time_usecs,
            days_to_keep = update.days_to_keep,
            "Retention update accepted",
        );
        Ok(())
    }
}
