//! The retention scan.
//!
//! Jobs are selected by name, then each selected job's runs are classified
//! and extended one at a time in platform order. A failure while listing a
//! job's runs, or while classifying or extending one run, is recorded in
//! the summary and logged; the scan continues with the next job or run.

use std::io::Write;

use retention_core::summary::NO_ACTIONS_MESSAGE;
use retention_core::{CadencePolicy, ChangeLogEntry, Job, Run, RunFailure, RunSummary};
use retention_events::{RunLog, SummaryNotifier};
use retention_platform::BackupPlatform;

use crate::config::ScanPlan;
use crate::error::{RetentionError, NO_MATCHING_JOBS_MESSAGE};
use crate::extender::RetentionExtender;

/// Run the scan and report it.
///
/// Returns [`RetentionError::NoMatchingJobs`] (after logging and notifying)
/// when no job matches the filters. Listing the jobs is the only platform
/// failure that aborts the scan.
pub async fn run_scan<W: Write>(
    plan: &ScanPlan,
    platform: &dyn BackupPlatform,
    notifier: Option<&dyn SummaryNotifier>,
    log: &mut RunLog<W>,
) -> Result<RunSummary, RetentionError> {
    let jobs = platform.list_jobs().await?;
    let total_jobs = jobs.len();
    let selected = plan.filter.select(jobs);

    if selected.is_empty() {
        tracing::warn!(
            total_jobs,
            filters = ?plan.filter.patterns(),
            "No protection jobs matched",
        );
        log.line(NO_MATCHING_JOBS_MESSAGE)?;
        notify(notifier, &plan.subject, NO_MATCHING_JOBS_MESSAGE, log).await?;
        return Err(RetentionError::NoMatchingJobs);
    }

    tracing::info!(
        total_jobs,
        selected = selected.len(),
        "Selected protection jobs",
    );
    log.selected_jobs(selected.iter().map(|job| job.name.as_str()))?;

    let extender = RetentionExtender::new(platform);
    let mut summary = RunSummary::new();

    for job in &selected {
        let runs = match platform.list_runs(job).await {
            Ok(runs) => runs,
            Err(e) => {
                tracing::error!(job_id = job.id, job_name = %job.name, error = %e, "Failed to list runs");
                record_failure(
                    &mut summary,
                    log,
                    RunFailure {
                        job_name: job.name.clone(),
                        start_time_usecs: None,
                        reason: e.to_string(),
                    },
                )?;
                continue;
            }
        };

        tracing::debug!(job_id = job.id, runs = runs.len(), "Scanning runs");

        for run in &runs {
            match process_run(&extender, &plan.policy, job, run).await {
                Ok(Some(entry)) => record_entry(&mut summary, log, entry)?,
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(
                        job_id = job.id,
                        job_name = %job.name,
                        start_time_usecs = run.start_time_usecs,
                        error = %e,
                        "Failed to extend run",
                    );
                    record_failure(
                        &mut summary,
                        log,
                        RunFailure {
                            job_name: job.name.clone(),
                            start_time_usecs: Some(run.start_time_usecs),
                            reason: e.to_string(),
                        },
                    )?;
                }
            }
        }
    }

    notify(notifier, &plan.subject, &summary.render(), log).await?;

    if summary.is_empty() {
        log.line(NO_ACTIONS_MESSAGE)?;
    }

    tracing::info!(
        extended = summary.entries().len(),
        failed = summary.failures().len(),
        "Retention scan complete",
    );

    Ok(summary)
}

/// Classify one run and extend it when a cadence matches.
async fn process_run(
    extender: &RetentionExtender<'_>,
    policy: &CadencePolicy,
    job: &Job,
    run: &Run,
) -> Result<Option<ChangeLogEntry>, RetentionError> {
    let Some(matched) = policy.classify(run)? else {
        return Ok(None);
    };

    tracing::debug!(
        job_id = job.id,
        start_time_usecs = run.start_time_usecs,
        cadence = %matched.cadence,
        retention_days = matched.retention_days,
        "Run matches cadence",
    );

    extender.extend(job, run, matched.retention_days).await
}

/// Add an extension to the summary and log it under its job header.
fn record_entry<W: Write>(
    summary: &mut RunSummary,
    log: &mut RunLog<W>,
    entry: ChangeLogEntry,
) -> Result<(), RetentionError> {
    let job_name = entry.job_name.clone();
    let line = format!("\t{entry}");
    if summary.record(entry) {
        log.line(format!("Job: {job_name}"))?;
    }
    log.line(line)?;
    Ok(())
}

fn record_failure<W: Write>(
    summary: &mut RunSummary,
    log: &mut RunLog<W>,
    failure: RunFailure,
) -> Result<(), RetentionError> {
    log.line(format!("\t{failure}"))?;
    summary.record_failure(failure);
    Ok(())
}

/// Send the summary if a notifier is configured. A delivery failure is
/// logged, not returned.
async fn notify<W: Write>(
    notifier: Option<&dyn SummaryNotifier>,
    subject: &str,
    body: &str,
    log: &mut RunLog<W>,
) -> Result<(), RetentionError> {
    let Some(notifier) = notifier else {
        return Ok(());
    };

    if let Err(e) = notifier.send_summary(subject, body).await {
        tracing::error!(error = %e, "Failed to send summary email");
        log.line(format!("Failed to send summary email: {e}"))?;
    }
    Ok(())
}
