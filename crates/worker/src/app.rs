//! One invocation, from parsed arguments to a finished scan.

use std::io::Write;

use chrono::Local;
use retention_core::RunSummary;
use retention_events::{EmailDelivery, RunLog, SummaryNotifier};
use retention_platform::ClusterApi;

use crate::cli::ExtendArgs;
use crate::error::RetentionError;
use crate::pipeline;

/// Open a run log section, resolve the configuration, connect to the
/// cluster and scan it.
///
/// Configuration is resolved before the cluster is contacted, so invalid
/// arguments never cost an authentication round trip.
pub async fn execute<W: Write>(
    args: ExtendArgs,
    log: &mut RunLog<W>,
) -> Result<RunSummary, RetentionError> {
    log.begin_section(Local::now())?;

    let config = args.into_config()?;

    if config.scan.policy.is_empty() {
        tracing::warn!("No cadence has a retention configured; runs will not be extended");
    }

    let mailer = config.mail.clone().map(EmailDelivery::new);
    let notifier = mailer.as_ref().map(|m| m as &dyn SummaryNotifier);

    tracing::info!(
        server = %config.cluster.server,
        filters = ?config.scan.filter.patterns(),
        mail = mailer.is_some(),
        "Starting retention scan",
    );

    let api = ClusterApi::connect(&config.cluster).await?;

    pipeline::run_scan(&config.scan, &api, notifier, log).await
}

/// Record an error that ended the invocation in the run log.
///
/// [`RetentionError::NoMatchingJobs`] is already logged by the scan and is
/// not repeated.
pub fn report_failure<W: Write>(log: &mut RunLog<W>, error: &RetentionError) {
    if matches!(error, RetentionError::NoMatchingJobs) {
        return;
    }

    tracing::error!(error = %error, "Retention scan aborted");
    if let Err(e) = log.line(error.to_string()) {
        tracing::error!(error = %e, "Failed to write run log");
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::Parser;

    use super::*;
    use crate::error::MAIL_ADDRESSES_REQUIRED_MESSAGE;

    fn memory_log() -> RunLog<Vec<u8>> {
        RunLog::new(Vec::new(), false)
    }

    fn log_text(log: RunLog<Vec<u8>>) -> String {
        String::from_utf8(log.into_inner()).unwrap()
    }

    // -----------------------------------------------------------------------
    // execute
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn mail_server_without_addresses_fails_before_connecting() {
        // Port 9 on loopback: connecting would fail with a platform error.
        let args = ExtendArgs::try_parse_from([
            "retention-worker",
            "-s",
            "http://127.0.0.1:9",
            "-u",
            "admin",
            "--password",
            "secret",
            "-j",
            "PROD*",
            "--wr",
            "30",
            "--ms",
            "smtp.local",
        ])
        .unwrap();
        let mut log = memory_log();

        let err = execute(args, &mut log).await.unwrap_err();

        assert_matches!(
            &err,
            RetentionError::Configuration(msg) if msg == MAIL_ADDRESSES_REQUIRED_MESSAGE
        );
        report_failure(&mut log, &err);
        let text = log_text(log);
        assert!(text.contains("----------------"));
        assert!(text.ends_with(&format!("{MAIL_ADDRESSES_REQUIRED_MESSAGE}\n")));
    }

    #[tokio::test]
    async fn configuration_error_lands_in_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retention.log");
        let path_arg = path.to_str().unwrap();
        let args = ExtendArgs::try_parse_from([
            "retention-worker",
            "-s",
            "http://127.0.0.1:9",
            "-u",
            "admin",
            "--password",
            "secret",
            "-j",
            "PROD*",
            "-w",
            "9",
            "--wr",
            "30",
            "--log-file",
            path_arg,
        ])
        .unwrap();

        let mut log = RunLog::open(&args.log_file).unwrap();
        let err = execute(args, &mut log).await.unwrap_err();
        assert_matches!(err, RetentionError::Configuration(_));
        report_failure(&mut log, &err);
        drop(log);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("----------------"));
        assert!(text.contains(&err.to_string()));
    }

    // -----------------------------------------------------------------------
    // report_failure
    // -----------------------------------------------------------------------

    #[test]
    fn no_matching_jobs_is_not_logged_twice() {
        let mut log = memory_log();
        report_failure(&mut log, &RetentionError::NoMatchingJobs);
        assert!(log_text(log).is_empty());
    }

    #[test]
    fn other_errors_are_logged() {
        let mut log = memory_log();
        report_failure(
            &mut log,
            &RetentionError::Configuration("bad anchor".into()),
        );
        assert_eq!(log_text(log), "bad anchor\n");
    }
}
