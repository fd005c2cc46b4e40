//! `retention-worker` -- extends the retention of periodic backup runs.
//!
//! Selects protection jobs by name, classifies each run as a yearly,
//! monthly or weekly backup by its start date, and extends the local
//! snapshot's retention to the cadence's target. Every action is appended
//! to a plain-text run log and optionally mailed as a summary.
//!
//! # Environment variables
//!
//! | Variable           | Required | Default                  | Description                 |
//! |--------------------|----------|--------------------------|-----------------------------|
//! | `CLUSTER_SERVER`   | yes      | --                       | Cluster hostname or URL     |
//! | `CLUSTER_USERNAME` | yes      | --                       | API user                    |
//! | `CLUSTER_PASSWORD` | yes      | --                       | API password                |
//! | `CLUSTER_DOMAIN`   | no       | `local`                  | Authentication domain       |
//! | `SMTP_HOST`        | no       | --                       | Mail relay for the summary  |
//! | `RETENTION_LOG_FILE` | no     | `extendRetentionLog.txt` | Run log path                |
//! | `RUST_LOG`         | no       | `retention_worker=info`  | Diagnostic log filter       |
//!
//! Each variable can also be given as a command-line option; see `--help`.

use std::process::ExitCode;

use clap::Parser;
use retention_events::RunLog;
use retention_worker::app;
use retention_worker::cli::ExtendArgs;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "retention_worker=info,retention_platform=info,retention_events=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = ExtendArgs::parse();

    let mut log = match RunLog::open(&args.log_file) {
        Ok(log) => log,
        Err(e) => {
            tracing::error!(path = %args.log_file.display(), error = %e, "Cannot open run log");
            return ExitCode::FAILURE;
        }
    };

    match app::execute(args, &mut log).await {
        Ok(summary) => {
            tracing::info!(
                extended = summary.entries().len(),
                failed = summary.failures().len(),
                "Finished",
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            app::report_failure(&mut log, &e);
            ExitCode::FAILURE
        }
    }
}
