//! Command-line arguments.
//!
//! Every option can also come from the environment (a `.env` file is loaded
//! first), which keeps credentials out of scheduler command lines. Long
//! options accept the spellings older cron entries use (`--jobfilters`,
//! `--yr`, `--ms`, `--to`, ...) as aliases.

use std::path::PathBuf;

use clap::Parser;
use retention_core::cadence::{DEFAULT_DAY_OF_MONTH, DEFAULT_DAY_OF_WEEK, DEFAULT_DAY_OF_YEAR};
use retention_events::delivery::email::DEFAULT_SMTP_PORT;
use retention_events::run_log::DEFAULT_LOG_FILE;
use validator::Validate;

/// Default email subject for the run summary.
pub const DEFAULT_SUBJECT: &str = "extendedRetentionScript";

/// Default per-request timeout for cluster API calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Extend the retention of backup runs that fall on yearly, monthly or
/// weekly anchor days.
#[derive(Debug, Clone, Parser, Validate)]
#[command(name = "retention-worker", version, about, long_about = None)]
pub struct ExtendArgs {
    /// Cluster hostname, VIP or base URL.
    #[arg(short = 's', long, env = "CLUSTER_SERVER")]
    pub server: String,

    /// Cluster username.
    #[arg(short = 'u', long, env = "CLUSTER_USERNAME")]
    pub username: String,

    /// Authentication domain.
    #[arg(short = 'd', long, env = "CLUSTER_DOMAIN", default_value = "local")]
    pub domain: String,

    /// Cluster password.
    #[arg(long, env = "CLUSTER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Job name glob; repeat for several (`-j 'PROD*' -j '*SQL*'`).
    #[arg(short = 'j', long = "job-filter", visible_alias = "jobfilters", required = true)]
    #[validate(length(min = 1, message = "at least one job filter is required"))]
    pub job_filters: Vec<String>,

    /// Day of year (1-366) that receives the yearly retention.
    #[arg(short = 'y', long, visible_alias = "dayofyear", default_value_t = DEFAULT_DAY_OF_YEAR)]
    #[validate(range(min = 1, max = 366))]
    pub day_of_year: u32,

    /// Day of month (1-31) that receives the monthly retention.
    #[arg(short = 'm', long, visible_alias = "dayofmonth", default_value_t = DEFAULT_DAY_OF_MONTH)]
    #[validate(range(min = 1, max = 31))]
    pub day_of_month: u32,

    /// Day of week (Monday=0 .. Sunday=6) that receives the weekly retention.
    #[arg(short = 'w', long, visible_alias = "dayofweek", default_value_t = DEFAULT_DAY_OF_WEEK)]
    #[validate(range(max = 6))]
    pub day_of_week: u32,

    /// Days to retain yearly runs (unset disables the yearly cadence).
    #[arg(long, visible_aliases = ["yearlyretention", "yr"])]
    #[validate(range(min = 1))]
    pub yearly_retention: Option<u32>,

    /// Days to retain monthly runs (unset disables the monthly cadence).
    #[arg(long, visible_aliases = ["monthlyretention", "mr"])]
    #[validate(range(min = 1))]
    pub monthly_retention: Option<u32>,

    /// Days to retain weekly runs (unset disables the weekly cadence).
    #[arg(long, visible_aliases = ["weeklyretention", "wr"])]
    #[validate(range(min = 1))]
    pub weekly_retention: Option<u32>,

    /// SMTP relay for the summary email.
    #[arg(long, visible_aliases = ["mailserver", "ms"], env = "SMTP_HOST")]
    pub mail_server: Option<String>,

    /// SMTP relay port.
    #[arg(long, visible_aliases = ["mailport", "mp"], env = "SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    pub mail_port: u16,

    /// Summary recipient.
    #[arg(long, visible_aliases = ["sendto", "to"], env = "SMTP_TO")]
    #[validate(email)]
    pub send_to: Option<String>,

    /// Summary sender.
    #[arg(long, visible_aliases = ["sendfrom", "fr"], env = "SMTP_FROM")]
    #[validate(email)]
    pub send_from: Option<String>,

    /// Summary email subject.
    #[arg(long, default_value = DEFAULT_SUBJECT)]
    pub subject: String,

    /// Append-only run log. Opened before the other options are resolved,
    /// so configuration errors are recorded too.
    #[arg(long, env = "RETENTION_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Verify the cluster's TLS certificate.
    #[arg(long)]
    pub verify_certs: bool,

    /// Per-request timeout for cluster API calls, in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> ExtendArgs {
        let mut argv = vec!["retention-worker", "-s", "cluster01", "-u", "admin", "-j", "PROD*"];
        argv.extend_from_slice(extra);
        ExtendArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_documented_values() {
        let args = parse(&[]);
        assert_eq!(args.domain, "local");
        assert_eq!(args.day_of_year, 1);
        assert_eq!(args.day_of_month, 1);
        assert_eq!(args.day_of_week, 6);
        assert_eq!(args.mail_port, 25);
        assert_eq!(args.subject, DEFAULT_SUBJECT);
        assert_eq!(args.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        assert!(args.yearly_retention.is_none());
        assert!(!args.verify_certs);
    }

    #[test]
    fn job_filter_is_repeatable() {
        let args = parse(&["-j", "*DEV*"]);
        assert_eq!(args.job_filters, ["PROD*", "*DEV*"]);
    }

    #[test]
    fn legacy_spellings_are_accepted() {
        let args = parse(&["--wr", "35", "--yr", "365", "--ms", "mail", "--to", "a@b.c", "--fr", "d@e.f"]);
        assert_eq!(args.weekly_retention, Some(35));
        assert_eq!(args.yearly_retention, Some(365));
        assert_eq!(args.mail_server.as_deref(), Some("mail"));
        assert_eq!(args.send_to.as_deref(), Some("a@b.c"));
        assert_eq!(args.send_from.as_deref(), Some("d@e.f"));
    }

    #[test]
    fn job_filter_is_required() {
        let result = ExtendArgs::try_parse_from(["retention-worker", "-s", "c", "-u", "admin"]);
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_weekday_fails_validation() {
        let args = parse(&["-w", "7"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn malformed_address_fails_validation() {
        let args = parse(&["--to", "not-an-address"]);
        assert!(args.validate().is_err());
    }
}
