//! Resolved configuration.
//!
//! [`ExtendArgs::into_config`] turns parsed arguments into a
//! [`RetentionConfig`], rejecting anything that cannot work before the
//! cluster is contacted.

use std::time::Duration;

use retention_core::{CadencePolicy, JobFilter};
use retention_events::EmailConfig;
use retention_platform::{ClusterSettings, RetryConfig};
use validator::Validate;

use crate::cli::ExtendArgs;
use crate::error::{RetentionError, MAIL_ADDRESSES_REQUIRED_MESSAGE};

/// What to scan and how to report it.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub filter: JobFilter,
    pub policy: CadencePolicy,
    /// Subject of the summary email.
    pub subject: String,
}

/// Everything one invocation needs.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub cluster: ClusterSettings,
    pub scan: ScanPlan,
    /// `None` when no mail server was given.
    pub mail: Option<EmailConfig>,
}

impl ExtendArgs {
    /// Validate the arguments and resolve them into a [`RetentionConfig`].
    ///
    /// The mail-address pairing is checked first so a half-configured mailer
    /// is always reported with the same message.
    pub fn into_config(self) -> Result<RetentionConfig, RetentionError> {
        let mail = match self.mail_server.clone() {
            Some(smtp_host) => match (self.send_to.clone(), self.send_from.clone()) {
                (Some(to_address), Some(from_address)) => Some(EmailConfig {
                    smtp_host,
                    smtp_port: self.mail_port,
                    from_address,
                    to_address,
                }),
                _ => {
                    return Err(RetentionError::Configuration(
                        MAIL_ADDRESSES_REQUIRED_MESSAGE.to_string(),
                    ))
                }
            },
            None => None,
        };

        self.validate()
            .map_err(|e| RetentionError::Configuration(e.to_string()))?;

        let password = self.password.ok_or_else(|| {
            RetentionError::Configuration(
                "a password is required (--password or CLUSTER_PASSWORD)".to_string(),
            )
        })?;

        let filter = JobFilter::new(self.job_filters)
            .map_err(|e| RetentionError::Configuration(e.to_string()))?;

        let mut policy = CadencePolicy::default();
        if let Some(days) = self.yearly_retention {
            policy = policy.with_yearly(self.day_of_year, days);
        }
        if let Some(days) = self.monthly_retention {
            policy = policy.with_monthly(self.day_of_month, days);
        }
        if let Some(days) = self.weekly_retention {
            policy = policy.with_weekly(self.day_of_week, days);
        }
        policy
            .validate()
            .map_err(|e| RetentionError::Configuration(e.to_string()))?;

        Ok(RetentionConfig {
            cluster: ClusterSettings {
                server: self.server,
                username: self.username,
                domain: self.domain,
                password,
                verify_certs: self.verify_certs,
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                retry: RetryConfig::default(),
            },
            scan: ScanPlan {
                filter,
                policy,
                subject: self.subject,
            },
            mail,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::Parser;
    use retention_core::Cadence;

    use super::*;

    fn args(extra: &[&str]) -> ExtendArgs {
        let mut argv = vec![
            "retention-worker",
            "-s",
            "cluster01",
            "-u",
            "admin",
            "--password",
            "secret",
            "-j",
            "PROD*",
        ];
        argv.extend_from_slice(extra);
        ExtendArgs::try_parse_from(argv).unwrap()
    }

    // -----------------------------------------------------------------------
    // Mail pairing
    // -----------------------------------------------------------------------

    #[test]
    fn mail_server_without_recipient_is_rejected() {
        let result = args(&["--mail-server", "mail", "--send-from", "a@example.com"]).into_config();
        assert_matches!(
            result,
            Err(RetentionError::Configuration(msg)) if msg == MAIL_ADDRESSES_REQUIRED_MESSAGE
        );
    }

    #[test]
    fn mail_server_without_sender_is_rejected() {
        let result = args(&["--mail-server", "mail", "--send-to", "a@example.com"]).into_config();
        assert_matches!(result, Err(RetentionError::Configuration(_)));
    }

    #[test]
    fn complete_mail_settings_resolve() {
        let config = args(&[
            "--mail-server",
            "mail",
            "--mail-port",
            "2525",
            "--send-to",
            "ops@example.com",
            "--send-from",
            "backup@example.com",
        ])
        .into_config()
        .unwrap();

        let mail = config.mail.unwrap();
        assert_eq!(mail.smtp_host, "mail");
        assert_eq!(mail.smtp_port, 2525);
        assert_eq!(mail.to_address, "ops@example.com");
        assert_eq!(mail.from_address, "backup@example.com");
    }

    #[test]
    fn addresses_without_mail_server_are_ignored() {
        let config = args(&["--send-to", "ops@example.com"]).into_config().unwrap();
        assert!(config.mail.is_none());
    }

    // -----------------------------------------------------------------------
    // Cadence policy
    // -----------------------------------------------------------------------

    #[test]
    fn only_cadences_with_retention_are_enabled() {
        let config = args(&["--wr", "35", "-w", "6"]).into_config().unwrap();
        let rules: Vec<_> = config.scan.policy.rules().map(|(c, r)| (c, *r)).collect();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].0, Cadence::Weekly);
        assert_eq!(rules[0].1.anchor, 6);
        assert_eq!(rules[0].1.retention_days, 35);
    }

    #[test]
    fn all_cadences_use_their_anchor() {
        let config = args(&["--yr", "365", "-y", "32", "--mr", "90", "-m", "15", "--wr", "35"])
            .into_config()
            .unwrap();
        let policy = &config.scan.policy;
        assert_eq!(policy.yearly.unwrap().anchor, 32);
        assert_eq!(policy.monthly.unwrap().anchor, 15);
        assert_eq!(policy.weekly.unwrap().anchor, 6);
    }

    #[test]
    fn zero_retention_is_rejected() {
        assert!(args(&["--wr", "0"]).into_config().is_err());
    }

    #[test]
    fn invalid_anchor_is_rejected() {
        assert_matches!(
            args(&["-m", "32", "--mr", "90"]).into_config(),
            Err(RetentionError::Configuration(_))
        );
    }

    // -----------------------------------------------------------------------
    // Cluster settings
    // -----------------------------------------------------------------------

    #[test]
    fn missing_password_is_rejected() {
        let argv = ["retention-worker", "-s", "c", "-u", "admin", "-j", "PROD*"];
        if std::env::var_os("CLUSTER_PASSWORD").is_some() {
            return;
        }
        let result = ExtendArgs::try_parse_from(argv).unwrap().into_config();
        assert_matches!(result, Err(RetentionError::Configuration(msg)) if msg.contains("password"));
    }

    #[test]
    fn cluster_settings_carry_arguments() {
        let config = args(&["-d", "corp.example.com", "--verify-certs"]).into_config().unwrap();
        assert_eq!(config.cluster.server, "cluster01");
        assert_eq!(config.cluster.username, "admin");
        assert_eq!(config.cluster.domain, "corp.example.com");
        assert_eq!(config.cluster.password, "secret");
        assert!(config.cluster.verify_certs);
        assert_eq!(config.scan.filter.patterns(), ["PROD*"]);
    }
}
