//! Run summary: the grouped change log of one invocation.
//!
//! [`RunSummary`] is owned by the scan loop. Entries are kept in arrival
//! order and a job header starts each contiguous block of one job's
//! entries; jobs are not re-sorted. Failures are kept apart from successes
//! and listed after them.

use std::fmt;

use crate::time;
use crate::types::Usecs;

/// Body used when nothing was extended.
pub const NO_ACTIONS_MESSAGE: &str = "No actions taken";

/// One successful extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogEntry {
    pub job_name: String,
    pub start_time_usecs: Usecs,
    pub new_expiry_usecs: Usecs,
}

impl fmt::Display for ChangeLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} extending retention to {}",
            display_usecs(self.start_time_usecs),
            display_usecs(self.new_expiry_usecs)
        )
    }
}

/// One run that could not be classified or extended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub job_name: String,
    /// `None` when the failure concerned the whole job (e.g. run listing).
    pub start_time_usecs: Option<Usecs>,
    pub reason: String,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start_time_usecs {
            Some(start) => write!(
                f,
                "failed to extend {} for {}: {}",
                display_usecs(start),
                self.job_name,
                self.reason
            ),
            None => write!(f, "failed to scan {}: {}", self.job_name, self.reason),
        }
    }
}

/// Formatted timestamp, falling back to the raw value when out of range.
fn display_usecs(usecs: Usecs) -> String {
    time::format_usecs(usecs).unwrap_or_else(|_| format!("{usecs}usecs"))
}

/// Accumulated report for one invocation.
#[derive(Debug, Default)]
pub struct RunSummary {
    entries: Vec<ChangeLogEntry>,
    failures: Vec<RunFailure>,
    current_job: Option<String>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an extension.
    ///
    /// Returns `true` when the entry opens a new job block, i.e. when the
    /// caller should print a job header before the entry line.
    pub fn record(&mut self, entry: ChangeLogEntry) -> bool {
        let new_block = self.current_job.as_deref() != Some(entry.job_name.as_str());
        if new_block {
            self.current_job = Some(entry.job_name.clone());
        }
        self.entries.push(entry);
        new_block
    }

    pub fn record_failure(&mut self, failure: RunFailure) {
        self.failures.push(failure);
    }

    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.entries
    }

    pub fn failures(&self) -> &[RunFailure] {
        &self.failures
    }

    /// True when no extension was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the report body.
    ///
    /// ```text
    /// Job: PROD-SQL
    ///   2024-01-07 00:00:00 extending retention to 2024-02-11 00:00:00
    ///   2024-01-14 00:00:00 extending retention to 2024-02-18 00:00:00
    ///
    /// Job: PROD-WEB
    ///   2024-01-07 00:00:00 extending retention to 2024-02-11 00:00:00
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.entries.is_empty() {
            out.push_str(NO_ACTIONS_MESSAGE);
        } else {
            let mut last_job: Option<&str> = None;
            for entry in &self.entries {
                if last_job != Some(entry.job_name.as_str()) {
                    if last_job.is_some() {
                        out.push_str("\n\n");
                    }
                    out.push_str("Job: ");
                    out.push_str(&entry.job_name);
                    last_job = Some(&entry.job_name);
                }
                out.push_str("\n  ");
                out.push_str(&entry.to_string());
            }
        }

        if !self.failures.is_empty() {
            out.push_str("\n\nErrors:");
            for failure in &self.failures {
                out.push_str("\n  ");
                out.push_str(&failure.to_string());
            }
        }

        out
    }
}
