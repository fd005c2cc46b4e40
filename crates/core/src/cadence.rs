//! Cadence classification of backup runs.
//!
//! A [`CadencePolicy`] holds up to three rules, one per [`Cadence`]. Rules
//! are checked in a fixed order (yearly, monthly, weekly) against the run's
//! UTC start date and the first one whose anchor matches decides the run's
//! retention target.

use chrono::{Datelike, NaiveDateTime};

use crate::error::CoreError;
use crate::time;
use crate::types::Run;

// ---------------------------------------------------------------------------
// Anchor defaults and bounds
// ---------------------------------------------------------------------------

/// Default yearly anchor: January 1st.
pub const DEFAULT_DAY_OF_YEAR: u32 = 1;
/// Default monthly anchor: the 1st.
pub const DEFAULT_DAY_OF_MONTH: u32 = 1;
/// Default weekly anchor: Sunday (Monday is 0).
pub const DEFAULT_DAY_OF_WEEK: u32 = 6;

pub const MAX_DAY_OF_YEAR: u32 = 366;
pub const MAX_DAY_OF_MONTH: u32 = 31;
pub const MAX_DAY_OF_WEEK: u32 = 6;

// ---------------------------------------------------------------------------
// Cadence
// ---------------------------------------------------------------------------

/// Which calendar field a rule is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Day of year, 1-based.
    Yearly,
    /// Day of month, 1-based.
    Monthly,
    /// Day of week, 0 = Monday .. 6 = Sunday.
    Weekly,
}

impl Cadence {
    /// Evaluation order; earlier entries take precedence.
    pub const PRECEDENCE: [Cadence; 3] = [Cadence::Yearly, Cadence::Monthly, Cadence::Weekly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }

    /// The calendar field of `date` this cadence compares its anchor with.
    pub fn day_of(&self, date: &NaiveDateTime) -> u32 {
        match self {
            Self::Yearly => date.ordinal(),
            Self::Monthly => date.day(),
            Self::Weekly => date.weekday().num_days_from_monday(),
        }
    }

    fn anchor_range(&self) -> (u32, u32) {
        match self {
            Self::Yearly => (1, MAX_DAY_OF_YEAR),
            Self::Monthly => (1, MAX_DAY_OF_MONTH),
            Self::Weekly => (0, MAX_DAY_OF_WEEK),
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rules and policy
// ---------------------------------------------------------------------------

/// Retention target applied to runs that start on `anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceRule {
    pub anchor: u32,
    pub retention_days: u32,
}

/// The rule that fired for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceMatch {
    pub cadence: Cadence,
    pub retention_days: u32,
}

/// Up to one rule per cadence. A missing rule disables that cadence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CadencePolicy {
    pub yearly: Option<CadenceRule>,
    pub monthly: Option<CadenceRule>,
    pub weekly: Option<CadenceRule>,
}

impl CadencePolicy {
    pub fn with_yearly(mut self, day_of_year: u32, retention_days: u32) -> Self {
        self.yearly = Some(CadenceRule {
            anchor: day_of_year,
            retention_days,
        });
        self
    }

    pub fn with_monthly(mut self, day_of_month: u32, retention_days: u32) -> Self {
        self.monthly = Some(CadenceRule {
            anchor: day_of_month,
            retention_days,
        });
        self
    }

    pub fn with_weekly(mut self, day_of_week: u32, retention_days: u32) -> Self {
        self.weekly = Some(CadenceRule {
            anchor: day_of_week,
            retention_days,
        });
        self
    }

    pub fn rule(&self, cadence: Cadence) -> Option<&CadenceRule> {
        match cadence {
            Cadence::Yearly => self.yearly.as_ref(),
            Cadence::Monthly => self.monthly.as_ref(),
            Cadence::Weekly => self.weekly.as_ref(),
        }
    }

    /// Configured rules in precedence order.
    pub fn rules(&self) -> impl Iterator<Item = (Cadence, &CadenceRule)> + '_ {
        Cadence::PRECEDENCE
            .into_iter()
            .filter_map(|c| self.rule(c).map(|r| (c, r)))
    }

    /// True when no cadence is configured, i.e. nothing can ever match.
    pub fn is_empty(&self) -> bool {
        self.rules().next().is_none()
    }

    /// Reject anchors that no calendar date can hit.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (cadence, rule) in self.rules() {
            let (min, max) = cadence.anchor_range();
            if !(min..=max).contains(&rule.anchor) {
                return Err(CoreError::Validation(format!(
                    "{cadence} anchor {} is outside {min}..={max}",
                    rule.anchor
                )));
            }
        }
        Ok(())
    }

    /// First rule (in precedence order) whose anchor matches `date`.
    pub fn match_date(&self, date: &NaiveDateTime) -> Option<CadenceMatch> {
        self.rules()
            .find(|(cadence, rule)| cadence.day_of(date) == rule.anchor)
            .map(|(cadence, rule)| CadenceMatch {
                cadence,
                retention_days: rule.retention_days,
            })
    }

    /// Classify a run by its start date.
    ///
    /// Runs whose snapshots were already deleted are never classified.
    pub fn classify(&self, run: &Run) -> Result<Option<CadenceMatch>, CoreError> {
        if run.snapshots_deleted {
            return Ok(None);
        }
        let started = time::to_date(run.start_time_usecs)?;
        Ok(self.match_date(&started))
    }
}
