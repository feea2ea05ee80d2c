//! Core data types for attendance consolidation.
//!
//! - [`PeriodMonth`] - Which half of the reporting period a month belongs to
//! - [`UnresolvedDatePolicy`] - What to do with dates that cannot be resolved
//! - [`ResolvedDate`] - A bare `MM/DD` label with its inferred year
//! - [`AttendanceRecord`] - One (student, date, flag) output row

use chrono::NaiveDate;
use serde::Serialize;

/// Months of the reporting period that fall in the year the school year starts.
pub const BEGINNING_MONTHS: [u32; 5] = [8, 9, 10, 11, 12];

/// Months of the reporting period that fall in the year the school year ends.
pub const ENDING_MONTHS: [u32; 6] = [1, 2, 3, 4, 5, 6];

/// Placement of a calendar month within the August-June reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMonth {
    /// August through December.
    Beginning,
    /// January through June.
    Ending,
    /// July, or anything that is not a month at all.
    Unsupported,
}

impl PeriodMonth {
    /// Classify a month number (1-12).
    pub fn of(month: u32) -> Self {
        if BEGINNING_MONTHS.contains(&month) {
            PeriodMonth::Beginning
        } else if ENDING_MONTHS.contains(&month) {
            PeriodMonth::Ending
        } else {
            PeriodMonth::Unsupported
        }
    }
}

impl std::fmt::Display for PeriodMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodMonth::Beginning => write!(f, "beginning"),
            PeriodMonth::Ending => write!(f, "ending"),
            PeriodMonth::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Policy for date labels that cannot be resolved to a calendar date.
///
/// Applies to unsupported months (July) and malformed dates such as `02/30`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnresolvedDatePolicy {
    /// Abort the run.
    #[default]
    Error,
    /// Drop every record under the label and log a warning.
    Skip,
}

impl std::fmt::Display for UnresolvedDatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnresolvedDatePolicy::Error => write!(f, "error"),
            UnresolvedDatePolicy::Skip => write!(f, "skip"),
        }
    }
}

/// A bare `MM/DD` label resolved against a reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDate {
    /// The label as it was given, before unwrapping.
    pub label: String,
    /// Half of the reporting period the label's month falls in.
    pub period: PeriodMonth,
    /// The validated calendar date.
    pub date: NaiveDate,
    /// Canonical `MM/DD/YYYY` rendering.
    pub formatted: String,
}

/// One consolidated attendance row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    /// Position of the record in reshaped order, before sorting.
    pub index: usize,
    pub student_id: String,
    pub date: NaiveDate,
    /// `None` when the source cell was `-` or empty.
    pub attendance_flag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_month() {
        for month in 8..=12 {
            assert_eq!(PeriodMonth::of(month), PeriodMonth::Beginning);
        }
        for month in 1..=6 {
            assert_eq!(PeriodMonth::of(month), PeriodMonth::Ending);
        }
        assert_eq!(PeriodMonth::of(7), PeriodMonth::Unsupported);
        assert_eq!(PeriodMonth::of(0), PeriodMonth::Unsupported);
        assert_eq!(PeriodMonth::of(13), PeriodMonth::Unsupported);
    }

    #[test]
    fn policy_default_is_error() {
        assert_eq!(UnresolvedDatePolicy::default(), UnresolvedDatePolicy::Error);
    }

    #[test]
    fn period_month_serialization() {
        assert_eq!(
            serde_json::to_string(&PeriodMonth::Beginning).unwrap(),
            "\"beginning\""
        );
        assert_eq!(
            serde_json::to_string(&PeriodMonth::Unsupported).unwrap(),
            "\"unsupported\""
        );
    }
}
