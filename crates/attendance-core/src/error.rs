//! Error types for attendance-core.
//!
//! Every variant carries enough context (feed name, column label, offending
//! value) to diagnose a failed run from the log line alone.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for attendance consolidation.
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// A raw feed does not have the expected shape.
    #[error("Malformed input in feed '{feed}': {reason}")]
    MalformedInput { feed: String, reason: String },

    /// A date label whose month lies outside the August-June reporting period.
    #[error("Unsupported month {month} in date '{label}': reporting period runs August to June")]
    UnsupportedMonth { label: String, month: u32 },

    /// A date label that does not describe a real calendar date.
    #[error("Malformed date '{label}': {reason}")]
    MalformedDate { label: String, reason: String },

    /// The reference date itself falls in the July gap between school years.
    #[error("Current date {today} is outside the reporting period (August to June)")]
    OutsideReportingPeriod { today: NaiveDate },

    /// The feed could not be read as CSV.
    #[error("CSV error in feed '{feed}': {source}")]
    Csv {
        feed: String,
        #[source]
        source: csv::Error,
    },

    /// The output could not be serialized.
    #[error("Failed to write output: {0}")]
    Output(String),
}

impl AttendanceError {
    pub(crate) fn malformed_input(feed: &str, reason: impl Into<String>) -> Self {
        AttendanceError::MalformedInput {
            feed: feed.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_date(label: &str, reason: impl Into<String>) -> Self {
        AttendanceError::MalformedDate {
            label: label.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error concerns a single date label rather than a whole feed.
    ///
    /// These are the errors an [`UnresolvedDatePolicy::Skip`](crate::models::UnresolvedDatePolicy)
    /// run tolerates.
    pub fn is_unresolved_date(&self) -> bool {
        matches!(
            self,
            AttendanceError::UnsupportedMonth { .. } | AttendanceError::MalformedDate { .. }
        )
    }
}

/// Result type alias for attendance operations.
pub type Result<T> = std::result::Result<T, AttendanceError>;
