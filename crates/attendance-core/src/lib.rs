//! # attendance-core
//!
//! Consolidation of school attendance exports into one long-format table.
//!
//! Attendance exports are wide spreadsheets: one row per student, one column
//! per school day, labelled only with month and day. This library cleans
//! those exports, reshapes them to one record per (student, date), and infers
//! the year of every date from the August-June reporting period.
//!
//! ## Features
//!
//! - **Explicit parsing**: raw rows first, then a typed table built from an
//!   explicit header row and student row range.
//! - **Year inference**: bare `MM/DD` labels resolved against an injected
//!   reference date, never the system clock.
//! - **Exhaustive month handling**: July, the gap between school years, is a
//!   distinct case with a configurable policy.
//!
//! ## Example
//!
//! ```rust
//! use attendance_core::prelude::*;
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
//!
//! let resolved = resolve_label("=\"01/10\"", today).unwrap();
//! assert_eq!(resolved.formatted, "01/10/2025");
//! ```

pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod reshape;
pub mod resolve;
pub mod table;

// Re-export commonly used types at the crate root
pub use error::{AttendanceError, Result};
pub use models::{AttendanceRecord, PeriodMonth, ResolvedDate, UnresolvedDatePolicy};
pub use output::{to_csv_bytes, write_csv};
pub use pipeline::consolidate;
pub use resolve::{reporting_start_year, resolve_label, resolve_year, unwrap_label};
pub use table::{CleanTable, RawTable, normalize};

/// Prelude module for convenient imports.
///
/// ```
/// use attendance_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{AttendanceError, Result};
    pub use crate::models::*;
    pub use crate::output::{to_csv_bytes, write_csv};
    pub use crate::pipeline::consolidate;
    pub use crate::resolve::{reporting_start_year, resolve_label, resolve_year, unwrap_label};
    pub use crate::table::{CleanTable, RawTable, normalize};
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FEED: &str = "\
School export,,,,,,
Student,Student ID,Grade,Absences,=\"08/15\",=\"01/10\",
\"Doe, Jane\",1001,9,1,P,-,
Total,,,,1,0,
Present,,,,1,0,
Absent,,,,0,0,
";

    #[test]
    fn full_workflow_three_feeds() {
        let feeds = ["feed-a", "feed-b", "feed-c"]
            .iter()
            .map(|name| RawTable::from_csv_bytes(name, FEED.as_bytes()).unwrap())
            .collect();
        let today = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

        let records = consolidate(feeds, today, UnresolvedDatePolicy::Error).unwrap();
        let csv = String::from_utf8(to_csv_bytes(&records).unwrap()).unwrap();

        assert_eq!(
            csv,
            ",student_id,date,attendance_flag\n\
             0,1001,08/15/2024,P\n\
             1,1001,08/15/2024,P\n\
             2,1001,08/15/2024,P\n\
             3,1001,01/10/2025,\n\
             4,1001,01/10/2025,\n\
             5,1001,01/10/2025,\n"
        );
    }

    #[test]
    fn sentinel_becomes_absent_flag() {
        let feed = RawTable::from_csv_bytes("feed-a", FEED.as_bytes()).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

        let records = consolidate(vec![feed], today, UnresolvedDatePolicy::Error).unwrap();
        let january = records
            .iter()
            .find(|r| r.date == NaiveDate::from_ymd_opt(2025, 1, 10).unwrap())
            .unwrap();

        assert_eq!(january.attendance_flag, None);
    }

    #[test]
    fn prelude_exports() {
        use crate::prelude::*;

        let _policy = UnresolvedDatePolicy::Skip;
        let _period = PeriodMonth::of(9);
        assert_eq!(unwrap_label("=\"09/01\""), "09/01");
    }
}
