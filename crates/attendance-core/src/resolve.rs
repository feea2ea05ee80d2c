//! Year inference for bare `MM/DD` date labels.
//!
//! Attendance exports label their columns with a month and day only. The
//! reporting period runs from August of one calendar year to June of the
//! next, so the year of a label depends on which half of the period both the
//! label and the reference date ("today") fall in:
//!
//! | label month | today's month | year             |
//! |-------------|---------------|------------------|
//! | beginning   | beginning     | `today.year`     |
//! | ending      | beginning     | `today.year + 1` |
//! | beginning   | ending        | `today.year - 1` |
//! | ending      | ending        | `today.year`     |

use chrono::{Datelike, NaiveDate};

use crate::error::{AttendanceError, Result};
use crate::models::{PeriodMonth, ResolvedDate};

/// Output date format (`MM/DD/YYYY`, zero padded).
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Strip the spreadsheet formula decoration from a column label.
///
/// Exports write dates as `="08/15"` so spreadsheet tools keep them as text.
///
/// ```
/// use attendance_core::resolve::unwrap_label;
///
/// assert_eq!(unwrap_label("=\"08/15\""), "08/15");
/// assert_eq!(unwrap_label("08/15"), "08/15");
/// ```
pub fn unwrap_label(label: &str) -> &str {
    label
        .trim()
        .trim_start_matches(['=', '"'])
        .trim_end_matches('"')
}

/// Split a bare `MM/DD` string into month and day numbers.
fn parse_month_day(bare_date: &str) -> Result<(u32, u32)> {
    let mut parts = bare_date.split('/');
    let (Some(month), Some(day), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AttendanceError::malformed_date(
            bare_date,
            "expected MM/DD",
        ));
    };

    let month = parse_component(bare_date, month, "month")?;
    let day = parse_component(bare_date, day, "day")?;

    if !(1..=12).contains(&month) {
        return Err(AttendanceError::malformed_date(
            bare_date,
            format!("month {} out of range", month),
        ));
    }

    Ok((month, day))
}

fn parse_component(bare_date: &str, part: &str, what: &str) -> Result<u32> {
    let part = part.trim();
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AttendanceError::malformed_date(
            bare_date,
            format!("invalid {} '{}'", what, part),
        ));
    }
    part.parse().map_err(|_| {
        AttendanceError::malformed_date(bare_date, format!("invalid {} '{}'", what, part))
    })
}

/// Infer the calendar year of a bare `MM/DD` date relative to `today`.
///
/// The result is validated as a real calendar date, so `02/29` only resolves
/// in leap years and `02/30` never does.
///
/// # Errors
///
/// - [`AttendanceError::OutsideReportingPeriod`] when `today` is in July
/// - [`AttendanceError::UnsupportedMonth`] when the label's month is July
/// - [`AttendanceError::MalformedDate`] when the label is not `MM/DD` or not a real date
///
/// # Examples
///
/// ```
/// use attendance_core::resolve::resolve_year;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
/// assert_eq!(resolve_year("08/15", today).unwrap().formatted, "08/15/2024");
/// assert_eq!(resolve_year("01/10", today).unwrap().formatted, "01/10/2025");
/// ```
pub fn resolve_year(bare_date: &str, today: NaiveDate) -> Result<ResolvedDate> {
    let (month, day) = parse_month_day(bare_date)?;

    let period = PeriodMonth::of(month);
    let year = match (period, PeriodMonth::of(today.month())) {
        (_, PeriodMonth::Unsupported) => {
            return Err(AttendanceError::OutsideReportingPeriod { today });
        }
        (PeriodMonth::Unsupported, _) => {
            return Err(AttendanceError::UnsupportedMonth {
                label: bare_date.to_string(),
                month,
            });
        }
        (PeriodMonth::Beginning, PeriodMonth::Beginning)
        | (PeriodMonth::Ending, PeriodMonth::Ending) => today.year(),
        (PeriodMonth::Ending, PeriodMonth::Beginning) => today.year() + 1,
        (PeriodMonth::Beginning, PeriodMonth::Ending) => today.year() - 1,
    };

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AttendanceError::malformed_date(
            bare_date,
            format!("{:02}/{:02}/{} is not a calendar date", month, day, year),
        )
    })?;

    Ok(ResolvedDate {
        label: bare_date.to_string(),
        period,
        date,
        formatted: date.format(DATE_FORMAT).to_string(),
    })
}

/// Unwrap a decorated column label and resolve its year.
///
/// The returned [`ResolvedDate::label`] is the label as given.
pub fn resolve_label(label: &str, today: NaiveDate) -> Result<ResolvedDate> {
    let resolved = resolve_year(unwrap_label(label), today)?;
    Ok(ResolvedDate {
        label: label.to_string(),
        ..resolved
    })
}

/// Calendar year in which the reporting period containing `today` began.
///
/// ```
/// use attendance_core::resolve::reporting_start_year;
/// use chrono::NaiveDate;
///
/// let spring = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// assert_eq!(reporting_start_year(spring).unwrap(), 2024);
/// ```
pub fn reporting_start_year(today: NaiveDate) -> Result<i32> {
    match PeriodMonth::of(today.month()) {
        PeriodMonth::Beginning => Ok(today.year()),
        PeriodMonth::Ending => Ok(today.year() - 1),
        PeriodMonth::Unsupported => Err(AttendanceError::OutsideReportingPeriod { today }),
    }
}
