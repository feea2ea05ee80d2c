//! End-to-end consolidation of raw feeds into sorted attendance records.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{AttendanceRecord, ResolvedDate, UnresolvedDatePolicy};
use crate::reshape::CombinedTable;
use crate::resolve::resolve_label;
use crate::table::{RawTable, normalize};

/// Consolidate raw feeds into one long, sorted list of attendance records.
///
/// Each feed is normalized, the feeds are stacked, the result is reshaped to
/// one record per (student, date), every date label is resolved against
/// `today`, and records are sorted by student ID and then date. Records with
/// equal keys keep their reshaped order.
///
/// # Errors
///
/// Any normalization error aborts. Unresolvable date labels abort under
/// [`UnresolvedDatePolicy::Error`] and are dropped with a warning under
/// [`UnresolvedDatePolicy::Skip`].
///
/// # Examples
///
/// ```
/// use attendance_core::prelude::*;
/// use chrono::NaiveDate;
///
/// let csv = "export,,,,,\n\
///            Student,Student ID,Grade,Absences,=\"01/10\",\n\
///            Doe,1001,9,0,P,\n\
///            a,,,,,\nb,,,,,\nc,,,,,\n";
/// let feed = RawTable::from_csv_bytes("feed-a", csv.as_bytes()).unwrap();
/// let today = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
///
/// let records = consolidate(vec![feed], today, UnresolvedDatePolicy::Error).unwrap();
/// assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
/// ```
pub fn consolidate(
    tables: Vec<RawTable>,
    today: NaiveDate,
    policy: UnresolvedDatePolicy,
) -> Result<Vec<AttendanceRecord>> {
    let clean = tables
        .into_iter()
        .map(normalize)
        .collect::<Result<Vec<_>>>()?;

    let combined = CombinedTable::concat(clean);
    info!(
        students = combined.rows.len(),
        dates = combined.date_columns.len(),
        "combined feeds"
    );

    let resolved = resolve_columns(&combined.date_columns, today, policy)?;

    let mut records: Vec<AttendanceRecord> = combined
        .melt()
        .into_iter()
        .filter_map(|long| {
            let date = resolved.get(&long.label)?.date;
            Some(AttendanceRecord {
                index: long.index,
                student_id: long.student_id,
                date,
                attendance_flag: long.attendance_flag,
            })
        })
        .collect();

    records.sort_by(|a, b| {
        a.student_id
            .cmp(&b.student_id)
            .then_with(|| a.date.cmp(&b.date))
    });

    debug!(records = records.len(), "consolidated records");
    Ok(records)
}

/// Resolve every date column once, applying the unresolved-date policy.
fn resolve_columns(
    labels: &[String],
    today: NaiveDate,
    policy: UnresolvedDatePolicy,
) -> Result<HashMap<String, ResolvedDate>> {
    let mut resolved = HashMap::with_capacity(labels.len());

    for label in labels {
        match resolve_label(label, today) {
            Ok(date) => {
                resolved.insert(label.clone(), date);
            }
            Err(err) if err.is_unresolved_date() && policy == UnresolvedDatePolicy::Skip => {
                warn!(label = %label, error = %err, "skipping unresolved date column");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(resolved)
}
