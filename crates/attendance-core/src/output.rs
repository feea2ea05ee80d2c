//! CSV serialization of consolidated records.
//!
//! The output has an unlabeled leading index column followed by
//! `student_id,date,attendance_flag`. Absent flags are written as empty
//! fields.

use std::io;

use csv::Writer;
use serde::Serialize;

use crate::error::{AttendanceError, Result};
use crate::models::AttendanceRecord;
use crate::resolve::DATE_FORMAT;

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    #[serde(rename = "")]
    index: usize,
    student_id: &'a str,
    date: String,
    attendance_flag: Option<&'a str>,
}

impl<'a> From<&'a AttendanceRecord> for OutputRow<'a> {
    fn from(record: &'a AttendanceRecord) -> Self {
        OutputRow {
            index: record.index,
            student_id: &record.student_id,
            date: record.date.format(DATE_FORMAT).to_string(),
            attendance_flag: record.attendance_flag.as_deref(),
        }
    }
}

/// Write records as CSV to any writer.
pub fn write_csv<W: io::Write>(records: &[AttendanceRecord], writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);

    if records.is_empty() {
        writer
            .write_record(["", "student_id", "date", "attendance_flag"])
            .map_err(|e| AttendanceError::Output(e.to_string()))?;
    }

    for record in records {
        writer
            .serialize(OutputRow::from(record))
            .map_err(|e| AttendanceError::Output(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| AttendanceError::Output(e.to_string()))
}

/// Render records as an in-memory CSV document.
pub fn to_csv_bytes(records: &[AttendanceRecord]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    Ok(buffer)
}
