//! Raw feed parsing and the table normalizer.
//!
//! Attendance exports are wide tables with a layout that needs cleaning
//! before use:
//!
//! ```text
//! <preamble line, discarded>
//! Student,Student ID,Grade,Absences,="08/15",="08/16",...,<empty>
//! Doe Jane,1001,9,1,P,-,...,<empty>
//! ...
//! <3 summary rows>
//! ```
//!
//! Parsing happens in two explicit steps: [`RawTable`] reads the rows as they
//! are stored, and [`normalize`] builds a [`CleanTable`] from an explicit
//! header row and an explicit range of student rows.

use std::io;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{AttendanceError, Result};

/// Column holding the student identifier.
pub const STUDENT_ID_COLUMN: &str = "Student ID";

/// Identifying and summary columns removed during normalization.
pub const DROPPED_COLUMNS: [&str; 3] = ["Student", "Grade", "Absences"];

/// Cell value the exports use for "no attendance recorded".
pub const ABSENT_SENTINEL: &str = "-";

/// Number of summary rows at the bottom of every export.
pub const SUMMARY_ROWS: usize = 3;

/// A feed exactly as read from CSV, padded to a rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Name of the feed, used in error messages.
    pub feed: String,
    /// The first physical line of the file.
    pub preamble: Vec<String>,
    /// Every following line, including the real header and the summary block.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse a feed from raw CSV bytes.
    pub fn from_csv_bytes(feed: &str, bytes: &[u8]) -> Result<Self> {
        Self::from_reader(feed, bytes)
    }

    /// Parse a feed from any reader.
    ///
    /// Rows with fewer fields than the widest row are padded with empty cells.
    pub fn from_reader<R: io::Read>(feed: &str, reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| AttendanceError::Csv {
                feed: feed.to_string(),
                source,
            })?;
            lines.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let width = lines.iter().map(Vec::len).max().unwrap_or(0);
        for line in &mut lines {
            line.resize(width, String::new());
        }

        let mut lines = lines.into_iter();
        let preamble = lines
            .next()
            .ok_or_else(|| AttendanceError::malformed_input(feed, "file is empty"))?;

        Ok(RawTable {
            feed: feed.to_string(),
            preamble,
            rows: lines.collect(),
        })
    }

    /// Number of columns, including the trailing empty one.
    pub fn width(&self) -> usize {
        self.preamble.len()
    }
}

/// One student's attendance flags, aligned with a list of date columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRow {
    pub student_id: String,
    /// One entry per date column; `None` for absent values.
    pub flags: Vec<Option<String>>,
}

/// A normalized feed: `Student ID` plus one column per date label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanTable {
    pub feed: String,
    /// Date labels in source order, still decorated (`="08/15"`).
    pub date_columns: Vec<String>,
    pub rows: Vec<StudentRow>,
}

/// Map a source cell to an attendance flag.
///
/// The `-` sentinel and empty cells both become `None`; everything else,
/// whitespace included, is kept verbatim.
pub fn normalize_cell(cell: &str) -> Option<String> {
    if cell == ABSENT_SENTINEL || cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Clean one raw feed.
///
/// Drops the trailing empty column, promotes the first row to the header,
/// removes the summary block, maps `-` to absent, and keeps only
/// `Student ID` and the date columns.
///
/// # Errors
///
/// Returns [`AttendanceError::MalformedInput`] when the feed has fewer rows
/// than a header plus the summary block, lacks one of the expected columns,
/// or repeats a date column.
pub fn normalize(table: RawTable) -> Result<CleanTable> {
    let width = table.width();
    let RawTable { feed, rows, .. } = table;

    if rows.len() < 1 + SUMMARY_ROWS {
        return Err(AttendanceError::malformed_input(
            &feed,
            format!(
                "expected a header row and {} summary rows, found {} rows",
                SUMMARY_ROWS,
                rows.len()
            ),
        ));
    }

    if width < 2 {
        return Err(AttendanceError::malformed_input(
            &feed,
            format!("expected data columns and a trailing empty column, found {} columns", width),
        ));
    }
    let kept = width - 1;

    let header: Vec<&str> = rows[0][..kept].iter().map(|h| h.trim()).collect();
    let student_rows = &rows[1..rows.len() - SUMMARY_ROWS];

    let missing: Vec<&str> = std::iter::once(STUDENT_ID_COLUMN)
        .chain(DROPPED_COLUMNS)
        .filter(|name| !header.contains(name))
        .collect();
    if !missing.is_empty() {
        return Err(AttendanceError::malformed_input(
            &feed,
            format!("header is missing column(s): {}", missing.join(", ")),
        ));
    }

    let id_position = header
        .iter()
        .position(|h| *h == STUDENT_ID_COLUMN)
        .unwrap_or_default();

    let date_positions: Vec<usize> = header
        .iter()
        .enumerate()
        .filter(|(_, h)| **h != STUDENT_ID_COLUMN && !DROPPED_COLUMNS.contains(*h))
        .map(|(i, _)| i)
        .collect();

    let date_columns: Vec<String> = date_positions
        .iter()
        .map(|&i| header[i].to_string())
        .collect();

    for (i, label) in date_columns.iter().enumerate() {
        if date_columns[..i].contains(label) {
            return Err(AttendanceError::malformed_input(
                &feed,
                format!("date column '{}' appears more than once", label),
            ));
        }
    }

    let rows: Vec<StudentRow> = student_rows
        .iter()
        .map(|row| StudentRow {
            student_id: normalize_cell(&row[id_position]).unwrap_or_default(),
            flags: date_positions
                .iter()
                .map(|&i| normalize_cell(&row[i]))
                .collect(),
        })
        .collect();

    debug!(
        feed = %feed,
        students = rows.len(),
        dates = date_columns.len(),
        "normalized feed"
    );

    Ok(CleanTable {
        feed,
        date_columns,
        rows,
    })
}
