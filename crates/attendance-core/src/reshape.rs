//! Concatenation of normalized feeds and the wide-to-long reshape.

use tracing::debug;

use crate::table::{CleanTable, StudentRow};

/// Several normalized feeds stacked into one wide table.
///
/// Columns are the union of every feed's date labels in first-seen order.
/// Students are kept in feed order without de-duplication; a student whose
/// feed lacks a column has an absent value there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedTable {
    pub date_columns: Vec<String>,
    pub rows: Vec<StudentRow>,
}

/// One (student, label, flag) cell of the long table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRecord {
    /// Position in reshaped order.
    pub index: usize,
    pub student_id: String,
    /// Date label as it appeared in the header.
    pub label: String,
    pub attendance_flag: Option<String>,
}

impl CombinedTable {
    /// Stack normalized feeds, aligning their date columns by label.
    pub fn concat(tables: Vec<CleanTable>) -> Self {
        let mut date_columns: Vec<String> = Vec::new();
        for table in &tables {
            for label in &table.date_columns {
                if !date_columns.contains(label) {
                    date_columns.push(label.clone());
                }
            }
        }

        let mut rows = Vec::new();
        for table in tables {
            debug!(
                feed = %table.feed,
                students = table.rows.len(),
                dates = table.date_columns.len(),
                "appending feed"
            );
            let positions: Vec<Option<usize>> = date_columns
                .iter()
                .map(|label| table.date_columns.iter().position(|l| l == label))
                .collect();

            for row in table.rows {
                let flags = positions
                    .iter()
                    .map(|position| position.and_then(|i| row.flags[i].clone()))
                    .collect();
                rows.push(StudentRow {
                    student_id: row.student_id,
                    flags,
                });
            }
        }

        CombinedTable { date_columns, rows }
    }

    /// Number of cells the long table will have.
    pub fn cell_count(&self) -> usize {
        self.date_columns.len() * self.rows.len()
    }

    /// Reshape to one record per (student, date column).
    ///
    /// Records are emitted column by column, then row by row, and numbered in
    /// that order.
    pub fn melt(&self) -> Vec<LongRecord> {
        let mut records = Vec::with_capacity(self.cell_count());
        for (column, label) in self.date_columns.iter().enumerate() {
            for row in &self.rows {
                records.push(LongRecord {
                    index: records.len(),
                    student_id: row.student_id.clone(),
                    label: label.clone(),
                    attendance_flag: row.flags[column].clone(),
                });
            }
        }
        records
    }
}
