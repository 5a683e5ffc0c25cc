//! Summary writer: one row per subject with percentage and fail flag.

use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, Workbook};

use crate::config::Labels;
use crate::error::Result;
use crate::types::SubjectRecord;

/// One data row of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub surname: String,
    pub given_name: String,
    pub identifier: String,
    pub raw_score: i64,
    pub percentage: i64,
    /// `Echec` for a failing subject, empty otherwise.
    pub fail_flag: String,
}

/// Header plus rows, in record order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    pub header: [String; 6],
    pub rows: Vec<SummaryRow>,
}

/// Aggregate records into a summary table.
#[must_use]
pub fn build_summary(records: &[SubjectRecord], denominator: u32, labels: &Labels) -> SummaryTable {
    let header = [
        labels.surname.clone(),
        labels.given_name.clone(),
        labels.identifier.clone(),
        labels.score_header(denominator),
        labels.score_out_of_100.clone(),
        labels.failing.clone(),
    ];

    let rows = records
        .iter()
        .map(|record| SummaryRow {
            surname: record.surname.clone(),
            given_name: record.given_name.clone(),
            identifier: record.identifier.clone(),
            raw_score: record.raw_score,
            percentage: record.percentage(),
            fail_flag: if record.is_failing() {
                labels.failing_flag.clone()
            } else {
                String::new()
            },
        })
        .collect();

    SummaryTable { header, rows }
}

impl SummaryTable {
    /// Write the table to an xlsx workbook, tagging the data range as a table.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col, title) in (0u16..).zip(&self.header) {
            sheet.write_string(0, col, title)?;
        }

        for (row, entry) in (1u32..).zip(&self.rows) {
            sheet.write_string(row, 0, &entry.surname)?;
            sheet.write_string(row, 1, &entry.given_name)?;
            sheet.write_string(row, 2, &entry.identifier)?;
            sheet.write_number(row, 3, entry.raw_score as f64)?;
            sheet.write_number(row, 4, entry.percentage as f64)?;
            sheet.write_string(row, 5, &entry.fail_flag)?;
        }

        // A table needs at least one data row.
        if !self.rows.is_empty() {
            let columns: Vec<TableColumn> = self
                .header
                .iter()
                .map(|title| TableColumn::new().set_header(title))
                .collect();
            let table = Table::new().set_columns(&columns);
            let last_row = u32::try_from(self.rows.len()).unwrap_or(u32::MAX);
            sheet.add_table(0, 0, last_row, 5, &table)?;
        }
        sheet.autofit();

        workbook.save(path)?;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "Wrote summary");
        Ok(())
    }
}
