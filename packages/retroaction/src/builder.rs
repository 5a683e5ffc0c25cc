//! Subject record builder: one `SubjectRecord` per subject column.

use crate::config::{Labels, INCLUSION_MARKER};
use crate::error::{Result, RetroactionError};
use crate::grid::{CellValue, Grid};
use crate::locator::CriterionIndex;
use crate::types::{CriterionEntry, SubjectRecord};

/// Restricts a run to the subjects whose selection cell holds the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionFilter {
    pub row: usize,
    pub marker: String,
}

impl InclusionFilter {
    /// Filter on the selection row of `index`, using the standard marker.
    pub fn from_index(index: &CriterionIndex, labels: &Labels) -> Result<Self> {
        Ok(Self {
            row: index.require(&labels.selection)?,
            marker: INCLUSION_MARKER.to_string(),
        })
    }

    #[must_use]
    pub fn includes(&self, grid: &Grid, column: usize) -> bool {
        grid.cell(self.row, column).is_text(&self.marker)
    }
}

/// Build the records of every qualifying subject column (columns 2 and up).
///
/// A malformed column aborts the whole build.
pub fn build_records(
    grid: &Grid,
    index: &CriterionIndex,
    labels: &Labels,
    denominator: u32,
    filter: Option<&InclusionFilter>,
) -> Result<Vec<SubjectRecord>> {
    let rows = FixedRows::resolve(index, labels)?;
    let claimed = index.claimed_rows();
    let criteria_rows: Vec<usize> = (rows.given_name + 1..=grid.max_row())
        .filter(|row| !claimed.contains(row))
        .collect();

    let mut records = Vec::new();
    for column in 2..=grid.max_column() {
        if let Some(filter) = filter {
            if !filter.includes(grid, column) {
                tracing::debug!(column, "Subject not selected, skipping");
                continue;
            }
        }

        let criteria = criteria_rows
            .iter()
            .map(|&row| {
                CriterionEntry::new(
                    grid.cell(row, 1).display().as_deref(),
                    grid.cell(row, column).display().as_deref(),
                )
            })
            .collect();

        records.push(SubjectRecord {
            identifier: identifier(grid, rows.identifier, column)?,
            surname: text_or_empty(grid.cell(rows.surname, column)),
            given_name: text_or_empty(grid.cell(rows.given_name, column)),
            raw_score: score(grid, rows.score, column)?,
            score_denominator: denominator,
            comments: rows
                .comments
                .map(|row| text_or_empty(grid.cell(row, column)))
                .unwrap_or_default(),
            criteria,
        });
    }

    tracing::info!(subjects = records.len(), "Built subject records");
    Ok(records)
}

/// Rows of the labels every record reads.
struct FixedRows {
    surname: usize,
    given_name: usize,
    identifier: usize,
    score: usize,
    /// Optional: a sheet without a comments row yields empty comments.
    comments: Option<usize>,
}

impl FixedRows {
    fn resolve(index: &CriterionIndex, labels: &Labels) -> Result<Self> {
        Ok(Self {
            surname: index.require(&labels.surname)?,
            given_name: index.require(&labels.given_name)?,
            identifier: index.require(&labels.identifier)?,
            score: index.require(&labels.score)?,
            comments: index.row(&labels.comments),
        })
    }
}

fn text_or_empty(cell: &CellValue) -> String {
    cell.display().unwrap_or_default()
}

fn identifier(grid: &Grid, row: usize, column: usize) -> Result<String> {
    grid.cell(row, column)
        .display()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(RetroactionError::MissingIdentifier { column, row })
}

/// Coerce a score cell to an integer. Fractional numbers are truncated.
fn score(grid: &Grid, row: usize, column: usize) -> Result<i64> {
    let cell = grid.cell(row, column);
    let parsed = match cell {
        CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
        CellValue::Text(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| RetroactionError::InvalidScore {
        column,
        row,
        value: cell.display().unwrap_or_default(),
    })
}
