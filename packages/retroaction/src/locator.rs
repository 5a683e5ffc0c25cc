//! Criterion locator: find the row of each fixed label in the first column.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, RetroactionError};
use crate::grid::Grid;

/// Rows where each recognized label was found in column 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriterionIndex {
    /// Every matching row per label, top to bottom. Unfound labels have none.
    occurrences: BTreeMap<String, Vec<usize>>,
}

impl CriterionIndex {
    /// Row of a label, `None` when the label was not found.
    ///
    /// When a label appears several times the last row wins.
    #[must_use]
    pub fn row(&self, label: &str) -> Option<usize> {
        self.occurrences.get(label)?.last().copied()
    }

    /// Row of a label the caller cannot proceed without.
    pub fn require(&self, label: &str) -> Result<usize> {
        self.row(label)
            .ok_or_else(|| RetroactionError::MissingCriterion(label.to_string()))
    }

    /// Labels among `labels` that did not resolve.
    #[must_use]
    pub fn missing<'a>(&self, labels: &[&'a str]) -> Vec<&'a str> {
        labels
            .iter()
            .copied()
            .filter(|label| self.row(label).is_none())
            .collect()
    }

    /// Rows claimed by a resolved label.
    #[must_use]
    pub fn claimed_rows(&self) -> BTreeSet<usize> {
        self.occurrences
            .keys()
            .filter_map(|label| self.row(label))
            .collect()
    }
}

/// Scan column 1 of `grid` for each label.
///
/// Every row is scanned for every label; later matches overwrite earlier
/// ones. Absent labels are reported through `CriterionIndex::row` returning
/// `None`; the locator itself never fails.
pub fn locate_criteria(grid: &Grid, labels: &[&str]) -> CriterionIndex {
    let mut occurrences = BTreeMap::new();

    for label in labels {
        let rows: Vec<usize> = (1..=grid.max_row())
            .filter(|&row| grid.cell(row, 1).is_text(label))
            .collect();

        if rows.len() > 1 {
            tracing::warn!(
                label = %label,
                rows = ?rows,
                "Label appears more than once, using the last row"
            );
        }

        occurrences.insert((*label).to_string(), rows);
    }

    CriterionIndex { occurrences }
}
