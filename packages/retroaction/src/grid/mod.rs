//! Read-only, 1-based view over one evaluation sheet.

mod reader;

pub use reader::{open_grid, sheet_names};

use unicode_normalization::UnicodeNormalization;

/// Resolved value of a spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Build a text cell, NFC-normalized. Blank strings become `Empty`.
    #[must_use]
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.nfc().collect())
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Display form of the value, `None` for an empty cell.
    ///
    /// Integral numbers drop their fractional part so that numeric
    /// identifiers stay stable as file names.
    ///
    /// # Examples
    /// ```
    /// use retroaction::grid::CellValue;
    ///
    /// assert_eq!(CellValue::Number(2045123.0).display().as_deref(), Some("2045123"));
    /// assert_eq!(CellValue::Number(4.5).display().as_deref(), Some("4.5"));
    /// assert_eq!(CellValue::Empty.display(), None);
    /// ```
    #[must_use]
    pub fn display(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Self::Number(n) => Some(format!("{n}")),
            Self::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }

    /// Whether the cell holds exactly this text.
    #[must_use]
    pub fn is_text(&self, expected: &str) -> bool {
        matches!(self, Self::Text(s) if s == expected)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

static EMPTY: CellValue = CellValue::Empty;

/// Rectangular sheet of cells addressed by (row, column), both starting at 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
    max_row: usize,
    max_column: usize,
}

impl Grid {
    /// Build a grid from rows of cells; ragged rows are padded with empty cells.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let max_row = rows.len();
        let max_column = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(max_column, CellValue::Empty);
                row
            })
            .collect();
        Self {
            rows,
            max_row,
            max_column,
        }
    }

    /// Cell at (row, column). Positions outside the sheet read as empty.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        if row == 0 || column == 0 {
            return &EMPTY;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(column - 1))
            .unwrap_or(&EMPTY)
    }

    #[must_use]
    pub fn max_row(&self) -> usize {
        self.max_row
    }

    #[must_use]
    pub fn max_column(&self) -> usize {
        self.max_column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::from_rows(vec![
            vec!["Nom".into(), "Tremblay".into(), "Roy".into()],
            vec!["DA".into(), 2045123.0.into()],
        ])
    }

    #[test]
    fn test_bounds_and_padding() {
        let grid = sample();
        assert_eq!(grid.max_row(), 2);
        assert_eq!(grid.max_column(), 3);
        assert!(grid.cell(2, 3).is_empty());
    }

    #[test]
    fn test_one_based_addressing() {
        let grid = sample();
        assert!(grid.cell(1, 1).is_text("Nom"));
        assert!(grid.cell(1, 3).is_text("Roy"));
        assert_eq!(grid.cell(2, 2).display().as_deref(), Some("2045123"));
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let grid = sample();
        assert!(grid.cell(0, 1).is_empty());
        assert!(grid.cell(1, 0).is_empty());
        assert!(grid.cell(9, 9).is_empty());
    }

    #[test]
    fn test_text_is_nfc_normalized() {
        // "e" followed by a combining acute accent
        let cell = CellValue::text("Pre\u{301}nom");
        assert!(cell.is_text("Prénom"));
    }

    #[test]
    fn test_empty_text_is_empty_cell() {
        assert!(CellValue::text("").is_empty());
    }

    #[test]
    fn test_bool_display() {
        assert_eq!(CellValue::Bool(true).display().as_deref(), Some("TRUE"));
    }
}
