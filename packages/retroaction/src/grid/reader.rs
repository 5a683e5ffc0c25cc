//! Spreadsheet loading through calamine (xlsx, xlsm, xls, ods).

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use super::{CellValue, Grid};
use crate::error::{Result, RetroactionError};

/// List the sheet names of a workbook, in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path).map_err(|source| RetroactionError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(workbook.sheet_names().to_vec())
}

/// Load one sheet of a workbook as a `Grid`, using cached formula results.
pub fn open_grid(path: &Path, sheet: &str) -> Result<Grid> {
    let mut workbook = open_workbook_auto(path).map_err(|source| RetroactionError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(RetroactionError::SheetNotFound(sheet.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|source| RetroactionError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    let grid = grid_from_range(&range);
    tracing::debug!(
        sheet,
        rows = grid.max_row(),
        columns = grid.max_column(),
        "Loaded sheet"
    );
    Ok(grid)
}

/// Convert a calamine range into a grid anchored at A1.
///
/// The range may start below or right of A1; leading rows and columns are
/// kept as empty cells so that row and column numbers match the sheet.
fn grid_from_range(range: &Range<Data>) -> Grid {
    let (Some((start_row, start_col)), Some((end_row, end_col))) = (range.start(), range.end())
    else {
        return Grid::default();
    };

    let height = end_row as usize + 1;
    let width = end_col as usize + 1;
    let mut rows = vec![vec![CellValue::Empty; width]; height];

    for (row, col, data) in range.cells() {
        let target_row = start_row as usize + row;
        let target_col = start_col as usize + col;
        rows[target_row][target_col] = convert(data);
    }

    Grid::from_rows(rows)
}

fn convert(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s),
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
    }
}
