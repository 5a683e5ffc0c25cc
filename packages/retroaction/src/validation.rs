//! Pre-flight validation of a run's parameters.
//!
//! Every problem is collected and reported at once, before any output is
//! written.

use std::path::Path;

use crate::config::{validate_denominator, Labels};
use crate::error::{Result, RetroactionError};
use crate::grid::{open_grid, Grid};
use crate::locator::{locate_criteria, CriterionIndex};

/// A sheet that passed validation, ready for record building.
#[derive(Debug, Clone)]
pub struct ValidatedSheet {
    pub grid: Grid,
    pub index: CriterionIndex,
    pub denominator: u32,
}

/// Check the input workbook, sheet, labels, output directory and denominator.
///
/// The selection label is only required for a partial run.
pub fn validate_parameters(
    input: &Path,
    output_dir: &Path,
    sheet: &str,
    denominator: i64,
    partial: bool,
    labels: &Labels,
) -> Result<ValidatedSheet> {
    let mut problems = Vec::new();
    let mut loaded = None;

    if !input.is_file() {
        problems.push(format!("Input file {} does not exist", input.display()));
    } else {
        match open_grid(input, sheet) {
            Ok(grid) => {
                let index = locate_criteria(&grid, &labels.recognized());
                for label in index.missing(&labels.required(partial)) {
                    problems.push(RetroactionError::MissingCriterion(label.to_string()).to_string());
                }
                loaded = Some((grid, index));
            }
            Err(err) => problems.push(err.to_string()),
        }
    }

    if !output_dir.is_dir() {
        problems.push(format!(
            "Output directory {} does not exist",
            output_dir.display()
        ));
    }

    let denominator = match validate_denominator(denominator) {
        Ok(d) => Some(d),
        Err(err) => {
            problems.push(err.to_string());
            None
        }
    };

    match (loaded, denominator) {
        (Some((grid, index)), Some(denominator)) if problems.is_empty() => {
            tracing::debug!(sheet, denominator, "Parameters validated");
            Ok(ValidatedSheet {
                grid,
                index,
                denominator,
            })
        }
        _ => Err(RetroactionError::InvalidParameters(problems)),
    }
}
